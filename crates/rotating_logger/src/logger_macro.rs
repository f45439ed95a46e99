// Logging with the call site captured from `file!()` and `line!()`.
// A comma after the logger selects template mode, a semicolon plain mode:
//
//     rotating_logger::info!(logger, "accepted {} from {}", id, peer);
//     rotating_logger::info!(logger; "accepted ", id, " from ", peer);

#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr; $($arg:expr),* $(,)?) => {
        $logger.log(
            $level,
            $crate::SourceLocation::new(file!(), line!()),
            $crate::Message::Plain(&[$(&$arg as &dyn ::std::fmt::Display),*]),
        )
    };
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.log(
            $level,
            $crate::SourceLocation::new(file!(), line!()),
            $crate::Message::Template($template, &[$(&$arg as &dyn ::std::fmt::Display),*]),
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr; $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug; $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr; $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info; $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr; $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning; $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr; $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error; $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}
