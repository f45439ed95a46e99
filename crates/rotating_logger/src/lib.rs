//! Asynchronous, size-rotated file logging.
//!
//! Producer threads format records and push them onto an unbounded queue; a
//! single writer thread drains it into `{directory}/{stem}_{YYYYMMDD}_{HHMMSS}_{mmm}{ext}`
//! files, rotating before a write would exceed the size cap and deleting the
//! oldest generations past the retention cap.

mod config; pub use config::*;
mod error; pub use error::LoggerError;
mod level; pub use level::Level;
mod logger; pub use logger::Logger;
mod logger_macro;
pub mod msg_fmt; pub use msg_fmt::{Message, SourceLocation};
pub mod queue;
pub mod rotation;
mod writer;
