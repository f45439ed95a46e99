use std::borrow::Cow;
use std::fmt::{Display, Write};
use std::panic::Location;
use std::thread::ThreadId;

use chrono::{DateTime, Local};

use crate::Level;

const PLACEHOLDER: &str = "{}";

/// Source position a record was emitted from, printed as `file:line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: &'static str, line: u32) -> Self {
        SourceLocation { file, line }
    }

    /// Location of the caller. Propagates through functions marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        SourceLocation {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Message body of a record. Arguments stay unformatted until the record
/// has passed level filtering.
#[derive(Clone, Copy)]
pub enum Message<'a> {
    /// Every argument appended in order, no separator.
    Plain(&'a [&'a dyn Display]),
    /// `{}` placeholders replaced left-to-right by the arguments.
    Template(&'a str, &'a [&'a dyn Display]),
}

impl Message<'_> {
    pub fn render(&self) -> String {
        match self {
            Message::Plain(args) => render_plain(args),
            Message::Template(template, args) => render_template(template, args),
        }
    }
}

pub fn render_plain(args: &[&dyn Display]) -> String {
    let mut out = String::new();
    for arg in args {
        let _ = write!(out, "{}", arg);
    }
    out
}

/// Substitutes `args` into successive `{}` placeholders.
///
/// Once the arguments run out, the rest of the template is emitted verbatim,
/// placeholders included. Arguments without a placeholder are dropped.
pub fn render_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut args = args.iter();

    while let Some(pos) = rest.find(PLACEHOLDER) {
        let Some(arg) = args.next() else {
            break;
        };
        out.push_str(&rest[..pos]);
        let _ = write!(out, "{}", arg);
        rest = &rest[pos + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}

/// Keeps a record on a single line of the output file.
fn escape_line_breaks(message: &str) -> Cow<'_, str> {
    if !message.contains(['\n', '\r']) {
        return Cow::Borrowed(message);
    }
    let mut escaped = String::with_capacity(message.len() + 8);
    for c in message.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// `ThreadId(7)` -> `7`
pub(crate) fn thread_label(thread_id: ThreadId) -> String {
    let debug = format!("{:?}", thread_id);
    debug
        .strip_prefix("ThreadId(")
        .and_then(|s| s.strip_suffix(')'))
        .map(str::to_string)
        .unwrap_or(debug)
}

#[derive(Clone, Debug)]
pub struct LogMessage {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Local>,
    pub(crate) pid: u32,
    pub(crate) thread_id: ThreadId,
    pub(crate) location: SourceLocation,
    pub(crate) message: String,
}

impl LogMessage {
    /// Captures time and thread of the calling producer.
    pub fn new(level: Level, pid: u32, location: SourceLocation, message: &Message<'_>) -> Self {
        LogMessage {
            level,
            timestamp: Local::now(),
            pid,
            thread_id: std::thread::current().id(),
            location,
            message: message.render(),
        }
    }
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} [{}:{}] [{}] [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.pid,
            thread_label(self.thread_id),
            self.level,
            self.location,
            escape_line_breaks(&self.message)
        )
    }
}
