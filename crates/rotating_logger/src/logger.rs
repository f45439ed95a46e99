use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;

use crate::config::DEFAULT_DIRECTORY;
use crate::msg_fmt::{LogMessage, Message, SourceLocation};
use crate::queue::{record_queue, RecordQueue};
use crate::rotation::RotationPolicy;
use crate::writer::WriterLoop;
use crate::{Level, LoggerConfig, LoggerError};

type WriterHandle = JoinHandle<Result<(), LoggerError>>;

/// Asynchronous file logger.
///
/// Producers render their records and hand them to a queue; one background
/// thread appends them to the active file and rotates it by size. Dropping the
/// logger (or calling [`Logger::shutdown`]) writes out everything queued so far
/// before the file is closed.
///
/// Share it between threads with `Arc<Logger>`.
pub struct Logger {
    queue: RecordQueue,
    level: AtomicU8,
    submitted: AtomicU64,
    pid: u32,
    directory: PathBuf,
    file_name: String,
    initial_file: PathBuf,
    writer: Mutex<Option<WriterHandle>>,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        Self::start(config, Path::new(DEFAULT_DIRECTORY))
    }

    pub(crate) fn start(config: LoggerConfig, fallback: &Path) -> Result<Self, LoggerError> {
        // An empty directory resolves to `fallback`.
        let requested = config.directory.clone();
        let config = config.with_defaults_for_empty();
        config.validate()?;

        let directory = resolve_directory(&requested, fallback);
        let policy = RotationPolicy::new(config.max_file_size, config.max_files);
        let (queue, receiver) = record_queue();

        let writer = WriterLoop::start(&directory, &config.file_name, policy, receiver)?;
        let initial_file = writer.active_path().to_path_buf();
        let handle = writer.spawn()?;

        Ok(Logger {
            queue,
            level: AtomicU8::new(config.level as u8),
            submitted: AtomicU64::new(0),
            pid: std::process::id(),
            directory,
            file_name: config.file_name,
            initial_file,
            writer: Mutex::new(Some(handle)),
        })
    }

    pub fn with_defaults() -> Result<Self, LoggerError> {
        Self::new(LoggerConfig::default())
    }

    /// Renders and enqueues one record. Records below the minimum level are
    /// dropped before any formatting happens.
    pub fn log(&self, level: Level, location: SourceLocation, message: Message<'_>) {
        if level < self.level() {
            return;
        }
        let line = LogMessage::new(level, self.pid, location, &message).to_string();
        self.submitted.fetch_add(1, Ordering::Relaxed);
        // A stopped writer has already reported why; producers never fail.
        let _ = self.queue.push(line);
    }

    #[track_caller]
    pub fn debug(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Debug, SourceLocation::caller(), Message::Template(template, args));
    }

    #[track_caller]
    pub fn info(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Info, SourceLocation::caller(), Message::Template(template, args));
    }

    #[track_caller]
    pub fn warning(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Warning, SourceLocation::caller(), Message::Template(template, args));
    }

    #[track_caller]
    pub fn error(&self, template: &str, args: &[&dyn Display]) {
        self.log(Level::Error, SourceLocation::caller(), Message::Template(template, args));
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Release);
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Acquire))
    }

    /// Records that passed level filtering and were handed to the queue.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Blocks until every record enqueued before this call is written.
    /// Returns `false` if the writer is no longer running.
    pub fn flush(&self) -> bool {
        match self.queue.flush_barrier() {
            Some(ack) => ack.recv().is_ok(),
            None => false,
        }
    }

    pub fn is_writer_alive(&self) -> bool {
        let writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.as_ref().map(|handle| !handle.is_finished()).unwrap_or(false)
    }

    /// Drains the queue, closes the file and joins the writer. Returns the
    /// error that stopped the writer early, if any. Later calls are no-ops.
    pub fn shutdown(&self) -> Result<(), LoggerError> {
        let handle = {
            let mut writer = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            writer.take()
        };
        let Some(handle) = handle else {
            return Ok(());
        };

        self.queue.shutdown();
        handle.join().map_err(|_| LoggerError::WriterPanicked)?
    }

    /// Directory the log files are written to, after fallback.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The generation opened when this logger started.
    pub fn initial_file(&self) -> &Path {
        &self.initial_file
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            eprintln!("Logger shut down with error: {}", err);
        }
    }
}

/// Creates `requested`, or `fallback` when that fails or `requested` is empty.
/// Never errors: if both fail, opening the log file reports the problem.
pub(crate) fn resolve_directory(requested: &Path, fallback: &Path) -> PathBuf {
    let usable = !requested.as_os_str().is_empty() && fs::create_dir_all(requested).is_ok();
    let directory = if usable {
        requested
    } else {
        let _ = fs::create_dir_all(fallback);
        fallback
    };
    std::path::absolute(directory).unwrap_or_else(|_| directory.to_path_buf())
}
