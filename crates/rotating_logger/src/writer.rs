use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Local};

use crate::queue::{QueueEvent, RecordReceiver};
use crate::rotation::{enforce_retention, next_generation_name, GenerationPattern, RotationPolicy};
use crate::LoggerError;

const WRITER_THREAD_NAME: &str = "log-writer";
const LINE_TERMINATOR: u8 = b'\n';

/// The file currently being appended to. Only the writer thread touches it.
struct ActiveFile {
    path: PathBuf,
    file: File,
    size: u64,
}

impl ActiveFile {
    fn open(path: PathBuf) -> Result<Self, LoggerError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggerError::OpenFile { path: path.clone(), source })?;
        // A name collision with a file from another run appends to it.
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(ActiveFile { path, file, size })
    }
}

pub(crate) struct WriterLoop {
    receiver: RecordReceiver,
    policy: RotationPolicy,
    directory: PathBuf,
    base_name: String,
    pattern: GenerationPattern,
    active: ActiveFile,
    last_generation_ms: i64,
}

impl WriterLoop {
    /// Applies retention to files left by earlier runs, then opens a fresh
    /// generation. Runs on the constructing thread so open failures reach the caller.
    pub(crate) fn start(
        directory: &Path,
        base_name: &str,
        policy: RotationPolicy,
        receiver: RecordReceiver,
    ) -> Result<Self, LoggerError> {
        let pattern = GenerationPattern::new(base_name)?;
        if let Err(err) = enforce_retention(directory, &pattern, policy.max_generations, None) {
            eprintln!("Failed to apply log retention in {}: {}", directory.display(), err);
        }

        let (path, last_generation_ms) = free_generation_path(directory, base_name, i64::MIN);
        let active = ActiveFile::open(path)?;

        Ok(WriterLoop {
            receiver,
            policy,
            directory: directory.to_path_buf(),
            base_name: base_name.to_string(),
            pattern,
            active,
            last_generation_ms,
        })
    }

    pub(crate) fn active_path(&self) -> &Path {
        &self.active.path
    }

    pub(crate) fn spawn(self) -> Result<JoinHandle<Result<(), LoggerError>>, LoggerError> {
        thread::Builder::new()
            .name(WRITER_THREAD_NAME.into())
            .spawn(move || {
                let result = self.run();
                if let Err(err) = &result {
                    eprintln!("Log writer stopped: {}", err);
                }
                result
            })
            .map_err(LoggerError::Spawn)
    }

    pub(crate) fn run(mut self) -> Result<(), LoggerError> {
        loop {
            match self.receiver.pop_blocking() {
                QueueEvent::Line(line) => self.write_line(line)?,
                QueueEvent::Flush(ack) => {
                    self.sync();
                    let _ = ack.send(());
                }
                QueueEvent::EndOfStream => break,
            }
        }

        self.sync();
        Ok(())
    }

    /// Lines go straight to the file; this only pushes them to the device.
    fn sync(&self) {
        if let Err(err) = self.active.file.sync_data() {
            eprintln!("Failed to sync log file {}: {}", self.active.path.display(), err);
        }
    }

    fn write_line(&mut self, line: String) -> Result<(), LoggerError> {
        let mut record = line.into_bytes();
        record.push(LINE_TERMINATOR);

        if self.policy.should_rotate(self.active.size, record.len() as u64) {
            self.rotate()?;
        }

        match self.active.file.write_all(&record) {
            Ok(()) => self.active.size += record.len() as u64,
            Err(err) => eprintln!("Failed to write to log file {}: {}", self.active.path.display(), err),
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), LoggerError> {
        self.sync();

        let (path, generation_ms) =
            free_generation_path(&self.directory, &self.base_name, self.last_generation_ms);
        self.active = ActiveFile::open(path)?;
        self.last_generation_ms = generation_ms;

        if let Err(err) = enforce_retention(
            &self.directory,
            &self.pattern,
            self.policy.max_generations,
            Some(&self.active.path),
        ) {
            eprintln!("Failed to apply log retention in {}: {}", self.directory.display(), err);
        }
        Ok(())
    }
}

/// Picks a generation stamp strictly after `last_ms` whose file name is not taken yet.
fn free_generation_path(directory: &Path, base_name: &str, last_ms: i64) -> (PathBuf, i64) {
    let mut ms = Local::now().timestamp_millis().max(last_ms.saturating_add(1));
    loop {
        let stamp = stamp_from_millis(ms);
        let path = directory.join(next_generation_name(base_name, &stamp));
        if !path.exists() {
            return (path, ms);
        }
        ms += 1;
    }
}

fn stamp_from_millis(ms: i64) -> DateTime<Local> {
    DateTime::from_timestamp_millis(ms)
        .map(|utc| utc.with_timezone(&Local))
        .unwrap_or_else(Local::now)
}
