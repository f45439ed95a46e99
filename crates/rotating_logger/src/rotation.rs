use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use regex::Regex;

use crate::LoggerError;

/// Size and retention limits applied by the writer before each write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_file_size: u64,
    pub max_generations: usize,
}

impl RotationPolicy {
    pub fn new(max_file_size: u64, max_generations: usize) -> Self {
        RotationPolicy {
            max_file_size,
            max_generations,
        }
    }

    /// An empty file is never rotated: an oversized message goes into the
    /// fresh file instead of triggering another rotation.
    pub fn should_rotate(&self, current_size: u64, incoming_size: u64) -> bool {
        current_size > 0 && current_size.saturating_add(incoming_size) > self.max_file_size
    }
}

fn split_base_name(base_name: &str) -> (&str, &str) {
    let path = Path::new(base_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(base_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(_) => (stem, &base_name[stem.len()..]),
        None => (stem, ""),
    }
}

/// `log.txt` at 2024-03-05 12:34:56.007 -> `log_20240305_123456_007.txt`
pub fn next_generation_name(base_name: &str, timestamp: &DateTime<Local>) -> String {
    let (stem, extension) = split_base_name(base_name);
    format!("{}{}{}", stem, timestamp.format("_%Y%m%d_%H%M%S_%3f"), extension)
}

/// Matches the file names produced by [`next_generation_name`] for one base name.
#[derive(Debug, Clone)]
pub struct GenerationPattern {
    regex: Regex,
}

impl GenerationPattern {
    pub fn new(base_name: &str) -> Result<Self, LoggerError> {
        let (stem, extension) = split_base_name(base_name);
        let regex = Regex::new(&format!(
            r"^{}_\d{{8}}_\d{{6}}_\d{{3}}{}$",
            regex::escape(stem),
            regex::escape(extension)
        ))?;
        Ok(GenerationPattern { regex })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

/// Generation files in `directory`, oldest first. Names sort chronologically.
pub fn list_generations(directory: &Path, pattern: &GenerationPattern) -> io::Result<Vec<PathBuf>> {
    let mut generations = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let matched = entry.file_name().to_str().map(|name| pattern.matches(name)).unwrap_or(false);
        if matched {
            generations.push(entry.path());
        }
    }
    generations.sort();
    Ok(generations)
}

/// Deletes the oldest generations until at most `max_generations` remain.
/// The `active` file is neither counted nor removed. Returns what was deleted.
pub fn enforce_retention(
    directory: &Path,
    pattern: &GenerationPattern,
    max_generations: usize,
    active: Option<&Path>,
) -> io::Result<Vec<PathBuf>> {
    let mut generations = list_generations(directory, pattern)?;
    if let Some(active) = active {
        generations.retain(|path| path != active);
    }

    let excess = generations.len().saturating_sub(max_generations);
    let mut removed = Vec::with_capacity(excess);
    for path in generations.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }
    Ok(removed)
}
