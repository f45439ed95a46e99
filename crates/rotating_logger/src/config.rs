use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{Level, LoggerError};

pub const DEFAULT_DIRECTORY: &str = "logs";
pub const DEFAULT_FILE_NAME: &str = "log.txt";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub max_file_size: u64,
    /// Rotated generations kept on disk, not counting the file being written.
    pub max_files: usize,
    pub level: Level,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            file_name: DEFAULT_FILE_NAME.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            level: Level::Debug,
        }
    }
}

impl LoggerConfig {
    pub fn with_directory<P: AsRef<Path>>(mut self, directory: P) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Reads the `"logging"` section of a JSON document. Missing keys keep their defaults.
    ///
    /// ```json
    /// { "logging": { "directory": "logs", "file-name": "server.log",
    ///                "max-file-size": 1048576, "max-files": 5, "log-level": "info" } }
    /// ```
    pub fn from_json(raw_config: &str) -> Result<Self, LoggerError> {
        let config_obj: Value = serde_json::from_str(raw_config)?;
        let logging = &config_obj["logging"];
        let defaults = Self::default();

        let directory = logging["directory"]
            .as_str()
            .map(PathBuf::from)
            .unwrap_or(defaults.directory);
        let file_name = logging["file-name"]
            .as_str()
            .map(str::to_string)
            .unwrap_or(defaults.file_name);
        let max_file_size = match &logging["max-file-size"] {
            Value::Null => defaults.max_file_size,
            value => value
                .as_u64()
                .ok_or_else(|| LoggerError::InvalidConfig(format!("max-file-size must be a positive integer, got {}", value)))?,
        };
        let max_files = match &logging["max-files"] {
            Value::Null => defaults.max_files,
            value => value
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| LoggerError::InvalidConfig(format!("max-files must be a non-negative integer, got {}", value)))?,
        };
        let level = match logging["log-level"].as_str() {
            Some(level) => level.parse()?,
            None => defaults.level,
        };

        let config = Self {
            directory,
            file_name,
            max_file_size,
            max_files,
            level,
        }
        .with_defaults_for_empty();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LoggerError> {
        let path = path.as_ref();
        let raw_config = fs::read_to_string(path).map_err(|source| LoggerError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw_config)
    }

    /// Empty directory or file name mean "use the default".
    pub fn with_defaults_for_empty(mut self) -> Self {
        if self.directory.as_os_str().is_empty() {
            self.directory = PathBuf::from(DEFAULT_DIRECTORY);
        }
        if self.file_name.is_empty() {
            self.file_name = DEFAULT_FILE_NAME.to_string();
        }
        self
    }

    /// An empty file name passes: it stands for [`DEFAULT_FILE_NAME`].
    pub fn validate(&self) -> Result<(), LoggerError> {
        let bare = self.file_name.is_empty()
            || Path::new(&self.file_name)
                .file_name()
                .map(|name| name == self.file_name.as_str())
                .unwrap_or(false);
        if !bare {
            return Err(LoggerError::InvalidConfig(format!(
                "file name `{}` must not contain directory components",
                self.file_name
            )));
        }
        if self.max_file_size == 0 {
            return Err(LoggerError::InvalidConfig("max file size must be greater than zero".to_string()));
        }
        Ok(())
    }
}
