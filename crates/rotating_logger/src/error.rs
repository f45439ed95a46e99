use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("failed to open log file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config file {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed logger config")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid logger config: {0}")]
    InvalidConfig(String),

    #[error("unknown log level `{0}`")]
    UnknownLevel(String),

    #[error("invalid log file name pattern")]
    Pattern(#[from] regex::Error),

    #[error("failed to spawn the writer thread")]
    Spawn(#[source] io::Error),

    #[error("writer thread panicked")]
    WriterPanicked,
}
