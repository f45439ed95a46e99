use std::env;
use std::path::Path;

use rotating_logger::{LoggerConfig, LoggerError};

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_PRODUCERS: usize = 4;
const DEFAULT_RECORDS_PER_PRODUCER: usize = 1000;

pub struct Config {
    pub logging: LoggerConfig,
    pub producers: usize,
    pub records_per_producer: usize,
}

impl Config {
    /// `LOG_CONFIG` (from the environment or `.env`) picks the file; without
    /// one on disk every setting keeps its default.
    pub fn load() -> Result<Self, LoggerError> {
        let path = env::var("LOG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let logging = if Path::new(&path).exists() {
            LoggerConfig::from_json_file(&path)?
        } else {
            LoggerConfig::default()
        };

        Ok(Self {
            logging,
            producers: env_usize("DEMO_PRODUCERS").unwrap_or(DEFAULT_PRODUCERS),
            records_per_producer: env_usize("DEMO_RECORDS").unwrap_or(DEFAULT_RECORDS_PER_PRODUCER),
        })
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok()?.parse().ok()
}
