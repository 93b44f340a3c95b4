//! Environment-driven configuration.

use std::path::{Path, PathBuf};

use thiserror::Error;

use farrowline_observability::{LogFormat, UnknownLogFormat};

pub const DATA_DIR_ENV: &str = "FARROWLINE_DATA_DIR";
pub const LOG_FORMAT_ENV: &str = "FARROWLINE_LOG_FORMAT";
pub const DEFAULT_DATA_DIR: &str = "./farrowline-data";

const CYCLES_FILE: &str = "cycles.json";
const MATRICES_FILE: &str = "matrices.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("FARROWLINE_LOG_FORMAT: {0}")]
    LogFormat(#[from] UnknownLogFormat),

    #[error("FARROWLINE_DATA_DIR is set but empty")]
    EmptyDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        match lookup(DATA_DIR_ENV) {
            Some(dir) if dir.trim().is_empty() => return Err(ConfigError::EmptyDataDir),
            Some(dir) => config.data_dir = PathBuf::from(dir.trim()),
            None => tracing::debug!(default = DEFAULT_DATA_DIR, "data dir not set, using default"),
        }

        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            config.log_format = format.parse()?;
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cycles_path(&self) -> PathBuf {
        self.data_dir.join(CYCLES_FILE)
    }

    pub fn matrices_path(&self) -> PathBuf {
        self.data_dir.join(MATRICES_FILE)
    }
}
