use thiserror::Error;

use rfidtrack_observability::LogFormat;
use rfidtrack_session::{ConfigError, SessionConfig};

pub const ENV_LOG_FORMAT: &str = "RFID_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConsoleConfigError {
    #[error(transparent)]
    Session(#[from] ConfigError),

    #[error("invalid RFID_LOG_FORMAT: {0}")]
    LogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub session: SessionConfig,
    pub log_format: LogFormat,
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, ConsoleConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConsoleConfigError> {
        let log_format = match lookup(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse().map_err(ConsoleConfigError::LogFormat)?,
            None => LogFormat::default(),
        };
        Ok(Self {
            session: SessionConfig::from_lookup(lookup)?,
            log_format,
        })
    }
}
