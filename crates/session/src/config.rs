//! Session configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

use rfidtrack_inventory::{DEFAULT_EXPIRING_SOON_DAYS, ReconciliationMode, Reconciler};

pub const ENV_BACKEND_URL: &str = "RFID_BACKEND_URL";
pub const ENV_RECONNECT_DELAY_MS: &str = "RFID_RECONNECT_DELAY_MS";
pub const ENV_RECONCILIATION_MODE: &str = "RFID_RECONCILIATION_MODE";
pub const ENV_EXPIRING_SOON_DAYS: &str = "RFID_EXPIRING_SOON_DAYS";

const DEFAULT_BACKEND_URL: &str = "ws://127.0.0.1:8080";
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// `ws://host:port` of the backend's WebSocket endpoint.
    pub backend_url: String,
    /// Fixed delay between a lost connection and the next attempt.
    pub reconnect_delay: Duration,
    pub mode: ReconciliationMode,
    pub expiring_soon_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            mode: ReconciliationMode::default(),
            expiring_soon_days: DEFAULT_EXPIRING_SOON_DAYS,
        }
    }
}

impl SessionConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup; unset keys fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BACKEND_URL) {
            let url = raw.trim();
            match url.strip_prefix("ws://") {
                Some(rest) if !rest.is_empty() => config.backend_url = url.to_string(),
                _ => return Err(ConfigError::invalid(ENV_BACKEND_URL, &raw, "expected a ws://host:port URL")),
            }
        }

        if let Some(raw) = lookup(ENV_RECONNECT_DELAY_MS) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_RECONNECT_DELAY_MS, &raw, e))?;
            config.reconnect_delay = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_RECONCILIATION_MODE) {
            config.mode = raw
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_RECONCILIATION_MODE, &raw, e))?;
        }

        if let Some(raw) = lookup(ENV_EXPIRING_SOON_DAYS) {
            let days: i64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(ENV_EXPIRING_SOON_DAYS, &raw, e))?;
            if !(0..=3650).contains(&days) {
                return Err(ConfigError::invalid(ENV_EXPIRING_SOON_DAYS, &raw, "must be between 0 and 3650"));
            }
            config.expiring_soon_days = days;
        }

        Ok(config)
    }

    /// Build an empty reconciler configured from these settings.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.mode).with_expiring_window(chrono::Duration::days(self.expiring_soon_days))
    }
}
