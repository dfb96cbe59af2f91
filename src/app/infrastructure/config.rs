use std::env;
use std::time::Duration;

use tracing::{info, warn};

use super::error::{AppError, Result};

pub const REMOTE_URL_VAR: &str = "CANTOCARDS_REMOTE_URL";
pub const REMOTE_KEY_VAR: &str = "CANTOCARDS_REMOTE_KEY";
pub const REMOTE_TIMEOUT_VAR: &str = "CANTOCARDS_REMOTE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the hosted record store.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteConfig {
    /// Read the connection settings from the process environment.
    ///
    /// Missing credentials are fatal: the caller gets `AppError::Config`
    /// before any request is attempted.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, REMOTE_URL_VAR)?;
        let api_key = required(&lookup, REMOTE_KEY_VAR)?;

        let timeout_secs = match lookup(REMOTE_TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    warn!("{REMOTE_TIMEOUT_VAR} must be positive, using default: {DEFAULT_TIMEOUT_SECS}");
                    DEFAULT_TIMEOUT_SECS
                }
                Err(e) => {
                    warn!("Invalid {REMOTE_TIMEOUT_VAR} value {raw:?}: {e}");
                    DEFAULT_TIMEOUT_SECS
                }
            },
            None => {
                info!("{REMOTE_TIMEOUT_VAR} not set, using default: {DEFAULT_TIMEOUT_SECS}");
                DEFAULT_TIMEOUT_SECS
            }
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{key} is not set"))),
    }
}
