//! Runtime configuration
//!
//! Read from environment variables, falling back to logged defaults:
//!
//! | Variable                    | Default          |
//! |-----------------------------|------------------|
//! | `VOUCHER_ROSTER_PATH`       | built-in demo    |
//! | `VOUCHER_LOG_API_URL`       | in-memory log    |
//! | `VOUCHER_DEBOUNCE_MS`       | `300`            |
//! | `VOUCHER_EVENT_TITLE`       | `Bano Qabil 3.0` |
//! | `VOUCHER_HTTP_TIMEOUT_SECS` | `10`             |
//! | `VOUCHER_OUTPUT_DIR`        | `.`              |

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::attendance::DEFAULT_TIMEOUT;
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::render::DEFAULT_EVENT_TITLE;

pub const ROSTER_PATH_VAR: &str = "VOUCHER_ROSTER_PATH";
pub const LOG_API_URL_VAR: &str = "VOUCHER_LOG_API_URL";
pub const DEBOUNCE_MS_VAR: &str = "VOUCHER_DEBOUNCE_MS";
pub const EVENT_TITLE_VAR: &str = "VOUCHER_EVENT_TITLE";
pub const HTTP_TIMEOUT_VAR: &str = "VOUCHER_HTTP_TIMEOUT_SECS";
pub const OUTPUT_DIR_VAR: &str = "VOUCHER_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Roster export to load; `None` uses the demo roster
    pub roster_path: Option<PathBuf>,
    /// Base URL of the log API; `None` keeps events in memory
    pub log_api_url: Option<String>,
    pub debounce: Duration,
    pub event_title: String,
    pub http_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster_path: None,
            log_api_url: None,
            debounce: DEFAULT_DEBOUNCE,
            event_title: DEFAULT_EVENT_TITLE.to_string(),
            http_timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let debounce_ms: u64 = try_load(&var, DEBOUNCE_MS_VAR, defaults.debounce.as_millis() as u64)?;
        let timeout_secs: u64 = try_load(&var, HTTP_TIMEOUT_VAR, defaults.http_timeout.as_secs())?;

        Ok(Self {
            roster_path: var(ROSTER_PATH_VAR).map(PathBuf::from),
            log_api_url: var(LOG_API_URL_VAR),
            debounce: Duration::from_millis(debounce_ms),
            event_title: var(EVENT_TITLE_VAR).unwrap_or(defaults.event_title),
            http_timeout: Duration::from_secs(timeout_secs),
            output_dir: var(OUTPUT_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.output_dir),
        })
    }
}

fn try_load<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
