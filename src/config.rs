//! Engine runtime configuration loaded from environment variables.
//!
//! Rendering constants (page formats, mm↔px factor, schema version, guide
//! threshold, script timeout) are fixed and live next to the code that uses
//! them. Only transport and scheduling knobs are configurable here.

use std::time::Duration;

use crate::error::{GabaritError, Result};

/// Runtime knobs for image fetching and batch scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Per-request timeout for product page fetches (default: 10 s).
    pub fetch_timeout: Duration,
    /// User agent sent with page fetches (default: `gabarit/<version>`).
    pub user_agent: String,
    /// Rows composed in parallel by a batch (default: `4`).
    pub batch_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            user_agent: format!("gabarit/{}", env!("CARGO_PKG_VERSION")),
            batch_concurrency: 4,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default            |
    /// |------------------------------|--------------------|
    /// | `GABARIT_FETCH_TIMEOUT_SECS` | `10`               |
    /// | `GABARIT_USER_AGENT`         | `gabarit/<version>` |
    /// | `GABARIT_BATCH_CONCURRENCY`  | `4`                |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let fetch_timeout = match lookup("GABARIT_FETCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive(
                "GABARIT_FETCH_TIMEOUT_SECS",
                &raw,
            )?),
            None => defaults.fetch_timeout,
        };

        let user_agent = lookup("GABARIT_USER_AGENT")
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or(defaults.user_agent);

        let batch_concurrency = match lookup("GABARIT_BATCH_CONCURRENCY") {
            Some(raw) => parse_positive("GABARIT_BATCH_CONCURRENCY", &raw)? as usize,
            None => defaults.batch_concurrency,
        };

        Ok(Self {
            fetch_timeout,
            user_agent,
            batch_concurrency,
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(GabaritError::config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
