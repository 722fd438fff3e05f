//! # Error Types
//!
//! This module defines error types used throughout the gabarit library.
//!
//! Only template-level problems are fatal to composition. Element-local
//! failures (image lookups, scripts) are degraded to placeholder nodes by the
//! compositor and never reach the caller as `Err`.

use thiserror::Error;

/// Failure to derive an image URL for one element.
///
/// Carries a short diagnostic meant for the user, never the underlying
/// transport or parser error. `Clone` so results can be memoized per batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ImageResolutionError(pub String);

impl ImageResolutionError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Main error type for gabarit operations
#[derive(Debug, Error)]
pub enum GabaritError {
    /// Template or engine configuration is unusable (missing custom page
    /// dimensions, malformed stored configuration, invalid env knobs).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Image URL could not be resolved
    #[error("Image resolution error: {0}")]
    ImageResolution(#[from] ImageResolutionError),

    /// User script exceeded its wall-clock budget
    #[error("Script timed out")]
    ScriptTimeout,

    /// User script failed; details are intentionally suppressed
    #[error("Script failed")]
    ScriptFault,

    /// Render request was abandoned by the caller
    #[error("Render cancelled")]
    Cancelled,

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GabaritError {
    pub fn config(msg: impl Into<String>) -> Self {
        GabaritError::Configuration(msg.into())
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, GabaritError>;
