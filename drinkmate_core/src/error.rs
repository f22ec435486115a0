//! Error types for the drinkmate_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for drinkmate_core operations
///
/// The numeric core (similarity, BAC model, risk analysis) is total and
/// never produces these; they come from I/O and input boundaries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog loading or validation error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Serving amount outside the accepted range
    #[error("Invalid amount {0}: must be between 0.5 and 10 in steps of 0.5")]
    InvalidAmount(f64),

    /// No logged drink with this id (or id prefix) in the current session
    #[error("No drink event with id {0}")]
    EventNotFound(String),

    /// Search query matched nothing in the catalog
    #[error("No drink matches '{0}'")]
    NoMatch(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),
}
