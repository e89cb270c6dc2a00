//! Error types for the kennel_core library.
//!
//! The prediction functions themselves never fail: unknown inputs come back as
//! `None`. Errors only arise at the edges (files, configuration, strict mode).

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for kennel_core operations
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

    /// Age-group table has gaps, overlaps or bad ids
    #[error("Age group table error: {0}")]
    AgeGroupTable(String),

    /// Record store error
    #[error("Store error: {0}")]
    Store(String),

    /// Frequency code outside the known set (strict mode only)
    #[error("Unknown medication frequency: {0}")]
    UnknownFrequency(String),
}
