//! Custom error types for scholarpipe.
//!
//! This module defines all error types used throughout the pipeline.
//! All fallible functions return `Result<T, PipelineError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for scholarpipe operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the provider
        code: i32,
        /// Error message from the provider
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Mail composition or delivery error
    #[error("Mail error: {0}")]
    Mail(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `PipelineError`
pub type Result<T> = std::result::Result<T, PipelineError>;
