//! Error types for the inventory reader.
//!
//! - [`FetchError`] - retrieving the CSV text (HTTP or file)
//! - [`ConfigError`] - environment / flag configuration
//! - [`ExportError`] - writing records back to CSV
//! - [`ServerError`] - HTTP API startup
//!
//! Parsing itself has no error type: malformed input degrades to default
//! values or dropped rows.

use thiserror::Error;

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while retrieving the raw CSV text.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Local source file could not be read.
    #[error("Failed to read file '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value of the wrong shape.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },

    /// A variable that must not be blank is blank.
    #[error("{0} must not be empty")]
    Empty(String),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing records as CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
