//! Error types for the application.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {message}")]
    ParseError { path: String, message: String },

    #[error("Missing or malformed field in '{path}': {message}")]
    MissingField { path: String, message: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid time-of-day '{value}': {message}")]
    InvalidTime { value: String, message: String },

    #[error("Failed to load server config '{path}': {source}")]
    Server {
        path: String,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Storage bootstrap errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to access database file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
