//! Error types for llbind-config.

use thiserror::Error;

/// Result type for llbind-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration or symbol tables.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to parse or write the JSON symbol table.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The config lists no headers.
    #[error("No headers listed in `include`")]
    NoHeaders,

    /// Listed headers that exist in none of the include directories.
    #[error("Headers not found: {}", .0.join(", "))]
    HeadersNotFound(Vec<String>),
}
