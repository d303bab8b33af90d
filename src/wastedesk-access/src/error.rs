//! Error types for access configuration.

use thiserror::Error;

/// Errors that can occur while loading access configuration.
///
/// Policy evaluation itself never fails; only reading configuration does.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read access config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config is not valid TOML for [`crate::AccessConfig`].
    #[error("failed to parse access config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but is structurally unusable.
    #[error("invalid access config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
