//! Error types for grid configuration.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Configuration errors for grids and domains.
///
/// All of these are programmer or configuration mistakes and are meant to
/// propagate to the caller rather than be recovered from.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Invalid grid specification: {0}")]
    InvalidGridSpec(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GridError {
    /// Create an InvalidGridSpec error.
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidGridSpec(msg.into())
    }
}
