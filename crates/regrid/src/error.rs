//! Error types for regridding.

use grid_common::GridError;
use thiserror::Error;

use crate::types::InterpolationMethod;

/// Errors that can occur while regridding.
///
/// Everything except [`RegridError::InsufficientData`] is a programmer or
/// configuration error. `InsufficientData` is expected in batch runs
/// (cloudy scenes, partial coverage) and the high-level entry points turn it
/// into an all-missing result instead of returning it.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Invalid grid bounds, resolution or domain.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Array lengths do not agree with the declared shape.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// Too few valid source points to interpolate from.
    #[error("not enough valid points for interpolation: {valid} valid, {required} required")]
    InsufficientData { valid: usize, required: usize },

    /// The method cannot be applied to this kind of field.
    #[error("interpolation method '{method}' is not supported: {reason}")]
    UnsupportedMethod {
        method: InterpolationMethod,
        reason: String,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RegridError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for the recoverable "too few valid points" condition.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Result type for regridding operations.
pub type Result<T> = std::result::Result<T, RegridError>;
