//! Configuration for the regridder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};
use crate::index::IndexKind;
use crate::types::InterpolationMethod;

/// Minimum number of valid source points needed before interpolating.
pub const DEFAULT_MIN_VALID_POINTS: usize = 10;

/// Configuration for regridding and gap filling.
///
/// Built once per job and passed to [`crate::Regridder`]; never mutated
/// while regridding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegridConfig {
    /// Default interpolation method.
    pub method: InterpolationMethod,

    /// Sources with fewer valid points are skipped.
    pub min_valid_points: usize,

    /// Spatial index used for nearest-neighbor queries.
    pub index: IndexKind,

    /// Optional cutoff in degrees. Target cells whose nearest valid source
    /// point is farther away are left missing, for both methods. `None`
    /// keeps the unbounded nearest-neighbor behavior.
    pub max_distance: Option<f64>,

    /// Average number of points per cell for the bucket index.
    pub bucket_target_occupancy: usize,
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::Nearest,
            min_valid_points: DEFAULT_MIN_VALID_POINTS,
            index: IndexKind::KdTree,
            max_distance: None,
            bucket_target_occupancy: 4,
        }
    }
}

impl RegridConfig {
    /// Parse a configuration from YAML; missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.min_valid_points == 0 {
            return Err(RegridError::invalid_config("min_valid_points must be > 0"));
        }

        if let Some(d) = self.max_distance {
            if !d.is_finite() || d <= 0.0 {
                return Err(RegridError::invalid_config(format!(
                    "max_distance must be a positive number of degrees, got {}",
                    d
                )));
            }
        }

        if self.bucket_target_occupancy == 0 {
            return Err(RegridError::invalid_config(
                "bucket_target_occupancy must be > 0",
            ));
        }

        Ok(())
    }

    pub fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_index(mut self, index: IndexKind) -> Self {
        self.index = index;
        self
    }

    pub fn with_max_distance(mut self, max_distance: Option<f64>) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_min_valid_points(mut self, min_valid_points: usize) -> Self {
        self.min_valid_points = min_valid_points;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegridConfig::default();
        assert_eq!(config.method, InterpolationMethod::Nearest);
        assert_eq!(config.min_valid_points, 10);
        assert_eq!(config.index, IndexKind::KdTree);
        assert_eq!(config.max_distance, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RegridConfig::default();
        config.min_valid_points = 0;
        assert!(config.validate().is_err());

        let config = RegridConfig::default().with_max_distance(Some(0.0));
        assert!(config.validate().is_err());

        let config = RegridConfig::default().with_max_distance(Some(f64::NAN));
        assert!(config.validate().is_err());

        let config = RegridConfig::default().with_max_distance(Some(0.5));
        assert!(config.validate().is_ok());

        let mut config = RegridConfig::default();
        config.bucket_target_occupancy = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = RegridConfig::from_yaml_str("method: linear\nindex: bucket\n").unwrap();
        assert_eq!(config.method, InterpolationMethod::Linear);
        assert_eq!(config.index, IndexKind::Bucket);
        assert_eq!(config.min_valid_points, DEFAULT_MIN_VALID_POINTS);
    }

    #[test]
    fn test_from_yaml_rejects_invalid() {
        assert!(RegridConfig::from_yaml_str("min_valid_points: 0\n").is_err());
        assert!(RegridConfig::from_yaml_str("method: cubic\n").is_err());
    }
}
