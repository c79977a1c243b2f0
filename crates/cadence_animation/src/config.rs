//! Scheduler configuration presets.

use crate::error::{AnimationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an [`AnimationScheduler`](crate::AnimationScheduler).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Progress values within this distance of 0 or 1 are snapped exactly.
    pub snap_epsilon: f32,
    /// Whether group child lists are recycled through a pool.
    pub pool_group_sets: bool,
    /// Maximum number of recycled child lists kept around.
    pub max_pooled_sets: usize,
    /// Capacity reserved for records and the running set on `init`.
    pub initial_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl SchedulerConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            snap_epsilon: 1e-4,
            pool_group_sets: true,
            max_pooled_sets: 64,
            initial_capacity: 128,
        }
    }

    /// Configuration that allocates a fresh child list for every group.
    pub fn unpooled() -> Self {
        Self {
            pool_group_sets: false,
            max_pooled_sets: 0,
            ..Self::standard()
        }
    }

    /// Small footprint configuration for tests.
    pub fn testing() -> Self {
        Self {
            snap_epsilon: 1e-4,
            pool_group_sets: true,
            max_pooled_sets: 4,
            initial_capacity: 8,
        }
    }

    /// Set the snapping distance.
    pub fn with_snap_epsilon(mut self, epsilon: f32) -> Self {
        self.snap_epsilon = epsilon;
        self
    }

    /// Enable or disable child list pooling.
    pub fn with_pooling(mut self, enabled: bool) -> Self {
        self.pool_group_sets = enabled;
        self
    }

    /// Set how many recycled child lists are retained.
    pub fn with_max_pooled_sets(mut self, max: usize) -> Self {
        self.max_pooled_sets = max;
        self
    }

    /// Set the initial table capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.snap_epsilon.is_finite() || !(0.0..0.5).contains(&self.snap_epsilon) {
            return Err(AnimationError::InvalidConfig(format!(
                "snap_epsilon must be in [0, 0.5), got {}",
                self.snap_epsilon
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take standard values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded scheduler config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SchedulerConfig::from_toml_str("pool_group_sets = false\n").unwrap();
        assert!(!config.pool_group_sets);
        assert_eq!(config.snap_epsilon, SchedulerConfig::standard().snap_epsilon);
        assert_eq!(config.max_pooled_sets, 64);
    }

    #[test]
    fn test_rejects_out_of_range_epsilon() {
        let err = SchedulerConfig::from_toml_str("snap_epsilon = 0.75").unwrap_err();
        assert!(matches!(err, AnimationError::InvalidConfig(_)));

        let config = SchedulerConfig::standard().with_snap_epsilon(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SchedulerConfig::from_toml_str("snap_epsilon = [").unwrap_err();
        assert!(matches!(err, AnimationError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SchedulerConfig::load("/nonexistent/cadence.toml").unwrap_err();
        assert!(matches!(err, AnimationError::Io(_)));
    }

    #[test]
    fn test_builders() {
        let config = SchedulerConfig::unpooled()
            .with_initial_capacity(16)
            .with_max_pooled_sets(2)
            .with_pooling(true);
        assert!(config.pool_group_sets);
        assert_eq!(config.max_pooled_sets, 2);
        assert_eq!(config.initial_capacity, 16);
        assert!(config.validate().is_ok());
    }
}
