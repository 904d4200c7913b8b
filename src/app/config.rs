//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dataset::normalize::Normalizer;
use crate::dataset::validate::TensorBounds;
use crate::dataset::Resampler;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Augmentation settings
    #[serde(default)]
    pub augment: AugmentConfig,
    /// Normalization settings
    #[serde(default)]
    pub normalize: NormalizeConfig,
    /// Tensor validation settings
    #[serde(default)]
    pub validate: ValidateConfig,
}

/// Augmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Jitter magnitude for duplicated draws
    pub jitter: f32,
    /// Also rescale the time axis of duplicated draws
    pub perturb_time: bool,
}

/// Normalization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Pause cap between consecutive points (seconds)
    pub max_pause_secs: f32,
    /// Minimum distance between kept points (normalized units)
    pub min_point_distance: f32,
    /// Gap that invalidates a sample outright (seconds)
    pub max_gap_secs: f32,
}

/// Tensor validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Largest plausible |dx| in a normalized spline frame
    pub max_abs_dx: f32,
    /// Largest plausible |dy|
    pub max_abs_dy: f32,
    /// Largest plausible |dt|
    pub max_abs_dt: f32,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            jitter: 0.1,
            perturb_time: true,
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_pause_secs: 0.5,
            min_point_distance: 0.05,
            max_gap_secs: 8.0,
        }
    }
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            max_abs_dx: 30.0,
            max_abs_dy: 2.0,
            max_abs_dt: 30.0,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(0.0..1.0).contains(&self.augment.jitter) || self.augment.jitter == 0.0 {
            return Err(crate::Error::Config(format!(
                "augment.jitter must be in (0, 1), got {}",
                self.augment.jitter
            )));
        }
        if self.normalize.max_pause_secs <= 0.0 {
            return Err(crate::Error::Config(format!(
                "normalize.max_pause_secs must be > 0, got {}",
                self.normalize.max_pause_secs
            )));
        }
        if self.normalize.min_point_distance < 0.0 {
            return Err(crate::Error::Config(format!(
                "normalize.min_point_distance must be >= 0, got {}",
                self.normalize.min_point_distance
            )));
        }
        if self.normalize.max_gap_secs <= self.normalize.max_pause_secs {
            return Err(crate::Error::Config(format!(
                "normalize.max_gap_secs must exceed max_pause_secs, got {}",
                self.normalize.max_gap_secs
            )));
        }
        if self.validate.max_abs_dx <= 0.0
            || self.validate.max_abs_dy <= 0.0
            || self.validate.max_abs_dt <= 0.0
        {
            return Err(crate::Error::Config(
                "validate bounds must all be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".ink_pipeline").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Resampler configured from the `[augment]` section.
    pub fn resampler(&self) -> Resampler {
        Resampler::new(self.augment.jitter, self.augment.perturb_time)
    }

    /// Normalizer configured from the `[normalize]` section.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer {
            max_pause: self.normalize.max_pause_secs,
            min_point_distance: self.normalize.min_point_distance,
            max_gap: self.normalize.max_gap_secs,
        }
    }

    /// Validation bounds from the `[validate]` section.
    pub fn tensor_bounds(&self) -> TensorBounds {
        TensorBounds {
            max_abs_dx: self.validate.max_abs_dx,
            max_abs_dy: self.validate.max_abs_dy,
            max_abs_dt: self.validate.max_abs_dt,
        }
    }
}
