//! Configuration management via TOML files.
//!
//! One explicit struct with named option groups: interpolation, averaging,
//! phase tensor ellipses and induction arrows. Missing sections and keys
//! fall back to defaults.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_AVERAGE_NFREQ;
use crate::error::ConfigError;
use crate::transfer_function::InterpolationOptions;

/// Toolkit configuration loaded from a TOML file.
///
/// # Examples
///
/// ```
/// use mtpy_core::config::MtConfig;
/// use mtpy_core::math::InterpolationMethod;
///
/// let config: MtConfig = "[interpolation]\nmethod = \"pchip\"".parse().unwrap();
/// assert_eq!(config.interpolation.method, InterpolationMethod::Pchip);
/// assert_eq!(config.averaging.n_frequencies, 48);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MtConfig {
    pub interpolation: InterpolationOptions,
    pub averaging: AveragingOptions,
    pub ellipse: EllipseOptions,
    pub arrow: ArrowOptions,
}

impl MtConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        contents.parse()
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.averaging.n_frequencies == 0 {
            return Err(ConfigError::Invalid {
                key: "averaging.n_frequencies",
                message: "must be at least 1".into(),
            });
        }
        if !(self.ellipse.size.is_finite() && self.ellipse.size > 0.0) {
            return Err(ConfigError::Invalid {
                key: "ellipse.size",
                message: format!("must be positive, got {}", self.ellipse.size),
            });
        }
        let [min, max, step] = self.ellipse.range;
        if !(min < max && step > 0.0) {
            return Err(ConfigError::Invalid {
                key: "ellipse.range",
                message: format!("expected [min, max, step] with min < max and step > 0, got {:?}", self.ellipse.range),
            });
        }
        if !(self.arrow.size.is_finite() && self.arrow.size > 0.0) {
            return Err(ConfigError::Invalid {
                key: "arrow.size",
                message: format!("must be positive, got {}", self.arrow.size),
            });
        }
        if self.arrow.threshold.is_nan() || self.arrow.threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "arrow.threshold",
                message: format!("must be positive, got {}", self.arrow.threshold),
            });
        }
        Ok(())
    }
}

impl FromStr for MtConfig {
    type Err = ConfigError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: MtConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

/// Station averaging options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AveragingOptions {
    /// Number of log-spaced frequencies of the common grid
    pub n_frequencies: usize,
}

impl Default for AveragingOptions {
    fn default() -> Self {
        Self {
            n_frequencies: DEFAULT_AVERAGE_NFREQ,
        }
    }
}

/// Phase tensor property used to colour ellipses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EllipseColorBy {
    #[default]
    Phimin,
    Phimax,
    Skew,
    Ellipticity,
    Azimuth,
}

/// Phase tensor ellipse options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseOptions {
    /// Size of the major axis in map units
    pub size: f64,
    pub colorby: EllipseColorBy,
    /// Colour range as [min, max, step]
    pub range: [f64; 3],
}

impl EllipseOptions {
    /// Colour bin edges: min, min + step, ..., max
    pub fn color_bounds(&self) -> Vec<f64> {
        let [min, max, step] = self.range;
        if !(step > 0.0) || max < min {
            return vec![min];
        }
        let n = ((max - min) / step + 1e-9).floor() as usize + 1;
        (0..n).map(|i| min + i as f64 * step).collect()
    }
}

impl Default for EllipseOptions {
    fn default() -> Self {
        Self {
            size: 2.0,
            colorby: EllipseColorBy::default(),
            range: [0.0, 90.0, 10.0],
        }
    }
}

/// Induction arrow convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    /// Arrows point toward conductors
    #[default]
    Parkinson,
    /// Arrows point away from conductors
    Wiese,
}

/// Induction arrow options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowOptions {
    /// Length of a unit-magnitude arrow in map units
    pub size: f64,
    pub direction: ArrowDirection,
    /// Arrows with a larger magnitude are not drawn
    pub threshold: f64,
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self {
            size: 2.5,
            direction: ArrowDirection::default(),
            threshold: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{BoundsPolicy, InterpolationMethod};

    #[test]
    fn config_defaults_when_sections_missing() {
        let config: MtConfig = "".parse().unwrap();
        assert_eq!(config, MtConfig::default());
        assert_eq!(config.interpolation.method, InterpolationMethod::Linear);
        assert_eq!(config.interpolation.bounds, BoundsPolicy::Nan);
        assert_eq!(config.arrow.direction, ArrowDirection::Parkinson);
    }

    #[test]
    fn config_parses_custom_values() {
        let toml = r#"
[interpolation]
method = "nearest"
bounds = "fail"
log_space = true

[averaging]
n_frequencies = 20

[ellipse]
size = 0.5
colorby = "skew"
range = [-9.0, 9.0, 3.0]

[arrow]
size = 1.0
direction = "wiese"
threshold = 0.8
"#;
        let config: MtConfig = toml.parse().unwrap();
        assert_eq!(config.interpolation.method, InterpolationMethod::Nearest);
        assert_eq!(config.interpolation.bounds, BoundsPolicy::Fail);
        assert!(config.interpolation.log_space);
        assert_eq!(config.averaging.n_frequencies, 20);
        assert_eq!(config.ellipse.colorby, EllipseColorBy::Skew);
        assert_eq!(config.ellipse.range, [-9.0, 9.0, 3.0]);
        assert_eq!(config.arrow.direction, ArrowDirection::Wiese);
        assert_eq!(config.arrow.threshold, 0.8);
    }

    #[test]
    fn config_rejects_unknown_method() {
        let err = "[interpolation]\nmethod = \"cubic\"".parse::<MtConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_rejects_invalid_ranges() {
        let err = "[averaging]\nn_frequencies = 0".parse::<MtConfig>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "averaging.n_frequencies",
                ..
            }
        ));
        let err = "[ellipse]\nrange = [10.0, 0.0, 1.0]".parse::<MtConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ellipse.range", .. }));
    }

    #[test]
    fn color_bounds_include_max() {
        let options = EllipseOptions::default();
        let bounds = options.color_bounds();
        assert_eq!(bounds.len(), 10);
        assert_eq!(bounds[0], 0.0);
        assert_eq!(bounds[9], 90.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = MtConfig::load_from_file("/nonexistent/mtpy.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
