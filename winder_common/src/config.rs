//! TOML configuration loading for the coil-winder motion engine.
//!
//! Loads a [`WinderConfig`] bundle with the same bounds the Controller's
//! setters enforce at runtime (§4.5, §6). Missing fields fall back to the
//! startup defaults via `#[serde(default = "...")]`. Validation rejects
//! the whole file on the first violation — never a partially-applied
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    DEFAULT_BOBBIN_WIDTH_MM, DEFAULT_PITCH_MM, DEFAULT_RPM, DEFAULT_X_DIR_SIGN,
    DEFAULT_X_STEPS_PER_REV, DEFAULT_Y_STEPS_PER_MM, RPM_MAX, RPM_MIN,
};

/// Configuration loading/validation error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A parameter was out of its documented bounds.
    #[error("config validation: {0}")]
    Validation(String),
}

/// Startup configuration bundle (§3, §6).
///
/// Every field mirrors a Controller setter and carries the same bounds;
/// loading this from TOML and applying it to a fresh `Controller` has the
/// same effect as calling the corresponding setters in field order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinderConfig {
    /// X microsteps per full spindle revolution (min 1).
    pub x_steps_per_rev: u32,
    /// +1 or -1, selects the X rotation direction.
    pub x_dir_sign: i8,
    /// Y microsteps per millimeter of traverse (must be > 0).
    pub y_steps_per_mm: f64,
    /// Y advance per X revolution, in mm (0 disables Y motion).
    pub pitch_mm: f64,
    /// Usable Y travel from Y=0 to the far edge, in mm (must be > 0).
    pub bobbin_width_mm: f64,
    /// Target spindle rate in rpm, clamped to [1, 5000].
    pub rpm: u32,
}

impl Default for WinderConfig {
    fn default() -> Self {
        Self {
            x_steps_per_rev: DEFAULT_X_STEPS_PER_REV,
            x_dir_sign: DEFAULT_X_DIR_SIGN,
            y_steps_per_mm: DEFAULT_Y_STEPS_PER_MM,
            pitch_mm: DEFAULT_PITCH_MM,
            bobbin_width_mm: DEFAULT_BOBBIN_WIDTH_MM,
            rpm: DEFAULT_RPM,
        }
    }
}

impl WinderConfig {
    /// Validate parameter bounds (mirrors the Controller setter guards).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.x_steps_per_rev < 1 {
            return Err(ConfigError::Validation(format!(
                "x_steps_per_rev {} must be >= 1",
                self.x_steps_per_rev
            )));
        }
        if self.x_dir_sign != 1 && self.x_dir_sign != -1 {
            return Err(ConfigError::Validation(format!(
                "x_dir_sign {} must be +1 or -1",
                self.x_dir_sign
            )));
        }
        if !(self.y_steps_per_mm > 0.0) {
            return Err(ConfigError::Validation(format!(
                "y_steps_per_mm {} must be > 0",
                self.y_steps_per_mm
            )));
        }
        if self.pitch_mm < 0.0 {
            return Err(ConfigError::Validation(format!(
                "pitch_mm {} must be >= 0",
                self.pitch_mm
            )));
        }
        if !(self.bobbin_width_mm > 0.0) {
            return Err(ConfigError::Validation(format!(
                "bobbin_width_mm {} must be > 0",
                self.bobbin_width_mm
            )));
        }
        if self.rpm < RPM_MIN || self.rpm > RPM_MAX {
            return Err(ConfigError::Validation(format!(
                "rpm {} out of range [{}, {}]",
                self.rpm, RPM_MIN, RPM_MAX
            )));
        }
        Ok(())
    }

    /// Load and validate a `WinderConfig` from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&text)
    }

    /// Load and validate a `WinderConfig` from a TOML string (used directly
    /// by tests, and by [`WinderConfig::load`]).
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let config: WinderConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_spec() {
        let cfg = WinderConfig::default();
        assert_eq!(cfg.x_steps_per_rev, 6400);
        assert_eq!(cfg.x_dir_sign, 1);
        assert_eq!(cfg.y_steps_per_mm, 800.0);
        assert_eq!(cfg.pitch_mm, 0.0);
        assert_eq!(cfg.bobbin_width_mm, 21.85);
        assert_eq!(cfg.rpm, 200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = WinderConfig::from_str("rpm = 600\npitch_mm = 0.2\n").unwrap();
        assert_eq!(cfg.rpm, 600);
        assert_eq!(cfg.pitch_mm, 0.2);
        assert_eq!(cfg.x_steps_per_rev, 6400);
        assert_eq!(cfg.bobbin_width_mm, 21.85);
    }

    #[test]
    fn rejects_out_of_range_rpm() {
        let err = WinderConfig::from_str("rpm = 6000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_zero_bobbin_width() {
        let err = WinderConfig::from_str("bobbin_width_mm = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = WinderConfig::from_str("not valid toml {{{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = WinderConfig::load(Path::new("/nonexistent/winder.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reads_a_real_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winder.toml");
        std::fs::write(&path, "rpm = 450\nx_steps_per_rev = 3200\n").unwrap();
        let cfg = WinderConfig::load(&path).unwrap();
        assert_eq!(cfg.rpm, 450);
        assert_eq!(cfg.x_steps_per_rev, 3200);
        assert_eq!(cfg.pitch_mm, DEFAULT_PITCH_MM);
    }
}
