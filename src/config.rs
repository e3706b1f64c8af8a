//! Scan tuning configuration
//!
//! Tunables for the focus search: step sizes, settle delay, and the variance
//! ratios controlling pass termination and refocus triggering. Defaults match
//! the actuator and sensor timing the algorithm was characterized against;
//! deployments can override them from a TOML file.

use crate::errors::AfError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Focus scan tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanTuning {
    /// Actuator increment during the coarse pass, in steps.
    pub coarse_step: u32,
    /// Actuator increment during the fine pass, in steps.
    pub fine_step: u32,
    /// Half-width of the fine window as a fraction of the coarse optimum.
    pub fine_range: f64,
    /// Frames discarded after a move while the actuator settles.
    pub settle_frames: u32,
    /// Variance drop (fraction of the pass maximum) that confirms the scan
    /// has passed the peak. Smaller drops are treated as noise.
    pub decline_ratio: f64,
    /// Variance change (fraction of the converged value) that triggers a
    /// full rescan.
    pub refocus_ratio: f64,
}

impl Default for ScanTuning {
    fn default() -> Self {
        Self {
            coarse_step: 30,
            fine_step: 1,
            fine_range: 0.05,
            settle_frames: 10,
            decline_ratio: 0.15,
            refocus_ratio: 0.5,
        }
    }
}

impl ScanTuning {
    /// Check the tunables for values the scan cannot operate with.
    pub fn validate(&self) -> Result<(), AfError> {
        if self.coarse_step == 0 || self.fine_step == 0 {
            return Err(AfError::InvalidTuning(
                "step sizes must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.fine_range) {
            return Err(AfError::InvalidTuning(format!(
                "fine_range {} must be within [0, 1)",
                self.fine_range
            )));
        }
        if !(0.0..1.0).contains(&self.decline_ratio) {
            return Err(AfError::InvalidTuning(format!(
                "decline_ratio {} must be within [0, 1)",
                self.decline_ratio
            )));
        }
        if self.refocus_ratio <= 0.0 {
            return Err(AfError::InvalidTuning(format!(
                "refocus_ratio {} must be positive",
                self.refocus_ratio
            )));
        }
        Ok(())
    }

    /// Load tuning from a TOML file, falling back to defaults when the file
    /// does not exist.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AfError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Tuning file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| AfError::ConfigIo(format!("Failed to read tuning file: {}", e)))?;

        let tuning: ScanTuning = toml::from_str(&contents)
            .map_err(|e| AfError::ConfigIo(format!("Failed to parse tuning file: {}", e)))?;

        tuning.validate()?;

        log::info!("Loaded scan tuning from {:?}", path);
        Ok(tuning)
    }

    /// Save tuning to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AfError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AfError::ConfigIo(format!("Failed to create tuning directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| AfError::ConfigIo(format!("Failed to serialize tuning: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| AfError::ConfigIo(format!("Failed to write tuning file: {}", e)))?;

        log::info!("Saved scan tuning to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = ScanTuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.coarse_step, 30);
        assert_eq!(tuning.fine_step, 1);
        assert_eq!(tuning.settle_frames, 10);
    }

    #[test]
    fn test_zero_step_rejected() {
        let tuning = ScanTuning {
            coarse_step: 0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(AfError::InvalidTuning(_))));
    }

    #[test]
    fn test_ratio_bounds_rejected() {
        let tuning = ScanTuning {
            decline_ratio: 1.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());

        let tuning = ScanTuning {
            fine_range: -0.1,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());

        let tuning = ScanTuning {
            refocus_ratio: 0.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let tuning = ScanTuning {
            coarse_step: 20,
            settle_frames: 4,
            ..Default::default()
        };
        let encoded = toml::to_string_pretty(&tuning).unwrap();
        let decoded: ScanTuning = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, tuning);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tuning = ScanTuning::load_from_file("/nonexistent/crabfocus.toml").unwrap();
        assert_eq!(tuning, ScanTuning::default());
    }
}
