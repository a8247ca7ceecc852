use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Grid used to make two laps comparable point by point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Number of grid points per aligned dataset. Production value: 500.
    pub target_point_count: usize,
    /// Known track length in meters; distances are rescaled to it when set
    pub expected_lap_distance_m: Option<f64>,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            target_point_count: 500,
            expected_lap_distance_m: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerConfig {
    /// Brake input (percent) above which a corner is open
    pub brake_threshold_pct: f64,
    /// Shortest interval, in grid points, kept as a corner
    pub min_corner_points: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            brake_threshold_pct: 10.0,
            min_corner_points: 5,
        }
    }
}

/// Thresholds for the improvement-window scan.
///
/// Every count here is in grid points, never raw telemetry samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Reference-minus-user brake average (percent) that marks early braking
    pub brake_diff_pct: f64,
    /// Reference-minus-user throttle average (percent) that marks early acceleration
    pub throttle_diff_pct: f64,
    /// Shortest window kept, in grid points
    pub min_points: usize,
    /// Rolling-average span ahead of each index
    pub lookahead_points: usize,
    /// How far past a window's end the delta pay-back is measured
    pub gain_lookahead: usize,
    /// Both laps must exceed this speed (km/h) for a braking candidate
    pub min_braking_speed_kph: f64,
    /// User brake average (percent) below which the user counts as off the brake
    pub max_user_brake_pct: f64,
    /// Acceleration candidates are dropped when the reference is this much slower (km/h)
    pub max_speed_deficit_kph: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            brake_diff_pct: 3.0,
            throttle_diff_pct: 5.0,
            min_points: 2,
            lookahead_points: 3,
            gain_lookahead: 50,
            min_braking_speed_kph: 30.0,
            max_user_brake_pct: 5.0,
            max_speed_deficit_kph: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub align: AlignConfig,
    pub corners: CornerConfig,
    pub windows: WindowConfig,
}

impl AnalysisConfig {
    /// Load a JSON config file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| AnalysisError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.align.target_point_count < 2 {
            return Err(AnalysisError::InvalidConfig(format!(
                "target_point_count must be at least 2, got {}",
                self.align.target_point_count
            )));
        }
        if self.windows.lookahead_points == 0 {
            return Err(AnalysisError::InvalidConfig(
                "lookahead_points must be positive".to_string(),
            ));
        }
        if let Some(len) = self.align.expected_lap_distance_m {
            if !len.is_finite() || len <= 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "expected_lap_distance_m must be positive, got {}",
                    len
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_values() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.align.target_point_count, 500);
        assert_eq!(cfg.corners.brake_threshold_pct, 10.0);
        assert_eq!(cfg.corners.min_corner_points, 5);
        assert_eq!(cfg.windows.lookahead_points, 3);
        assert_eq!(cfg.windows.gain_lookahead, 50);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "align": { "expected_lap_distance_m": 3337.0 }, "windows": { "min_points": 4 } }"#;
        let cfg: AnalysisConfig = serde_json::from_str(json).expect("Should parse partial config");

        assert_eq!(cfg.align.target_point_count, 500);
        assert_eq!(cfg.align.expected_lap_distance_m, Some(3337.0));
        assert_eq!(cfg.windows.min_points, 4);
        assert_eq!(cfg.windows.brake_diff_pct, 3.0);
    }

    #[test]
    fn test_validate_rejects_tiny_grid() {
        let mut cfg = AnalysisConfig::default();
        cfg.align.target_point_count = 1;
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigIo { .. }));
    }
}
