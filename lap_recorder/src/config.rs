use anyhow::{Context, Result};
use lap_delta::{AnalysisConfig, RecorderConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RecorderSettings {
    /// Overrides the track length reported by the bridge
    pub expected_lap_distance_m: Option<f64>,
    /// How many ranked improvements to log per lap
    pub top_improvements: usize,
    pub recorder: RecorderConfig,
    pub analysis: AnalysisConfig,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            expected_lap_distance_m: None,
            top_improvements: 3,
            recorder: RecorderConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl RecorderSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&data)
            .with_context(|| format!("invalid config JSON in {}", path.display()))?;
        cfg.analysis.validate()?;
        Ok(cfg)
    }

    /// Analysis config for one lap, with the track length resolved.
    ///
    /// The config override wins over the length the bridge reports.
    pub fn analysis_for(&self, bridge_track_length_m: f64) -> AnalysisConfig {
        let mut cfg = self.analysis.clone();
        cfg.align.expected_lap_distance_m = self
            .expected_lap_distance_m
            .or(cfg.align.expected_lap_distance_m)
            .or((bridge_track_length_m > 0.0).then_some(bridge_track_length_m));
        cfg
    }
}

/// Find the recorder config: `RECORDER_CONFIG` first, then the usual spots.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("RECORDER_CONFIG") {
        return Some(PathBuf::from(p));
    }

    let candidates = [
        PathBuf::from("config/recorder.json"),
        PathBuf::from("./recorder.json"),
        {
            let mut p = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
            p.pop(); // exe dir
            p.push("config/recorder.json");
            p
        },
    ];

    candidates.into_iter().find(|c| c.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings() {
        let json = r#"{ "top_improvements": 5, "recorder": { "min_lap_samples": 200 } }"#;
        let cfg: RecorderSettings = serde_json::from_str(json).expect("Should parse settings");

        assert_eq!(cfg.top_improvements, 5);
        assert_eq!(cfg.recorder.min_lap_samples, 200);
        assert_eq!(cfg.recorder.max_start_pct, 0.05);
        assert_eq!(cfg.analysis.align.target_point_count, 500);
    }

    #[test]
    fn test_track_length_precedence() {
        let mut cfg = RecorderSettings::default();
        assert_eq!(cfg.analysis_for(0.0).align.expected_lap_distance_m, None);
        assert_eq!(cfg.analysis_for(4010.0).align.expected_lap_distance_m, Some(4010.0));

        cfg.expected_lap_distance_m = Some(4000.0);
        assert_eq!(cfg.analysis_for(4010.0).align.expected_lap_distance_m, Some(4000.0));
    }
}
