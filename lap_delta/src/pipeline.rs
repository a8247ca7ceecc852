use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::aggregate_by_corner;
use crate::align::align_laps_with;
use crate::config::AnalysisConfig;
use crate::corners::segment_corners;
use crate::error::Result;
use crate::improvements::{detect_improvement_areas_with, has_reference};
use crate::types::{AlignedSample, Axis, Corner, ImprovementArea, LapTrace};

/// Aligned data, corners and ranked improvements on one axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainAnalysis {
    pub axis: Axis,
    pub aligned: Vec<AlignedSample>,
    pub corners: Vec<Corner>,
    /// One entry per populated corner, largest gain first
    pub improvements: Vec<ImprovementArea>,
}

impl DomainAnalysis {
    /// Delta at the end of the grid (0 without a reference lap).
    pub fn final_delta(&self) -> f64 {
        self.aligned.last().map_or(0.0, |r| r.delta)
    }

    /// False when the subject was aligned without a usable reference lap.
    pub fn has_reference(&self) -> bool {
        has_reference(&self.aligned)
    }

    pub fn total_gain_potential(&self) -> f64 {
        self.improvements.iter().map(|a| a.gain_potential_s).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapAnalysis {
    pub by_distance: DomainAnalysis,
    pub by_time: DomainAnalysis,
    /// Subject lap time minus reference lap time, seconds
    pub lap_time_delta_s: Option<f64>,
}

impl LapAnalysis {
    pub fn domain(&self, axis: Axis) -> &DomainAnalysis {
        match axis {
            Axis::Distance => &self.by_distance,
            Axis::Time => &self.by_time,
        }
    }

    pub fn into_domain(self, axis: Axis) -> DomainAnalysis {
        match axis {
            Axis::Distance => self.by_distance,
            Axis::Time => self.by_time,
        }
    }
}

/// Run the full chain: align both laps, then segment, detect and rank per axis.
///
/// # Errors
/// Fails on an invalid config or a subject lap without samples.
pub fn analyze_laps(
    subject: &LapTrace,
    reference: Option<&LapTrace>,
    cfg: &AnalysisConfig,
) -> Result<LapAnalysis> {
    cfg.validate()?;
    let aligned = align_laps_with(subject, reference, &cfg.align)?;

    let reference = reference.filter(|lap| !lap.is_empty());
    let lap_time_delta_s = reference.map(|r| subject.lap_duration_s - r.lap_duration_s);

    Ok(LapAnalysis {
        by_distance: analyze_domain(aligned.by_distance, Axis::Distance, cfg),
        by_time: analyze_domain(aligned.by_time, Axis::Time, cfg),
        lap_time_delta_s,
    })
}

/// Corners, improvement windows and per-corner ranking for one aligned sequence.
pub fn analyze_domain(aligned: Vec<AlignedSample>, axis: Axis, cfg: &AnalysisConfig) -> DomainAnalysis {
    let corners = segment_corners(&aligned, axis, &cfg.corners);
    let candidates = detect_improvement_areas_with(&aligned, axis, &cfg.windows);
    let candidate_count = candidates.len();
    let improvements = aggregate_by_corner(&corners, candidates);

    debug!(
        "{} analysis: {} corners, {} candidate windows, {} ranked improvements",
        axis.as_str(),
        corners.len(),
        candidate_count,
        improvements.len()
    );

    DomainAnalysis {
        axis,
        aligned,
        corners,
        improvements,
    }
}
