use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AlignConfig;
use crate::distance::estimate_distances;
use crate::error::{AnalysisError, Result};
use crate::resample::resample_to_grid;
use crate::types::{AlignedSample, Axis, ChannelSet, DistancedSample, LapTrace};

/// Per-step scale of the relative-speed delta proxy.
const DELTA_STEP_SCALE: f64 = 0.01;

/// Subject and reference laps on a shared distance grid and a shared time grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedLaps {
    pub by_distance: Vec<AlignedSample>,
    pub by_time: Vec<AlignedSample>,
}

impl AlignedLaps {
    pub fn for_axis(&self, axis: Axis) -> &[AlignedSample] {
        match axis {
            Axis::Distance => &self.by_distance,
            Axis::Time => &self.by_time,
        }
    }
}

/// Align a subject lap against an optional reference lap in both domains.
///
/// Without a reference every reference channel is zero and `delta` stays 0.
///
/// # Errors
/// `AnalysisError::EmptyLap` when the subject has no samples.
pub fn align_laps(
    subject: &LapTrace,
    reference: Option<&LapTrace>,
    expected_lap_distance_m: Option<f64>,
) -> Result<AlignedLaps> {
    let cfg = AlignConfig {
        expected_lap_distance_m,
        ..AlignConfig::default()
    };
    align_laps_with(subject, reference, &cfg)
}

/// Same as [`align_laps`] with an explicit grid configuration.
pub fn align_laps_with(
    subject: &LapTrace,
    reference: Option<&LapTrace>,
    cfg: &AlignConfig,
) -> Result<AlignedLaps> {
    if subject.is_empty() {
        return Err(AnalysisError::EmptyLap);
    }

    let user = estimate_distances(&subject.samples, cfg.expected_lap_distance_m);
    let reference = reference
        .filter(|lap| !lap.is_empty())
        .map(|lap| estimate_distances(&lap.samples, cfg.expected_lap_distance_m));

    debug!(
        "aligning {} subject samples against {} reference samples",
        user.len(),
        reference.as_ref().map_or(0, |r| r.len())
    );

    Ok(AlignedLaps {
        by_distance: align_axis(&user, reference.as_deref(), Axis::Distance, cfg.target_point_count),
        by_time: align_axis(&user, reference.as_deref(), Axis::Time, cfg.target_point_count),
    })
}

/// Largest value a lap reaches on `axis`.
fn axis_max(points: &[DistancedSample], axis: Axis) -> f64 {
    points
        .iter()
        .map(|p| p.axis_value(axis))
        .fold(0.0, f64::max)
}

fn align_axis(
    user: &[DistancedSample],
    reference: Option<&[DistancedSample]>,
    axis: Axis,
    target_point_count: usize,
) -> Vec<AlignedSample> {
    let user_max = axis_max(user, axis);
    let domain_max = match reference {
        Some(r) => user_max.min(axis_max(r, axis)),
        None => user_max,
    };

    let user_grid = resample_to_grid(user, target_point_count, domain_max, axis);
    let ref_grid = reference.map(|r| resample_to_grid(r, target_point_count, domain_max, axis));

    let mut delta = 0.0;
    let mut rows = Vec::with_capacity(user_grid.len());

    for (index, u) in user_grid.iter().enumerate() {
        let user_ch = ChannelSet::from_sample(u);
        let ref_ch = ref_grid
            .as_ref()
            .and_then(|g| g.get(index))
            .map(ChannelSet::from_sample)
            .unwrap_or_default();

        if index > 0 && ref_grid.is_some() {
            // An overflowing step holds the running delta
            let next = delta + delta_step(user_ch.speed_kph, ref_ch.speed_kph);
            if next.is_finite() {
                delta = next;
            }
        }

        rows.push(AlignedSample {
            index,
            distance: u.distance_m,
            time: u.time_s,
            user: user_ch,
            reference: ref_ch,
            delta,
        });
    }

    debug!(
        "{} grid: {} points over [0, {:.3}]{}, final delta {:+.3}s",
        axis.as_str(),
        rows.len(),
        domain_max,
        axis.unit(),
        delta
    );

    rows
}

/// Relative-speed proxy for instantaneous time loss at one grid step.
fn delta_step(user_speed: f64, reference_speed: f64) -> f64 {
    (reference_speed - user_speed) / user_speed.max(1.0) * DELTA_STEP_SCALE
}
