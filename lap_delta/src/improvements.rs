//! Improvement-window detection.
//!
//! Scans the aligned channels for stretches where the reference lap brakes
//! or gets back on the throttle ahead of the subject, then measures how much
//! of the accumulated delta is paid back shortly afterwards.

use tracing::debug;

use crate::coaching::{generate_coaching_text, CoachingContext};
use crate::config::WindowConfig;
use crate::types::{finite_or_zero, AlignedSample, Axis, ImprovementArea, ImprovementKind};

#[derive(Debug, Clone, Copy)]
struct OpenWindow {
    kind: ImprovementKind,
    start: usize,
    end: usize,
}

/// Detect improvement windows with the production thresholds.
///
/// Returns nothing when the aligned data carries no reference lap.
pub fn detect_improvement_areas(aligned: &[AlignedSample], axis: Axis) -> Vec<ImprovementArea> {
    detect_improvement_areas_with(aligned, axis, &WindowConfig::default())
}

pub fn detect_improvement_areas_with(
    aligned: &[AlignedSample],
    axis: Axis,
    cfg: &WindowConfig,
) -> Vec<ImprovementArea> {
    if !has_reference(aligned) {
        return Vec::new();
    }

    let lookahead = cfg.lookahead_points.max(1);
    let scan_end = aligned.len().saturating_sub(lookahead);
    let mut areas = Vec::new();
    let mut open: Option<OpenWindow> = None;

    for i in 0..scan_end {
        let kind = classify(&aligned[i..i + lookahead], &aligned[i], cfg);

        if let (Some(w), Some(k)) = (open.as_mut(), kind) {
            if w.kind == k {
                w.end = i;
                continue;
            }
        }
        if let Some(w) = open.take() {
            areas.extend(close_window(aligned, axis, cfg, w));
        }
        open = kind.map(|kind| OpenWindow {
            kind,
            start: i,
            end: i,
        });
    }

    if let Some(w) = open {
        areas.extend(close_window(aligned, axis, cfg, w));
    }

    debug!("{} improvement windows on {} grid", areas.len(), axis.as_str());
    areas
}

/// True when any aligned row carries reference-lap channels.
pub(crate) fn has_reference(aligned: &[AlignedSample]) -> bool {
    aligned.iter().any(|row| !row.reference.is_zero())
}

/// Classify grid index `row` using rolling averages over `window` (starting at `row`).
fn classify(
    window: &[AlignedSample],
    row: &AlignedSample,
    cfg: &WindowConfig,
) -> Option<ImprovementKind> {
    let n = window.len() as f64;
    let brake_diff = window
        .iter()
        .map(|r| r.reference.brake_pct - r.user.brake_pct)
        .sum::<f64>()
        / n;
    let throttle_diff = window
        .iter()
        .map(|r| r.reference.throttle_pct - r.user.throttle_pct)
        .sum::<f64>()
        / n;
    let user_brake = window.iter().map(|r| r.user.brake_pct).sum::<f64>() / n;

    let user_speed = row.user.speed_kph;
    let ref_speed = row.reference.speed_kph;

    if brake_diff > cfg.brake_diff_pct
        && ref_speed > cfg.min_braking_speed_kph
        && user_speed > cfg.min_braking_speed_kph
    {
        return Some(ImprovementKind::Braking);
    }

    // A reference already well down on speed is not an acceleration lead
    if throttle_diff > cfg.throttle_diff_pct
        && user_brake < cfg.max_user_brake_pct
        && ref_speed > 0.0
        && user_speed - ref_speed < cfg.max_speed_deficit_kph
    {
        return Some(ImprovementKind::Acceleration);
    }

    None
}

fn close_window(
    aligned: &[AlignedSample],
    axis: Axis,
    cfg: &WindowConfig,
    w: OpenWindow,
) -> Option<ImprovementArea> {
    if w.end + 1 - w.start < cfg.min_points {
        return None;
    }

    let lookahead_idx = (w.end + cfg.gain_lookahead).min(aligned.len() - 1);
    let gain = finite_or_zero(aligned[w.end].delta - aligned[lookahead_idx].delta).max(0.0);

    let start_value = aligned[w.start].axis_value(axis);
    let end_value = aligned[w.end].axis_value(axis);
    let exit = &aligned[w.end];

    let ctx = CoachingContext {
        kind: w.kind,
        max_input_difference: max_input_difference(&aligned[w.start..=w.end], w.kind),
        earlier_by: end_value - start_value,
        exit_speed_difference: exit.reference.speed_kph - exit.user.speed_kph,
    };

    Some(ImprovementArea {
        start_value,
        end_value,
        start_index: w.start,
        end_index: w.end,
        kind: w.kind,
        gain_potential_s: gain,
        description: generate_coaching_text(&ctx).to_string(),
    })
}

fn max_input_difference(rows: &[AlignedSample], kind: ImprovementKind) -> f64 {
    rows.iter()
        .map(|r| match kind {
            ImprovementKind::Braking => r.reference.brake_pct - r.user.brake_pct,
            ImprovementKind::Acceleration => r.reference.throttle_pct - r.user.throttle_pct,
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelSet;

    const N: usize = 150;

    fn flat_rows(speed_kph: f64) -> Vec<AlignedSample> {
        (0..N)
            .map(|index| AlignedSample {
                index,
                distance: index as f64 * 5.0,
                time: index as f64 * 0.2,
                user: ChannelSet {
                    speed_kph,
                    ..ChannelSet::default()
                },
                reference: ChannelSet {
                    speed_kph,
                    ..ChannelSet::default()
                },
                delta: 0.0,
            })
            .collect()
    }

    /// Delta holds at 0.5 up to index 60 then pays back to 0 by index 80.
    fn paying_back_delta(rows: &mut [AlignedSample]) {
        for r in rows.iter_mut() {
            r.delta = match r.index {
                0..=60 => 0.5,
                61..=79 => 0.5 * (80 - r.index) as f64 / 20.0,
                _ => 0.0,
            };
        }
    }

    #[test]
    fn test_no_reference_returns_empty() {
        let mut rows = flat_rows(100.0);
        for r in rows.iter_mut() {
            r.reference = ChannelSet::default();
            r.user.brake_pct = 50.0;
        }
        assert!(detect_improvement_areas(&rows, Axis::Distance).is_empty());
    }

    #[test]
    fn test_early_braking_window() {
        let mut rows = flat_rows(100.0);
        for r in rows.iter_mut().skip(40).take(10) {
            r.reference.brake_pct = 20.0;
        }
        paying_back_delta(&mut rows);

        let areas = detect_improvement_areas(&rows, Axis::Distance);
        assert_eq!(areas.len(), 1);
        let a = &areas[0];
        assert_eq!(a.kind, ImprovementKind::Braking);
        // Rolling average reaches the braking zone two points early
        assert_eq!((a.start_index, a.end_index), (38, 49));
        assert_eq!(a.start_value, 190.0);
        assert!((a.gain_potential_s - 0.5).abs() < 1e-9);
        assert!(a.description.contains("too hard"));
    }

    #[test]
    fn test_braking_ignored_at_low_speed() {
        let mut rows = flat_rows(25.0);
        for r in rows.iter_mut().skip(40).take(10) {
            r.reference.brake_pct = 20.0;
        }
        assert!(detect_improvement_areas(&rows, Axis::Distance).is_empty());
    }

    #[test]
    fn test_early_acceleration_window() {
        let mut rows = flat_rows(120.0);
        for r in rows.iter_mut() {
            r.user.speed_kph = 118.0;
            r.user.throttle_pct = 40.0;
            r.reference.throttle_pct = 40.0;
        }
        for r in rows.iter_mut().skip(60).take(10) {
            r.reference.throttle_pct = 100.0;
        }

        let areas = detect_improvement_areas(&rows, Axis::Time);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].kind, ImprovementKind::Acceleration);
        assert!(areas[0].description.contains("aggressive"));
        assert_eq!(areas[0].gain_potential_s, 0.0);
    }

    #[test]
    fn test_acceleration_skipped_when_reference_much_slower() {
        let mut rows = flat_rows(100.0);
        for r in rows.iter_mut() {
            r.user.speed_kph = 115.0;
        }
        for r in rows.iter_mut().skip(60).take(10) {
            r.reference.throttle_pct = 100.0;
        }
        assert!(detect_improvement_areas(&rows, Axis::Distance).is_empty());
    }

    #[test]
    fn test_acceleration_skipped_while_user_braking() {
        let mut rows = flat_rows(100.0);
        for r in rows.iter_mut().skip(60).take(10) {
            r.reference.throttle_pct = 100.0;
            r.user.brake_pct = 8.0;
            r.reference.brake_pct = 8.0;
        }
        assert!(detect_improvement_areas(&rows, Axis::Distance).is_empty());
    }

    #[test]
    fn test_gain_never_negative() {
        let mut rows = flat_rows(100.0);
        for r in rows.iter_mut() {
            // Subject keeps losing time after the window
            r.delta = r.index as f64 * 0.01;
        }
        for r in rows.iter_mut().skip(40).take(10) {
            r.reference.brake_pct = 20.0;
        }

        let areas = detect_improvement_areas(&rows, Axis::Distance);
        assert!(!areas.is_empty());
        assert!(areas.iter().all(|a| a.gain_potential_s == 0.0));
    }

    #[test]
    fn test_single_point_window_dropped() {
        let cfg = WindowConfig {
            lookahead_points: 1,
            ..WindowConfig::default()
        };
        let mut rows = flat_rows(100.0);
        rows[50].reference.brake_pct = 20.0;
        assert!(detect_improvement_areas_with(&rows, Axis::Distance, &cfg).is_empty());

        rows[51].reference.brake_pct = 20.0;
        assert_eq!(detect_improvement_areas_with(&rows, Axis::Distance, &cfg).len(), 1);
    }

    #[test]
    fn test_type_change_splits_windows() {
        let cfg = WindowConfig {
            lookahead_points: 1,
            ..WindowConfig::default()
        };
        let mut rows = flat_rows(100.0);
        for r in rows.iter_mut().skip(30).take(5) {
            r.reference.brake_pct = 20.0;
        }
        for r in rows.iter_mut().skip(35).take(5) {
            r.reference.throttle_pct = 80.0;
        }

        let areas = detect_improvement_areas_with(&rows, Axis::Distance, &cfg);
        let kinds: Vec<ImprovementKind> = areas.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ImprovementKind::Braking, ImprovementKind::Acceleration]);
        assert_eq!((areas[0].start_index, areas[0].end_index), (30, 34));
        assert_eq!((areas[1].start_index, areas[1].end_index), (35, 39));
    }

    #[test]
    fn test_short_sequence() {
        let rows: Vec<AlignedSample> = flat_rows(100.0).into_iter().take(2).collect();
        assert!(detect_improvement_areas(&rows, Axis::Distance).is_empty());
    }
}
