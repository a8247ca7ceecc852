use tracing::debug;

use crate::types::{Axis, DistancedSample};

/// Resample a lap onto a uniform grid over `[0, domain_max]`.
///
/// The output always has exactly `target_point_count` points and its axis
/// values are the exact grid `i / (n - 1) * domain_max`. Every numeric
/// channel is linearly interpolated between the bracketing input points;
/// gear is categorical and snaps to the nearer neighbour.
///
/// A degenerate domain (`domain_max <= 0`, e.g. a single-sample lap) yields
/// the first point repeated with axis value 0, which charts as a flat line.
///
/// # Arguments
/// * `points` - Samples monotonic on `axis`
/// * `target_point_count` - Grid cardinality
/// * `domain_max` - Upper bound of the grid, at most the lap's own maximum
/// * `axis` - Which coordinate the grid is laid over
pub fn resample_to_grid(
    points: &[DistancedSample],
    target_point_count: usize,
    domain_max: f64,
    axis: Axis,
) -> Vec<DistancedSample> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    if target_point_count < 2 {
        let mut p = *first;
        p.set_axis_value(axis, 0.0);
        return vec![p];
    }

    if !domain_max.is_finite() || domain_max <= 0.0 {
        debug!(
            "degenerate {} grid (domain_max={}), repeating first point",
            axis.as_str(),
            domain_max
        );
        let mut p = *first;
        p.set_axis_value(axis, 0.0);
        return vec![p; target_point_count];
    }

    let last_slot = (target_point_count - 1) as f64;
    let mut out = Vec::with_capacity(target_point_count);
    let mut idx = 0;

    for i in 0..target_point_count {
        let target = (i as f64 / last_slot) * domain_max;

        while idx + 1 < points.len() && points[idx + 1].axis_value(axis) < target {
            idx += 1;
        }

        let p1 = &points[idx];
        let Some(p2) = points.get(idx + 1) else {
            // Past the recorded data; only reachable through float rounding
            let mut p = *p1;
            p.set_axis_value(axis, target);
            out.push(p);
            continue;
        };

        let a1 = p1.axis_value(axis);
        let a2 = p2.axis_value(axis);
        let mut p = if a2 == a1 {
            *p1
        } else {
            let ratio = ((target - a1) / (a2 - a1)).clamp(0.0, 1.0);
            interpolate(p1, p2, ratio)
        };
        p.set_axis_value(axis, target);
        out.push(p);
    }

    out
}

fn lerp(a: f64, b: f64, ratio: f64) -> f64 {
    a + (b - a) * ratio
}

fn interpolate(p1: &DistancedSample, p2: &DistancedSample, ratio: f64) -> DistancedSample {
    DistancedSample {
        timestamp_ms: lerp(p1.timestamp_ms as f64, p2.timestamp_ms as f64, ratio).round() as i64,
        speed_mps: lerp(p1.speed_mps, p2.speed_mps, ratio),
        throttle: lerp(p1.throttle, p2.throttle, ratio),
        brake: lerp(p1.brake, p2.brake, ratio),
        steering_rad: lerp(p1.steering_rad, p2.steering_rad, ratio),
        gear: if ratio < 0.5 { p1.gear } else { p2.gear },
        rpm: lerp(p1.rpm, p2.rpm, ratio),
        distance_m: lerp(p1.distance_m, p2.distance_m, ratio),
        time_s: lerp(p1.time_s, p2.time_s, ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time_s: f64, distance_m: f64, speed_mps: f64, gear: i32) -> DistancedSample {
        DistancedSample {
            timestamp_ms: (time_s * 1000.0) as i64,
            speed_mps,
            throttle: 1.0,
            brake: 0.0,
            steering_rad: 0.0,
            gear,
            rpm: 8000.0,
            distance_m,
            time_s,
        }
    }

    #[test]
    fn test_grid_shape() {
        let pts = vec![
            point(0.0, 0.0, 20.0, 3),
            point(1.0, 20.0, 20.0, 3),
            point(2.0, 40.0, 20.0, 3),
        ];
        let out = resample_to_grid(&pts, 500, 40.0, Axis::Distance);

        assert_eq!(out.len(), 500);
        for (i, p) in out.iter().enumerate() {
            let expected = i as f64 * 40.0 / 499.0;
            assert!((p.distance_m - expected).abs() < 1e-9, "Grid value off at {}", i);
            assert!(p.distance_m <= 40.0);
        }
        assert_eq!(out[0].distance_m, 0.0);
        assert_eq!(out[499].distance_m, 40.0);
    }

    #[test]
    fn test_linear_interpolation() {
        let pts = vec![point(0.0, 0.0, 10.0, 2), point(2.0, 30.0, 20.0, 3)];
        let out = resample_to_grid(&pts, 5, 2.0, Axis::Time);

        // Time grid: 0, 0.5, 1.0, 1.5, 2.0
        assert!((out[1].speed_mps - 12.5).abs() < 1e-9);
        assert!((out[2].distance_m - 15.0).abs() < 1e-9);
        assert!((out[2].time_s - 1.0).abs() < 1e-12);
        assert_eq!(out[2].timestamp_ms, 1000);
    }

    #[test]
    fn test_gear_snaps_to_nearest() {
        let pts = vec![point(0.0, 0.0, 10.0, 2), point(1.0, 10.0, 10.0, 3)];
        let out = resample_to_grid(&pts, 5, 10.0, Axis::Distance);

        // Ratios 0, 0.25, 0.5, 0.75, 1.0
        let gears: Vec<i32> = out.iter().map(|p| p.gear).collect();
        assert_eq!(gears, vec![2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_duplicate_axis_values() {
        // Two samples share a timestamp; the grid point lands on that instant
        let pts = vec![
            point(0.0, 0.0, 10.0, 1),
            point(1.0, 10.0, 11.0, 1),
            point(1.0, 10.0, 99.0, 1),
            point(2.0, 20.0, 12.0, 1),
        ];
        let out = resample_to_grid(&pts, 3, 2.0, Axis::Time);

        assert_eq!(out.len(), 3);
        assert_eq!(out[1].time_s, 1.0);
        assert!(out.iter().all(|p| p.speed_mps.is_finite()));
    }

    #[test]
    fn test_degenerate_domain_repeats_first_point() {
        let pts = vec![point(0.0, 0.0, 15.0, 4)];
        let out = resample_to_grid(&pts, 500, 0.0, Axis::Distance);

        assert_eq!(out.len(), 500);
        assert!(out.iter().all(|p| p.distance_m == 0.0 && p.speed_mps == 15.0));
    }

    #[test]
    fn test_domain_shorter_than_data_never_extrapolates() {
        let pts: Vec<DistancedSample> = (0..=100)
            .map(|i| point(i as f64 * 0.1, i as f64, 10.0, 3))
            .collect();
        let out = resample_to_grid(&pts, 50, 60.0, Axis::Distance);

        assert_eq!(out.len(), 50);
        assert!(out.iter().all(|p| p.distance_m <= 60.0));
        assert!((out[49].time_s - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample_to_grid(&[], 500, 10.0, Axis::Time).is_empty());
    }
}
