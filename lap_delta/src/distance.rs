use tracing::debug;

use crate::types::{finite_or_zero, DistancedSample, RawSample};

/// Integrate speed over time into a cumulative distance series.
///
/// Speed is held constant over each preceding interval (left Riemann sum), so
/// `distance[i] = distance[i-1] + speed[i-1] * dt`. When the track length is
/// known the whole series is rescaled to it, which corrects uniform speed
/// sensor bias.
///
/// # Arguments
/// * `samples` - Raw telemetry, ordered by timestamp
/// * `expected_lap_distance_m` - Known lap length in meters, if any
///
/// # Returns
/// One `DistancedSample` per input sample, time re-zeroed to the first sample
pub fn estimate_distances(
    samples: &[RawSample],
    expected_lap_distance_m: Option<f64>,
) -> Vec<DistancedSample> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let t0 = first.timestamp_ms;

    let mut out = Vec::with_capacity(samples.len());
    let mut distance_m = 0.0;
    let mut prev: Option<&RawSample> = None;

    for sample in samples {
        if let Some(p) = prev {
            // Out-of-order timestamps contribute nothing
            let dt_ms = sample.timestamp_ms.saturating_sub(p.timestamp_ms);
            let dt_s = (dt_ms as f64 / 1000.0).max(0.0);
            distance_m = (distance_m + clean_speed(p.speed_mps) * dt_s).min(f64::MAX);
        }
        out.push(DistancedSample {
            timestamp_ms: sample.timestamp_ms,
            speed_mps: clean_speed(sample.speed_mps),
            throttle: finite_or_zero(sample.throttle),
            brake: finite_or_zero(sample.brake),
            steering_rad: finite_or_zero(sample.steering_rad),
            gear: sample.gear.unwrap_or(0),
            rpm: sample.rpm.map(finite_or_zero).unwrap_or(0.0),
            distance_m,
            time_s: sample.timestamp_ms.saturating_sub(t0) as f64 / 1000.0,
        });
        prev = Some(sample);
    }

    if let Some(expected) = expected_lap_distance_m.filter(|d| d.is_finite() && *d > 0.0) {
        if distance_m > 0.0 {
            let scale = expected / distance_m;
            debug!(
                "rescaling integrated distance {:.1}m to {:.1}m (x{:.4})",
                distance_m, expected, scale
            );
            for p in out.iter_mut() {
                p.distance_m *= scale;
            }
        }
    }

    out
}

fn clean_speed(speed_mps: f64) -> f64 {
    finite_or_zero(speed_mps).max(0.0)
}
