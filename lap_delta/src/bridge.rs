//! Wire types of the simulator telemetry bridge.
//!
//! The bridge substitutes 0 for any sim variable it cannot read, so every
//! field here defaults rather than failing deserialization.

use serde::{Deserialize, Serialize};

use crate::types::RawSample;

/// One `/telemetry` snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelemetryFrame {
    /// Speed in m/s
    pub speed: f64,
    pub rpm: f64,
    /// -1 reverse, 0 neutral, 1.. forward
    pub gear: i32,
    /// Throttle position (0-1)
    pub throttle: f64,
    /// Brake pressure (0-1)
    pub brake: f64,
    /// Steering wheel angle in radians
    pub steering: f64,
    pub lap_current_lap_time: f64,
    pub lap_last_lap_time: f64,
    pub lap_number: i32,
    pub session_time: f64,
    pub session_time_remain: f64,
    pub is_on_track: bool,
    /// Lap progress (0-1)
    pub lap_dist_pct: f64,
    /// Track length in meters
    pub track_length: f64,
    /// Unix timestamp in seconds
    pub timestamp: f64,
}

impl TelemetryFrame {
    /// Capture time in milliseconds, falling back to session time when the
    /// wall-clock stamp is missing.
    pub fn timestamp_ms(&self) -> i64 {
        let secs = if self.timestamp > 0.0 {
            self.timestamp
        } else {
            self.session_time
        };
        (secs * 1000.0).round() as i64
    }

    pub fn to_raw_sample(&self) -> RawSample {
        RawSample {
            timestamp_ms: self.timestamp_ms(),
            speed_mps: self.speed,
            throttle: self.throttle,
            brake: self.brake,
            steering_rad: self.steering,
            gear: Some(self.gear),
            rpm: Some(self.rpm),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCondition {
    #[default]
    Dry,
    Wet,
}

impl TrackCondition {
    /// Map the sim's wetness level (0 unknown, 1 dry .. 7 extremely wet).
    pub fn from_wetness(level: i32) -> Self {
        if level >= 3 {
            TrackCondition::Wet
        } else {
            TrackCondition::Dry
        }
    }
}

/// One `/session` snapshot: track, car and driver metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionInfo {
    pub track_name: String,
    pub track_id: i64,
    pub session_type: String,
    pub driver_name: String,
    pub car_name: String,
    /// Fastest lap of the session in seconds, 0 if none
    pub fastest_lap: f64,
    /// Track length in meters
    pub track_length: f64,
    /// Track surface temperature in Celsius
    pub track_temperature: Option<f64>,
    /// Air temperature in Celsius
    pub air_temperature: Option<f64>,
    pub track_condition: TrackCondition,
    pub timestamp: f64,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            track_name: "Unknown".to_string(),
            track_id: 0,
            session_type: "Unknown".to_string(),
            driver_name: "Unknown".to_string(),
            car_name: "Unknown".to_string(),
            fastest_lap: 0.0,
            track_length: 0.0,
            track_temperature: None,
            air_temperature: None,
            track_condition: TrackCondition::Dry,
            timestamp: 0.0,
        }
    }
}

impl SessionInfo {
    /// Track length to rescale integrated distances to, when the bridge knows it.
    pub fn expected_lap_distance_m(&self) -> Option<f64> {
        (self.track_length.is_finite() && self.track_length > 0.0).then_some(self.track_length)
    }
}
