use serde::{Deserialize, Serialize};

/// One simulator tick as captured by the telemetry bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Monotonic capture time in milliseconds
    pub timestamp_ms: i64,
    /// Speed in meters per second
    pub speed_mps: f64,
    /// Throttle position (0-1)
    pub throttle: f64,
    /// Brake pressure (0-1)
    pub brake: f64,
    /// Steering wheel angle in radians
    #[serde(default)]
    pub steering_rad: f64,
    #[serde(default)]
    pub gear: Option<i32>,
    #[serde(default)]
    pub rpm: Option<f64>,
}

/// One complete lap of telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LapTrace {
    /// Caller-assigned lap identity, used as a cache key only
    #[serde(default)]
    pub id: Option<String>,
    pub samples: Vec<RawSample>,
    /// Authoritative lap time in seconds (independent of sample count)
    pub lap_duration_s: f64,
}

impl LapTrace {
    pub fn new(samples: Vec<RawSample>, lap_duration_s: f64) -> Self {
        Self {
            id: None,
            samples,
            lap_duration_s,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A raw sample with derived distance and re-zeroed time.
///
/// Optional raw fields are resolved here: a missing gear becomes 0 and a
/// missing rpm becomes 0.0, so nothing downstream handles `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistancedSample {
    pub timestamp_ms: i64,
    pub speed_mps: f64,
    pub throttle: f64,
    pub brake: f64,
    pub steering_rad: f64,
    pub gear: i32,
    pub rpm: f64,
    /// Cumulative distance from lap start in meters
    pub distance_m: f64,
    /// Seconds since the first sample of the lap
    pub time_s: f64,
}

impl DistancedSample {
    /// Value of this sample on the given axis.
    pub fn axis_value(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Distance => self.distance_m,
            Axis::Time => self.time_s,
        }
    }

    pub(crate) fn set_axis_value(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Distance => self.distance_m = value,
            Axis::Time => self.time_s = value,
        }
    }
}

/// Sampling axis of an aligned dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Distance,
    Time,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Distance => "distance",
            Axis::Time => "time",
        }
    }

    /// Unit suffix used in human-readable output.
    pub fn unit(&self) -> &'static str {
        match self {
            Axis::Distance => "m",
            Axis::Time => "s",
        }
    }
}

/// Per-lap channel values at one grid point.
///
/// Units are the charting units: km/h for speed, percent (0-100) for pedals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSet {
    pub speed_kph: f64,
    pub throttle_pct: f64,
    pub brake_pct: f64,
    pub steering_rad: f64,
    pub rpm: f64,
    pub gear: i32,
}

impl ChannelSet {
    pub(crate) fn from_sample(sample: &DistancedSample) -> Self {
        Self {
            speed_kph: (sample.speed_mps * 3.6).min(f64::MAX),
            throttle_pct: sample.throttle * 100.0,
            brake_pct: sample.brake * 100.0,
            steering_rad: sample.steering_rad,
            rpm: sample.rpm,
            gear: sample.gear,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.speed_kph == 0.0
            && self.throttle_pct == 0.0
            && self.brake_pct == 0.0
            && self.steering_rad == 0.0
            && self.rpm == 0.0
    }
}

/// One row of an aligned dataset, keyed by grid index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedSample {
    pub index: usize,
    /// Distance along the lap in meters
    pub distance: f64,
    /// Lap time in seconds
    pub time: f64,
    pub user: ChannelSet,
    pub reference: ChannelSet,
    /// Cumulative time delta in seconds, positive when the subject is behind
    pub delta: f64,
}

impl AlignedSample {
    pub fn axis_value(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Distance => self.distance,
            Axis::Time => self.time,
        }
    }
}

/// A contiguous braking interval in an aligned dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub start_index: usize,
    pub end_index: usize,
    pub center_index: usize,
    pub start_value: f64,
    pub end_value: f64,
}

impl Corner {
    pub fn midpoint(&self) -> f64 {
        (self.start_value + self.end_value) / 2.0
    }

    /// Number of grid points covered, both ends inclusive.
    pub fn point_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementKind {
    Braking,
    Acceleration,
}

impl ImprovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImprovementKind::Braking => "braking",
            ImprovementKind::Acceleration => "acceleration",
        }
    }
}

/// A localized opportunity where the reference lap's inputs lead the subject's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub start_value: f64,
    pub end_value: f64,
    pub start_index: usize,
    pub end_index: usize,
    #[serde(rename = "type")]
    pub kind: ImprovementKind,
    /// Estimated time gain in seconds, never negative
    pub gain_potential_s: f64,
    pub description: String,
}

impl ImprovementArea {
    pub fn midpoint(&self) -> f64 {
        (self.start_value + self.end_value) / 2.0
    }
}

/// Replace NaN and infinities with zero.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
