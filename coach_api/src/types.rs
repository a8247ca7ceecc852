use lap_delta::{Axis, ImprovementArea, LapTrace, RawSample, SessionInfo};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PutLap {
    pub lap_duration_s: f64,
    pub samples: Vec<RawSample>,
    /// Known track length in meters; distances are rescaled to it
    pub track_length_m: Option<f64>,
}

impl PutLap {
    /// Check the body and split it into the trace and its known track length.
    ///
    /// A track length of 0 is how the bridge reports "unknown" and maps to None.
    pub fn into_trace(self) -> Result<(LapTrace, Option<f64>), ApiError> {
        if !self.lap_duration_s.is_finite() || self.lap_duration_s <= 0.0 {
            return Err(ApiError::BadRequest(format!(
                "lap_duration_s must be positive, got {}",
                self.lap_duration_s
            )));
        }
        let track_length_m = match self.track_length_m {
            Some(len) if !len.is_finite() || len < 0.0 => {
                return Err(ApiError::BadRequest(format!(
                    "track_length_m must be positive, got {}",
                    len
                )));
            }
            Some(len) if len == 0.0 => None,
            other => other,
        };
        Ok((LapTrace::new(self.samples, self.lap_duration_s), track_length_m))
    }
}

#[derive(Debug, Serialize)]
pub struct LapStored {
    pub id: String,
    pub samples: usize,
    pub replaced: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub subject_id: String,
    pub reference_id: Option<String>,
    #[serde(default = "default_axis")]
    pub axis: Axis,
}

fn default_axis() -> Axis {
    Axis::Distance
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub subject_id: String,
    pub reference_id: Option<String>,
    pub session: Option<SessionInfo>,
}

#[derive(Debug, Serialize)]
pub struct SummaryOut {
    pub summary: String,
    pub improvements: Vec<ImprovementArea>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(lap_duration_s: f64, track_length_m: Option<f64>) -> PutLap {
        PutLap {
            lap_duration_s,
            samples: Vec::new(),
            track_length_m,
        }
    }

    #[test]
    fn test_zero_track_length_means_unknown() {
        let (trace, len) = body(92.4, Some(0.0)).into_trace().expect("Should accept");
        assert_eq!(len, None);
        assert_eq!(trace.lap_duration_s, 92.4);

        let (_, len) = body(92.4, Some(3703.0)).into_trace().expect("Should accept");
        assert_eq!(len, Some(3703.0));
    }

    #[test]
    fn test_bad_track_length_rejected() {
        for len in [-1.0, f64::NAN, f64::INFINITY] {
            let err = body(92.4, Some(len)).into_trace().unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{} accepted", len);
        }
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        for duration in [0.0, -3.0, f64::NAN] {
            let err = body(duration, None).into_trace().unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{} accepted", duration);
        }
    }

    #[test]
    fn test_put_body_from_json() {
        let json = r#"{ "lap_duration_s": 0, "samples": [] }"#;
        let put: PutLap = serde_json::from_str(json).expect("Should parse body");
        let err = put.into_trace().unwrap_err();
        assert_eq!(err.to_string(), "bad request: lap_duration_s must be positive, got 0");
    }
}
