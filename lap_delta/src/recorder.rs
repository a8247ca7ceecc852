use serde::{Deserialize, Serialize};
use std::mem;
use tracing::debug;

use crate::bridge::TelemetryFrame;
use crate::types::{LapTrace, RawSample};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Laps with fewer samples are discarded
    pub min_lap_samples: usize,
    /// A first frame further into the lap than this marks a partial lap
    pub max_start_pct: f64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_lap_samples: 10,
            max_start_pct: 0.05,
        }
    }
}

/// A finished lap, with the session-best lap as it stood before this one.
#[derive(Debug, Clone)]
pub struct CompletedLap {
    pub lap_number: i32,
    pub trace: LapTrace,
    pub reference: Option<LapTrace>,
}

/// Cuts a live stream of bridge frames into complete laps.
pub struct LapRecorder {
    cfg: RecorderConfig,
    lap_number: Option<i32>,
    partial: bool,
    samples: Vec<RawSample>,
    last_timestamp_ms: Option<i64>,
    last_lap_time: f64,
    best: Option<LapTrace>,
}

impl LapRecorder {
    pub fn new(cfg: RecorderConfig) -> Self {
        Self {
            cfg,
            lap_number: None,
            partial: true,
            samples: Vec::new(),
            last_timestamp_ms: None,
            last_lap_time: 0.0,
            best: None,
        }
    }

    /// Feed one frame. Returns the lap that this frame completed, if any.
    pub fn push(&mut self, frame: &TelemetryFrame) -> Option<CompletedLap> {
        let ts = frame.timestamp_ms();
        // The bridge replays its cache when the sim stalls
        if self.last_timestamp_ms.is_some_and(|last| ts <= last) {
            return None;
        }
        self.last_timestamp_ms = Some(ts);

        if !frame.is_on_track {
            if !self.samples.is_empty() {
                debug!("car left the track, dropping {} samples", self.samples.len());
            }
            self.lap_number = None;
            self.samples.clear();
            return None;
        }

        match self.lap_number {
            Some(n) if frame.lap_number == n => {
                self.samples.push(frame.to_raw_sample());
                self.last_lap_time = frame.lap_current_lap_time;
                None
            }
            Some(n) if frame.lap_number > n => {
                let completed = self.close_lap(n, frame.lap_last_lap_time);
                self.start_lap(frame, false);
                completed
            }
            _ => {
                let partial = frame.lap_dist_pct > self.cfg.max_start_pct;
                self.start_lap(frame, partial);
                None
            }
        }
    }

    pub fn best_lap(&self) -> Option<&LapTrace> {
        self.best.as_ref()
    }

    /// Samples recorded so far in the lap in progress.
    pub fn current_len(&self) -> usize {
        self.samples.len()
    }

    fn start_lap(&mut self, frame: &TelemetryFrame, partial: bool) {
        self.lap_number = Some(frame.lap_number);
        self.partial = partial;
        self.samples.clear();
        self.samples.push(frame.to_raw_sample());
        self.last_lap_time = frame.lap_current_lap_time;
    }

    fn close_lap(&mut self, lap_number: i32, reported_lap_time: f64) -> Option<CompletedLap> {
        let samples = mem::take(&mut self.samples);
        if self.partial {
            debug!("lap {} was joined mid-lap, not recorded", lap_number);
            return None;
        }
        if samples.len() < self.cfg.min_lap_samples {
            debug!("lap {} has only {} samples, not recorded", lap_number, samples.len());
            return None;
        }

        let span_s = match (samples.first(), samples.last()) {
            (Some(a), Some(b)) => b.timestamp_ms.saturating_sub(a.timestamp_ms) as f64 / 1000.0,
            _ => 0.0,
        };
        let duration = [reported_lap_time, self.last_lap_time, span_s]
            .into_iter()
            .find(|t| t.is_finite() && *t > 0.0)?;

        let trace = LapTrace::new(samples, duration).with_id(format!("lap-{}", lap_number));
        let reference = self.best.clone();
        if reference
            .as_ref()
            .map_or(true, |best| duration < best.lap_duration_s)
        {
            self.best = Some(trace.clone());
        }

        Some(CompletedLap {
            lap_number,
            trace,
            reference,
        })
    }
}
