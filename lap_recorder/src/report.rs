use lap_delta::{CompletedLap, ImprovementArea, LapAnalysis};

pub struct LapReport<'a> {
    pub lap_number: i32,
    pub lap_time_s: f64,
    pub delta_to_best_s: Option<f64>,
    pub status: &'static str,
    pub top: &'a [ImprovementArea],
}

/// Summarize an analysed lap for the log, top `top_n` improvements only.
pub fn lap_report<'a>(lap: &CompletedLap, analysis: &'a LapAnalysis, top_n: usize) -> LapReport<'a> {
    let delta = analysis.lap_time_delta_s;
    let status = match delta {
        None => "FIRST_LAP",
        Some(d) if d < 0.0 => "NEW_BEST",
        Some(d) if d < 0.3 => "CLOSE",
        Some(d) if d < 1.0 => "OFF_PACE",
        Some(_) => "SLOW",
    };

    let improvements = &analysis.by_distance.improvements;
    LapReport {
        lap_number: lap.lap_number,
        lap_time_s: lap.trace.lap_duration_s,
        delta_to_best_s: delta,
        status,
        top: &improvements[..top_n.min(improvements.len())],
    }
}
