//! Template session summary.
//!
//! Deterministic prose over the ranked improvement areas. This is what the
//! assistant falls back to when the language model is unavailable.

use lap_delta::{DomainAnalysis, SessionInfo};
use std::fmt::Write;

/// How many ranked areas the summary mentions by name.
const MENTIONED_AREAS: usize = 3;

pub fn session_summary(session: Option<&SessionInfo>, analysis: &DomainAnalysis) -> String {
    let mut out = String::new();
    let unit = analysis.axis.unit();

    match session {
        Some(s) => {
            let _ = write!(out, "{} in the {} at {}: ", s.driver_name, s.car_name, s.track_name);
        }
        None => out.push_str("Lap review: "),
    }

    if !analysis.has_reference() {
        let _ = write!(
            out,
            "{} braking zones found. Add a reference lap to get a time comparison.",
            analysis.corners.len()
        );
        return out;
    }

    let delta = analysis.final_delta();
    let pace = if delta > 0.0 { "behind" } else { "ahead of" };
    let _ = write!(
        out,
        "{:.2}s {} the reference over {} braking zones.",
        delta.abs(),
        pace,
        analysis.corners.len()
    );

    if analysis.improvements.is_empty() {
        out.push_str(" No clear improvement areas against the reference lap.");
        return out;
    }

    let _ = write!(
        out,
        " {} improvement areas worth about {:.2}s in total.",
        analysis.improvements.len(),
        analysis.total_gain_potential()
    );
    for (rank, area) in analysis.improvements.iter().take(MENTIONED_AREAS).enumerate() {
        let _ = write!(
            out,
            " {}. {:.0}-{:.0}{} ({}, {:.2}s): {}",
            rank + 1,
            area.start_value,
            area.end_value,
            unit,
            area.kind.as_str(),
            area.gain_potential_s,
            area.description
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lap_delta::{AlignedSample, Axis, ChannelSet, Corner, ImprovementArea, ImprovementKind};

    fn analysis(
        final_delta: f64,
        improvements: Vec<ImprovementArea>,
        with_reference: bool,
    ) -> DomainAnalysis {
        let speed = ChannelSet {
            speed_kph: 120.0,
            ..ChannelSet::default()
        };
        let reference = if with_reference { speed } else { ChannelSet::default() };
        let aligned = (0..3)
            .map(|index| AlignedSample {
                index,
                distance: index as f64,
                time: index as f64,
                user: speed,
                reference,
                delta: final_delta * index as f64 / 2.0,
            })
            .collect();
        DomainAnalysis {
            axis: Axis::Distance,
            aligned,
            corners: vec![Corner {
                start_index: 0,
                end_index: 2,
                center_index: 1,
                start_value: 0.0,
                end_value: 2.0,
            }],
            improvements,
        }
    }

    fn area(gain: f64) -> ImprovementArea {
        ImprovementArea {
            start_value: 410.0,
            end_value: 455.0,
            start_index: 60,
            end_index: 67,
            kind: ImprovementKind::Braking,
            gain_potential_s: gain,
            description: "You're braking too late here, brake earlier to set up the corner."
                .to_string(),
        }
    }

    #[test]
    fn test_summary_with_session_and_areas() {
        let session = SessionInfo {
            track_name: "Okayama".to_string(),
            driver_name: "J. Doe".to_string(),
            car_name: "Mazda MX-5".to_string(),
            ..SessionInfo::default()
        };
        let text = session_summary(Some(&session), &analysis(0.84, vec![area(0.31)], true));

        assert!(text.starts_with("J. Doe in the Mazda MX-5 at Okayama: 0.84s behind"));
        assert!(text.contains("1. 410-455m (braking, 0.31s): You're braking too late"));
    }

    #[test]
    fn test_summary_without_reference() {
        let text = session_summary(None, &analysis(0.0, Vec::new(), false));
        assert_eq!(
            text,
            "Lap review: 1 braking zones found. Add a reference lap to get a time comparison."
        );
    }

    #[test]
    fn test_summary_without_areas() {
        let text = session_summary(None, &analysis(-0.2, Vec::new(), true));
        assert!(text.contains("0.20s ahead of the reference"));
        assert!(text.ends_with("No clear improvement areas against the reference lap."));
    }
}
