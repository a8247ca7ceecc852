//! Lap delta analysis.
//!
//! Aligns a driver's lap against a reference lap on uniform distance and time
//! grids, derives a running time delta between the two, and ranks the corners
//! where the reference brakes or accelerates ahead of the driver.
//!
//! Data flows distance estimation -> grid resampling -> alignment ->
//! corner segmentation and window detection -> per-corner aggregation.
//! Everything is synchronous and free of hidden state: the same inputs give
//! the same outputs.
//!
//! # Example
//!
//! ```ignore
//! use lap_delta::{analyze_laps, AnalysisConfig, LapTrace};
//!
//! let analysis = analyze_laps(&subject, Some(&reference), &AnalysisConfig::default())?;
//! for area in &analysis.by_distance.improvements {
//!     println!("{:.0}m: {} (+{:.2}s)", area.start_value, area.description, area.gain_potential_s);
//! }
//! ```

pub mod aggregate;
pub mod align;
pub mod bridge;
pub mod coaching;
pub mod config;
pub mod corners;
pub mod distance;
pub mod error;
pub mod improvements;
pub mod pipeline;
pub mod recorder;
pub mod resample;
pub mod types;

pub use aggregate::aggregate_by_corner;
pub use align::{align_laps, align_laps_with, AlignedLaps};
pub use bridge::{SessionInfo, TelemetryFrame, TrackCondition};
pub use coaching::{generate_coaching_text, CoachingContext};
pub use config::{AlignConfig, AnalysisConfig, CornerConfig, WindowConfig};
pub use corners::segment_corners;
pub use distance::estimate_distances;
pub use error::AnalysisError;
pub use improvements::{detect_improvement_areas, detect_improvement_areas_with};
pub use pipeline::{analyze_domain, analyze_laps, DomainAnalysis, LapAnalysis};
pub use recorder::{CompletedLap, LapRecorder, RecorderConfig};
pub use resample::resample_to_grid;
pub use types::{
    AlignedSample, Axis, ChannelSet, Corner, DistancedSample, ImprovementArea, ImprovementKind,
    LapTrace, RawSample,
};
