use serde::{Deserialize, Serialize};

use crate::types::ImprovementKind;

/// Numeric signature of an improvement window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoachingContext {
    pub kind: ImprovementKind,
    /// Largest reference-minus-user pedal difference inside the window (percent)
    pub max_input_difference: f64,
    /// How far ahead the reference acted, on the active axis (m or s)
    pub earlier_by: f64,
    /// Reference minus user speed at the window exit (km/h)
    pub exit_speed_difference: f64,
}

const BRAKE_TOO_HARD: &str =
    "You're braking too hard here, be smoother on the initial brake application.";
const BRAKE_TOO_LATE: &str = "You're braking too late here, brake earlier to set up the corner.";
const BRAKE_TRAIL: &str = "Trail-brake more smoothly into the apex to carry more speed.";
const EXIT_TOO_HOT: &str = "Corner entry is too hot, focus on a clean exit instead.";
const THROTTLE_AGGRESSIVE: &str = "Be more aggressive on the throttle on the way out.";
const THROTTLE_SQUEEZE: &str = "Squeeze the throttle progressively from the apex.";

/// One-sentence coaching hint for an improvement window.
///
/// Rules are checked in order; the first match wins.
pub fn generate_coaching_text(ctx: &CoachingContext) -> &'static str {
    match ctx.kind {
        ImprovementKind::Braking => {
            if ctx.max_input_difference > 15.0 {
                BRAKE_TOO_HARD
            } else if ctx.earlier_by < 5.0 {
                BRAKE_TOO_LATE
            } else {
                BRAKE_TRAIL
            }
        }
        ImprovementKind::Acceleration => {
            if ctx.exit_speed_difference > 5.0 {
                EXIT_TOO_HOT
            } else if ctx.max_input_difference > 20.0 {
                THROTTLE_AGGRESSIVE
            } else {
                THROTTLE_SQUEEZE
            }
        }
    }
}
