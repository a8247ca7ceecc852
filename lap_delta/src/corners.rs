//! Corner segmentation from the aligned brake signal.
//!
//! A corner is any stretch where either lap is on the brake above the
//! threshold for at least `min_corner_points` consecutive grid points.

use crate::config::CornerConfig;
use crate::types::{AlignedSample, Axis, Corner};

/// Scan the aligned brake inputs and return the corner intervals in order.
pub fn segment_corners(aligned: &[AlignedSample], axis: Axis, cfg: &CornerConfig) -> Vec<Corner> {
    let mut corners = Vec::new();
    let mut open: Option<usize> = None;

    for (i, row) in aligned.iter().enumerate() {
        let braking = row.user.brake_pct.max(row.reference.brake_pct) > cfg.brake_threshold_pct;
        match (open, braking) {
            (None, true) => open = Some(i),
            (Some(start), false) => {
                push_corner(&mut corners, aligned, axis, cfg, start, i - 1);
                open = None;
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        push_corner(&mut corners, aligned, axis, cfg, start, aligned.len() - 1);
    }

    corners
}

fn push_corner(
    corners: &mut Vec<Corner>,
    aligned: &[AlignedSample],
    axis: Axis,
    cfg: &CornerConfig,
    start: usize,
    end: usize,
) {
    if end + 1 - start < cfg.min_corner_points {
        return;
    }
    corners.push(Corner {
        start_index: start,
        end_index: end,
        center_index: (start + end) / 2,
        start_value: aligned[start].axis_value(axis),
        end_value: aligned[end].axis_value(axis),
    });
}
