use crate::types::{Corner, ImprovementArea};

/// Keep the single best improvement area per corner, ranked by gain.
///
/// Each area goes to the corner whose midpoint is nearest its own midpoint;
/// on equal distance the earlier corner wins. Within a corner the first area
/// with the largest gain is kept. Without corners nothing can be assigned and
/// the result is empty.
pub fn aggregate_by_corner(corners: &[Corner], areas: Vec<ImprovementArea>) -> Vec<ImprovementArea> {
    if corners.is_empty() {
        return Vec::new();
    }

    let mut best: Vec<Option<ImprovementArea>> = vec![None; corners.len()];
    for area in areas {
        let idx = nearest_corner(corners, area.midpoint());
        let replace = match &best[idx] {
            Some(kept) => area.gain_potential_s > kept.gain_potential_s,
            None => true,
        };
        if replace {
            best[idx] = Some(area);
        }
    }

    let mut ranked: Vec<ImprovementArea> = best.into_iter().flatten().collect();
    // Stable: equal gains stay in corner order
    ranked.sort_by(|a, b| b.gain_potential_s.total_cmp(&a.gain_potential_s));
    ranked
}

fn nearest_corner(corners: &[Corner], value: f64) -> usize {
    let mut nearest = 0;
    let mut nearest_dist = f64::INFINITY;
    for (i, corner) in corners.iter().enumerate() {
        let dist = (corner.midpoint() - value).abs();
        if dist < nearest_dist {
            nearest = i;
            nearest_dist = dist;
        }
    }
    nearest
}
