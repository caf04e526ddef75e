//! Score ordering and the greedy suppression sweep.

use crate::geometry::Detection;

/// Fills `area` with inclusive-pixel areas and returns how many boxes were
/// degenerate.
pub(crate) fn fill_areas(detections: &[Detection], area: &mut [f32]) -> usize {
    let mut degenerate = 0usize;
    for (slot, det) in area.iter_mut().zip(detections.iter()) {
        if det.bbox.is_degenerate() {
            degenerate += 1;
        }
        *slot = det.bbox.area();
    }
    degenerate
}

/// Sorts `order` by descending score with ascending-index tie-break.
///
/// `total_cmp` gives NaN scores a defined position (a positive NaN sorts
/// above +inf), so the permutation is deterministic for any input.
pub(crate) fn sort_order_desc(detections: &[Detection], order: &mut [usize]) {
    order.sort_by(|&a, &b| {
        detections[b]
            .score
            .total_cmp(&detections[a].score)
            .then_with(|| a.cmp(&b))
    });
}

/// Pairwise overlap through precomputed areas.
///
/// A zero precomputed area marks a degenerate box, which contributes zero
/// overlap; for non-degenerate boxes the union is at least one pixel.
pub(crate) fn overlap_from_areas(
    detections: &[Detection],
    area: &[f32],
    i: usize,
    j: usize,
) -> f32 {
    if area[i] == 0.0 || area[j] == 0.0 {
        return 0.0;
    }

    let a = detections[i].bbox;
    let b = detections[j].bbox;
    let iw = a.x2.min(b.x2) - a.x1.max(b.x1) + 1.0;
    if iw < 0.0 {
        return 0.0;
    }
    let ih = a.y2.min(b.y2) - a.y1.max(b.y1) + 1.0;
    if ih < 0.0 {
        return 0.0;
    }

    let inter = iw * ih;
    inter / (area[i] + area[j] - inter)
}

/// Walks `order` from the highest score down, collecting survivors into
/// `keep` and marking every later candidate whose overlap with the current
/// survivor strictly exceeds `threshold`.
///
/// The sweep position and the original index are kept in separate variables;
/// `suppressed` and `keep` are indexed by original index throughout, and
/// `keep` comes out in descending-score order.
pub(crate) fn sweep<F>(
    order: &[usize],
    threshold: f32,
    suppressed: &mut [bool],
    keep: &mut Vec<usize>,
    overlap: F,
) where
    F: Fn(usize, usize) -> f32,
{
    for pos in 0..order.len() {
        let current = order[pos];
        if suppressed[current] {
            continue;
        }
        keep.push(current);

        for &later in &order[pos + 1..] {
            if !suppressed[later] && overlap(current, later) > threshold {
                suppressed[later] = true;
            }
        }
    }
}
