//! Rayon-parallel suppression (feature-gated).
//!
//! Each suppression round parallelizes the overlap pass over the remaining
//! candidates: workers read a snapshot of the suppressed flags, collect the
//! indices to mark, and the marks are applied after the round. Within one
//! round the flags only tell workers which overlaps to skip computing, and
//! marking is idempotent, so the kept set is identical to the sequential
//! engine's.

use rayon::prelude::*;

use crate::geometry::Detection;
use crate::suppress::greedy;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{DetBoxError, DetBoxResult};

/// Runs greedy NMS with the overlap pass of each round parallelized.
pub fn nms_par(detections: &[Detection], threshold: f32) -> DetBoxResult<Vec<usize>> {
    if detections.is_empty() {
        return Err(DetBoxError::EmptyInput {
            context: "nms detections",
        });
    }

    let _span = trace_span!("nms", candidates = detections.len(), parallel = true).entered();

    let mut area = vec![0.0f32; detections.len()];
    let degenerate = greedy::fill_areas(detections, &mut area);
    if degenerate > 0 {
        trace_debug!("degenerate_boxes", count = degenerate);
    }

    let mut order: Vec<usize> = (0..detections.len()).collect();
    greedy::sort_order_desc(detections, &mut order);

    let mut suppressed = vec![false; detections.len()];
    let mut keep: Vec<usize> = Vec::new();

    for pos in 0..order.len() {
        let current = order[pos];
        if suppressed[current] {
            continue;
        }
        keep.push(current);

        let marks: Vec<usize> = order[pos + 1..]
            .par_iter()
            .copied()
            .filter(|&later| {
                !suppressed[later]
                    && greedy::overlap_from_areas(detections, &area, current, later) > threshold
            })
            .collect();
        for later in marks {
            suppressed[later] = true;
        }
    }

    trace_event!("nms_kept", kept = keep.len());
    Ok(keep)
}
