//! Greedy non-maximum suppression over scored boxes.
//!
//! Candidates are visited in descending-score order (ties broken by
//! ascending original index); each survivor suppresses every later candidate
//! whose overlap strictly exceeds the threshold. The result is the list of
//! kept original indices, highest score first. An empty candidate set is an
//! error, never a silent empty result.

use crate::geometry::{BoundingBox, Detection};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{DetBoxError, DetBoxResult};

mod greedy;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Reusable buffers for repeated suppression runs over same-sized inputs.
///
/// Every run fully reinitializes the buffers, so a scratch carries no state
/// between calls beyond its capacity.
pub struct NmsScratch {
    area: Vec<f32>,
    order: Vec<usize>,
    suppressed: Vec<bool>,
    keep: Vec<usize>,
}

impl NmsScratch {
    /// Allocates scratch sized for `len` candidates.
    pub fn for_len(len: usize) -> DetBoxResult<Self> {
        if len == 0 {
            return Err(DetBoxError::EmptyInput {
                context: "nms scratch",
            });
        }
        Ok(Self {
            area: vec![0.0; len],
            order: (0..len).collect(),
            suppressed: vec![false; len],
            keep: Vec::with_capacity(len),
        })
    }

    /// Returns the candidate count this scratch is sized for.
    pub fn len(&self) -> usize {
        self.area.len()
    }

    /// Returns true when the scratch holds no candidate slots.
    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }
}

/// Runs greedy NMS with the inclusive-pixel IoU metric, allocating fresh
/// scratch for the call.
pub fn nms(detections: &[Detection], threshold: f32) -> DetBoxResult<Vec<usize>> {
    if detections.is_empty() {
        return Err(DetBoxError::EmptyInput {
            context: "nms detections",
        });
    }
    let mut scratch = NmsScratch::for_len(detections.len())?;
    nms_with_scratch(detections, threshold, &mut scratch).map(|kept| kept.to_vec())
}

/// Runs greedy NMS reusing caller-provided scratch; no per-call allocation.
///
/// The scratch must be sized for exactly `detections.len()` candidates. The
/// returned slice borrows the scratch keep buffer and stays valid until the
/// next run.
pub fn nms_with_scratch<'s>(
    detections: &[Detection],
    threshold: f32,
    scratch: &'s mut NmsScratch,
) -> DetBoxResult<&'s [usize]> {
    if detections.is_empty() {
        return Err(DetBoxError::EmptyInput {
            context: "nms detections",
        });
    }
    if scratch.len() != detections.len() {
        return Err(DetBoxError::ShapeMismatch {
            expected: detections.len(),
            got: scratch.len(),
            context: "nms scratch",
        });
    }

    let _span = trace_span!("nms", candidates = detections.len()).entered();

    let NmsScratch {
        area,
        order,
        suppressed,
        keep,
    } = scratch;

    let degenerate = greedy::fill_areas(detections, area);
    if degenerate > 0 {
        trace_debug!("degenerate_boxes", count = degenerate);
    }

    for (i, slot) in order.iter_mut().enumerate() {
        *slot = i;
    }
    greedy::sort_order_desc(detections, order);

    suppressed.fill(false);
    keep.clear();

    greedy::sweep(order, threshold, suppressed, keep, |i, j| {
        greedy::overlap_from_areas(detections, area, i, j)
    });

    trace_event!("nms_kept", kept = keep.len());
    Ok(keep)
}

/// Runs greedy NMS with a caller-supplied overlap metric.
///
/// The metric receives the kept box first and the later candidate second;
/// suppression still compares strictly against `threshold`. Passing
/// [`crate::geometry::iou`] reproduces [`nms`] exactly.
pub fn nms_by<F>(detections: &[Detection], threshold: f32, overlap: F) -> DetBoxResult<Vec<usize>>
where
    F: Fn(BoundingBox, BoundingBox) -> f32,
{
    if detections.is_empty() {
        return Err(DetBoxError::EmptyInput {
            context: "nms detections",
        });
    }

    let _span = trace_span!("nms", candidates = detections.len()).entered();

    let mut order: Vec<usize> = (0..detections.len()).collect();
    greedy::sort_order_desc(detections, &mut order);

    let mut suppressed = vec![false; detections.len()];
    let mut keep = Vec::new();
    greedy::sweep(&order, threshold, &mut suppressed, &mut keep, |i, j| {
        overlap(detections[i].bbox, detections[j].bbox)
    });

    trace_event!("nms_kept", kept = keep.len());
    Ok(keep)
}
