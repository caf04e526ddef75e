//! SIMD-accelerated overlap-matrix fill using the `wide` crate.
//!
//! The inner query loop is vectorized to process 8 queries at a time with
//! `f32x8`. Intersection extents are clamped to zero per lane, so disjoint
//! and degenerate lanes fall out of the same arithmetic as overlapping ones
//! and the result matches the scalar fill exactly.

use crate::geometry::overlap::{OverlapMatrix, QueryPlan};
use crate::geometry::BoundingBox;
use crate::trace::trace_span;
use crate::util::{DetBoxError, DetBoxResult};
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

/// SIMD overlap-matrix fill against a precompiled plan.
pub fn overlap_matrix_simd(
    boxes: &[BoundingBox],
    plan: &QueryPlan,
) -> DetBoxResult<OverlapMatrix> {
    if boxes.is_empty() {
        return Err(DetBoxError::EmptyInput {
            context: "overlap boxes",
        });
    }

    let _span = trace_span!(
        "overlap_matrix",
        boxes = boxes.len(),
        queries = plan.len(),
        simd = true
    )
    .entered();

    let mut out = OverlapMatrix::zeroed(boxes.len(), plan.len());
    for (bbox, row) in boxes.iter().zip(out.data.chunks_exact_mut(plan.len())) {
        fill_row_simd(*bbox, plan, row);
    }
    Ok(out)
}

fn fill_row_simd(bbox: BoundingBox, plan: &QueryPlan, row: &mut [f32]) {
    if bbox.is_degenerate() {
        row.fill(0.0);
        return;
    }

    let barea = bbox.area();
    let bx1 = f32x8::splat(bbox.x1);
    let by1 = f32x8::splat(bbox.y1);
    let bx2 = f32x8::splat(bbox.x2);
    let by2 = f32x8::splat(bbox.y2);
    let barea_vec = f32x8::splat(barea);

    let count = plan.len();
    let simd_end = count / LANES * LANES;

    // SIMD portion: process 8 queries at a time
    let mut j = 0;
    while j < simd_end {
        let qx1 = load_f32x8(&plan.x1[j..]);
        let qy1 = load_f32x8(&plan.y1[j..]);
        let qx2 = load_f32x8(&plan.x2[j..]);
        let qy2 = load_f32x8(&plan.y2[j..]);
        let qarea = load_f32x8(&plan.area[j..]);

        let iw = (bx2.min(qx2) - bx1.max(qx1) + f32x8::ONE).max(f32x8::ZERO);
        let ih = (by2.min(qy2) - by1.max(qy1) + f32x8::ONE).max(f32x8::ZERO);
        let inter = iw * ih;
        let denom = barea_vec + qarea - inter;

        row[j..j + LANES].copy_from_slice(&(inter / denom).to_array());
        j += LANES;
    }

    // Scalar remainder
    while j < count {
        let iw = (bbox.x2.min(plan.x2[j]) - bbox.x1.max(plan.x1[j]) + 1.0).max(0.0);
        let ih = (bbox.y2.min(plan.y2[j]) - bbox.y1.max(plan.y1[j]) + 1.0).max(0.0);
        let inter = iw * ih;
        row[j] = inter / (barea + plan.area[j] - inter);
        j += 1;
    }
}
