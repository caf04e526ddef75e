//! Rayon-parallel overlap-matrix fill (feature-gated).

use rayon::prelude::*;

use crate::geometry::overlap::{fill_row, OverlapMatrix, QueryPlan};
use crate::geometry::BoundingBox;
use crate::trace::trace_span;
use crate::util::{DetBoxError, DetBoxResult};

/// Row-parallel overlap-matrix fill against a precompiled plan.
///
/// Every row is produced by the same scalar fill as
/// [`crate::geometry::overlap::overlap_matrix_with_plan`], one row per task,
/// so the output is bitwise identical to the sequential fill.
pub fn overlap_matrix_par(
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
        parallel = true
    )
    .entered();

    // Parallel fill over rows
    let rows: Vec<Vec<f32>> = boxes
        .par_iter()
        .map(|bbox| {
            let mut row = vec![0.0f32; plan.len()];
            fill_row(*bbox, plan, &mut row);
            row
        })
        .collect();

    // Merge results into the owned buffer
    let mut out = OverlapMatrix::zeroed(boxes.len(), plan.len());
    for (dst, src) in out.data.chunks_exact_mut(plan.len()).zip(rows) {
        dst.copy_from_slice(&src);
    }
    Ok(out)
}
