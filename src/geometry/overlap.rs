//! Dense box-overlap matrices with a reusable query plan.
//!
//! `QueryPlan` splits a query set into per-coordinate arrays and precomputes
//! areas once, so repeated matrix fills against the same queries skip the
//! per-call setup. `overlap_matrix` compiles a plan internally;
//! `overlap_matrix_with_plan` reuses one across calls.

use crate::geometry::BoundingBox;
use crate::trace::{trace_debug, trace_span};
use crate::util::{DetBoxError, DetBoxResult};

/// Precomputed per-query state for overlap-matrix fills.
///
/// Coordinates are stored as parallel arrays; `area` holds the
/// inclusive-pixel area per query and is exactly 0.0 for degenerate queries,
/// which therefore contribute zero overlap in every fill.
pub struct QueryPlan {
    pub(crate) x1: Vec<f32>,
    pub(crate) y1: Vec<f32>,
    pub(crate) x2: Vec<f32>,
    pub(crate) y2: Vec<f32>,
    pub(crate) area: Vec<f32>,
}

impl QueryPlan {
    /// Builds a plan from a query box set.
    pub fn new(queries: &[BoundingBox]) -> DetBoxResult<Self> {
        if queries.is_empty() {
            return Err(DetBoxError::EmptyInput {
                context: "overlap queries",
            });
        }

        let mut plan = Self {
            x1: Vec::with_capacity(queries.len()),
            y1: Vec::with_capacity(queries.len()),
            x2: Vec::with_capacity(queries.len()),
            y2: Vec::with_capacity(queries.len()),
            area: Vec::with_capacity(queries.len()),
        };

        let mut degenerate = 0usize;
        for query in queries {
            if query.is_degenerate() {
                // Sentinel extents force a negative intersection against any
                // box, so branch-free fills produce exact zeros for these
                // lanes as well.
                degenerate += 1;
                plan.x1.push(f32::MAX);
                plan.y1.push(f32::MAX);
                plan.x2.push(f32::MIN);
                plan.y2.push(f32::MIN);
                plan.area.push(0.0);
            } else {
                plan.x1.push(query.x1);
                plan.y1.push(query.y1);
                plan.x2.push(query.x2);
                plan.y2.push(query.y2);
                plan.area.push(query.area());
            }
        }
        if degenerate > 0 {
            trace_debug!("degenerate_queries", count = degenerate);
        }

        Ok(plan)
    }

    /// Returns the number of query boxes in the plan.
    pub fn len(&self) -> usize {
        self.area.len()
    }

    /// Returns true when the plan holds no queries.
    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }
}

/// Row-major overlap matrix: one row per box, one column per query.
pub struct OverlapMatrix {
    pub(crate) data: Vec<f32>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl OverlapMatrix {
    pub(crate) fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Returns the number of rows (boxes).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns (queries).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns row `i` if it is within bounds.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.cols;
        self.data.get(start..start + self.cols)
    }

    /// Returns the cell `(i, j)` if it is within bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        self.data.get(i * self.cols + j).copied()
    }

    /// Returns the backing row-major slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Computes the dense overlap matrix of `boxes` against `queries`.
pub fn overlap_matrix(
    boxes: &[BoundingBox],
    queries: &[BoundingBox],
) -> DetBoxResult<OverlapMatrix> {
    let plan = QueryPlan::new(queries)?;
    overlap_matrix_with_plan(boxes, &plan)
}

/// Computes the dense overlap matrix of `boxes` against a precompiled plan.
pub fn overlap_matrix_with_plan(
    boxes: &[BoundingBox],
    plan: &QueryPlan,
) -> DetBoxResult<OverlapMatrix> {
    if boxes.is_empty() {
        return Err(DetBoxError::EmptyInput {
            context: "overlap boxes",
        });
    }

    let _span = trace_span!("overlap_matrix", boxes = boxes.len(), queries = plan.len()).entered();

    let mut out = OverlapMatrix::zeroed(boxes.len(), plan.len());
    for (bbox, row) in boxes.iter().zip(out.data.chunks_exact_mut(plan.len())) {
        fill_row(*bbox, plan, row);
    }
    Ok(out)
}

/// Fills one matrix row: overlaps of a single box against every query.
///
/// A degenerate box yields an all-zero row without touching the formula, so
/// no division by a zero union can occur.
pub(crate) fn fill_row(bbox: BoundingBox, plan: &QueryPlan, row: &mut [f32]) {
    if bbox.is_degenerate() {
        row.fill(0.0);
        return;
    }

    let barea = bbox.area();
    for (j, out) in row.iter_mut().enumerate() {
        if plan.area[j] == 0.0 {
            *out = 0.0;
            continue;
        }
        let iw = bbox.x2.min(plan.x2[j]) - bbox.x1.max(plan.x1[j]) + 1.0;
        if iw < 0.0 {
            *out = 0.0;
            continue;
        }
        let ih = bbox.y2.min(plan.y2[j]) - bbox.y1.max(plan.y1[j]) + 1.0;
        if ih < 0.0 {
            *out = 0.0;
            continue;
        }
        let inter = iw * ih;
        *out = inter / (barea + plan.area[j] - inter);
    }
}
