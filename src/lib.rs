//! DetBox is a CPU-first library for detection-box post-processing.
//!
//! It provides inclusive-pixel IoU, dense box-overlap matrices with a
//! reusable query plan, box clipping, and greedy non-maximum suppression,
//! with optional parallel fills via the `rayon` feature and SIMD fills via
//! the `simd` feature.

pub mod geometry;
pub mod suppress;
pub(crate) mod trace;
pub mod util;

pub use geometry::overlap::{overlap_matrix, overlap_matrix_with_plan, OverlapMatrix, QueryPlan};
pub use geometry::{clip_boxes, iou, BoundingBox, Detection};
pub use suppress::{nms, nms_by, nms_with_scratch, NmsScratch};
pub use util::{DetBoxError, DetBoxResult};

#[cfg(feature = "rayon")]
pub use geometry::rayon::overlap_matrix_par;
#[cfg(feature = "simd")]
pub use geometry::simd::overlap_matrix_simd;
#[cfg(feature = "rayon")]
pub use suppress::rayon::nms_par;
