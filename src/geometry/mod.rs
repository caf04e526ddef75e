//! Box geometry primitives and pairwise overlap.
//!
//! Coordinates follow the inclusive-pixel convention: a box covers every pixel
//! from `(x1, y1)` to `(x2, y2)` inclusive, so its area is
//! `(x2 - x1 + 1) * (y2 - y1 + 1)` and the box `(0, 0, 9, 9)` has area 100.
//! A box with `x2 < x1` or `y2 < y1` is degenerate: it has area zero and
//! contributes zero overlap, but is never an error.

use crate::util::{DetBoxError, DetBoxResult};

pub mod overlap;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Axis-aligned box in image pixel space, corners inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Left edge (column of the first covered pixel).
    pub x1: f32,
    /// Top edge (row of the first covered pixel).
    pub y1: f32,
    /// Right edge (column of the last covered pixel).
    pub x2: f32,
    /// Bottom edge (row of the last covered pixel).
    pub y2: f32,
}

impl BoundingBox {
    /// Creates a box from its corner coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns true when the box has no extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    /// Returns the inclusive-pixel area, or exactly 0.0 for a degenerate box.
    pub fn area(&self) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        (self.x2 - self.x1 + 1.0) * (self.y2 - self.y1 + 1.0)
    }
}

/// Scored candidate box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Candidate box.
    pub bbox: BoundingBox,
    /// Confidence score; higher wins during suppression.
    pub score: f32,
}

impl Detection {
    /// Creates a detection from corner coordinates and a score, mirroring the
    /// packed `(x1, y1, x2, y2, score)` row layout.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: BoundingBox::new(x1, y1, x2, y2),
            score,
        }
    }

    /// Parses a packed slice of `(x1, y1, x2, y2, score)` rows.
    ///
    /// Rejects an empty slice and any slice whose length is not a multiple of
    /// five; the trailing partial row is reported, never truncated.
    pub fn parse_rows(rows: &[f32]) -> DetBoxResult<Vec<Detection>> {
        if rows.is_empty() {
            return Err(DetBoxError::EmptyInput {
                context: "detection rows",
            });
        }
        if rows.len() % 5 != 0 {
            return Err(DetBoxError::ShapeMismatch {
                expected: 5,
                got: rows.len() % 5,
                context: "detection row width",
            });
        }

        Ok(rows
            .chunks_exact(5)
            .map(|row| Detection::new(row[0], row[1], row[2], row[3], row[4]))
            .collect())
    }
}

/// Computes intersection-over-union for two boxes under the inclusive-pixel
/// convention.
///
/// Returns exactly 0.0 for disjoint pairs and whenever either box is
/// degenerate. For valid boxes the union is at least one pixel, so the result
/// is always finite and in `[0, 1]`.
pub fn iou(a: BoundingBox, b: BoundingBox) -> f32 {
    if a.is_degenerate() || b.is_degenerate() {
        return 0.0;
    }

    let iw = a.x2.min(b.x2) - a.x1.max(b.x1) + 1.0;
    if iw < 0.0 {
        return 0.0;
    }
    let ih = a.y2.min(b.y2) - a.y1.max(b.y1) + 1.0;
    if ih < 0.0 {
        return 0.0;
    }

    let inter = iw * ih;
    inter / (a.area() + b.area() - inter)
}

/// Clamps every box in place to the image bounds `[0, width - 1]` by
/// `[0, height - 1]`.
pub fn clip_boxes(boxes: &mut [BoundingBox], image_width: usize, image_height: usize) {
    let max_x = image_width.saturating_sub(1) as f32;
    let max_y = image_height.saturating_sub(1) as f32;
    for bbox in boxes.iter_mut() {
        bbox.x1 = bbox.x1.clamp(0.0, max_x);
        bbox.y1 = bbox.y1.clamp(0.0, max_y);
        bbox.x2 = bbox.x2.clamp(0.0, max_x);
        bbox.y2 = bbox.y2.clamp(0.0, max_y);
    }
}
