//! Python bindings for the detbox detection post-processing library.
//!
//! This module exposes the high-level detbox API to Python via PyO3.

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use detbox::{BoundingBox, DetBoxError, Detection, OverlapMatrix, QueryPlan as RustQueryPlan};

/// Convert a DetBoxError to a Python exception.
fn to_py_err(err: DetBoxError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

/// Parse a (n, 5) float32 array into detections.
fn detections_from_array(array: &PyReadonlyArray2<'_, f32>) -> PyResult<Vec<Detection>> {
    let shape = array.shape();
    if shape[1] != 5 {
        return Err(PyValueError::new_err(
            "detections must have shape (n, 5): x1, y1, x2, y2, score",
        ));
    }
    let rows = array.as_slice()?;
    Detection::parse_rows(rows).map_err(to_py_err)
}

/// Parse a (n, 4) float32 array into boxes.
fn boxes_from_array(array: &PyReadonlyArray2<'_, f32>, what: &str) -> PyResult<Vec<BoundingBox>> {
    let shape = array.shape();
    if shape[1] != 4 {
        return Err(PyValueError::new_err(format!(
            "{what} must have shape (n, 4): x1, y1, x2, y2"
        )));
    }
    let data = array.as_slice()?;
    Ok(data
        .chunks_exact(4)
        .map(|row| BoundingBox::new(row[0], row[1], row[2], row[3]))
        .collect())
}

/// Copy an overlap matrix into a 2D numpy array.
fn matrix_to_array<'py>(
    py: Python<'py>,
    matrix: &OverlapMatrix,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let array = Array2::from_shape_vec((matrix.rows(), matrix.cols()), matrix.as_slice().to_vec())
        .map_err(|err| PyValueError::new_err(err.to_string()))?;
    Ok(array.into_pyarray(py))
}

/// A compiled query-box set for repeated overlap-matrix computations.
///
/// Compiling splits the queries into coordinate arrays and precomputes their
/// areas once, so repeated matrix fills against the same queries skip the
/// per-call setup.
#[pyclass]
pub struct QueryPlan {
    inner: RustQueryPlan,
}

#[pymethods]
impl QueryPlan {
    /// Compile a query-box set.
    ///
    /// Args:
    ///     queries: 2D float32 numpy array of (x1, y1, x2, y2) rows
    #[new]
    fn new(queries: PyReadonlyArray2<'_, f32>) -> PyResult<Self> {
        let queries = boxes_from_array(&queries, "queries")?;
        let inner = RustQueryPlan::new(&queries).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Compute the IoU matrix of boxes against the compiled queries.
    ///
    /// Args:
    ///     boxes: 2D float32 numpy array of (x1, y1, x2, y2) rows
    ///     parallel: Fill matrix rows in parallel (default: False)
    ///
    /// Returns:
    ///     2D float32 numpy array of shape (len(boxes), len(self))
    #[pyo3(signature = (boxes, parallel = false))]
    fn overlap<'py>(
        &self,
        py: Python<'py>,
        boxes: PyReadonlyArray2<'py, f32>,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray2<f32>>> {
        let boxes = boxes_from_array(&boxes, "boxes")?;
        let matrix = if parallel {
            detbox::overlap_matrix_par(&boxes, &self.inner)
        } else {
            detbox::overlap_matrix_with_plan(&boxes, &self.inner)
        }
        .map_err(to_py_err)?;
        matrix_to_array(py, &matrix)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("QueryPlan(queries={})", self.inner.len())
    }
}

/// Run greedy non-maximum suppression over scored detection rows.
///
/// Candidates are visited in descending score order; a candidate is dropped
/// when its IoU with an already kept box exceeds iou_threshold.
///
/// Args:
///     detections: 2D float32 numpy array of (x1, y1, x2, y2, score) rows
///     iou_threshold: Overlap above which a candidate is suppressed
///     parallel: Mark suppressed candidates in parallel (default: False)
///
/// Returns:
///     List of kept row indices, best score first
#[pyfunction]
#[pyo3(signature = (detections, iou_threshold, parallel = false))]
fn nms(
    detections: PyReadonlyArray2<'_, f32>,
    iou_threshold: f32,
    parallel: bool,
) -> PyResult<Vec<usize>> {
    let dets = detections_from_array(&detections)?;
    let kept = if parallel {
        detbox::nms_par(&dets, iou_threshold)
    } else {
        detbox::nms(&dets, iou_threshold)
    };
    kept.map_err(to_py_err)
}

/// Compute the dense IoU matrix between two box sets.
///
/// For repeated calls against the same queries, compile a QueryPlan once and
/// use QueryPlan.overlap instead.
///
/// Args:
///     boxes: 2D float32 numpy array of (x1, y1, x2, y2) rows
///     queries: 2D float32 numpy array of (x1, y1, x2, y2) rows
///     parallel: Fill matrix rows in parallel (default: False)
///
/// Returns:
///     2D float32 numpy array of shape (len(boxes), len(queries))
#[pyfunction]
#[pyo3(signature = (boxes, queries, parallel = false))]
fn overlap_matrix<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, f32>,
    queries: PyReadonlyArray2<'py, f32>,
    parallel: bool,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let boxes = boxes_from_array(&boxes, "boxes")?;
    let queries = boxes_from_array(&queries, "queries")?;
    let plan = RustQueryPlan::new(&queries).map_err(to_py_err)?;
    let matrix = if parallel {
        detbox::overlap_matrix_par(&boxes, &plan)
    } else {
        detbox::overlap_matrix_with_plan(&boxes, &plan)
    }
    .map_err(to_py_err)?;
    matrix_to_array(py, &matrix)
}

/// IoU of two boxes under the inclusive-pixel convention.
///
/// Args:
///     a: (x1, y1, x2, y2) of the first box
///     b: (x1, y1, x2, y2) of the second box
///
/// Returns:
///     Intersection-over-union in [0, 1]; 0.0 when either box is degenerate
#[pyfunction]
fn iou(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> f32 {
    detbox::iou(
        BoundingBox::new(a.0, a.1, a.2, a.3),
        BoundingBox::new(b.0, b.1, b.2, b.3),
    )
}

/// Clamp boxes to an image frame.
///
/// Args:
///     boxes: 2D float32 numpy array of (x1, y1, x2, y2) rows
///     width: Image width in pixels
///     height: Image height in pixels
///
/// Returns:
///     2D float32 numpy array of the clamped rows, same shape
#[pyfunction]
fn clip_boxes<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, f32>,
    width: usize,
    height: usize,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let mut parsed = boxes_from_array(&boxes, "boxes")?;
    detbox::clip_boxes(&mut parsed, width, height);
    let mut data = Vec::with_capacity(parsed.len() * 4);
    for bbox in &parsed {
        data.extend_from_slice(&[bbox.x1, bbox.y1, bbox.x2, bbox.y2]);
    }
    let array = Array2::from_shape_vec((parsed.len(), 4), data)
        .map_err(|err| PyValueError::new_err(err.to_string()))?;
    Ok(array.into_pyarray(py))
}

/// Python module for detbox detection post-processing.
#[pymodule]
#[pyo3(name = "detbox")]
fn _detbox(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<QueryPlan>()?;
    m.add_function(wrap_pyfunction!(nms, m)?)?;
    m.add_function(wrap_pyfunction!(overlap_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(iou, m)?)?;
    m.add_function(wrap_pyfunction!(clip_boxes, m)?)?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
