//! Error types for detbox.

use thiserror::Error;

/// Result alias for detbox operations.
pub type DetBoxResult<T> = std::result::Result<T, DetBoxError>;

/// Errors that can occur when running detbox algorithms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetBoxError {
    /// Input dimensions do not match what the operation requires.
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Element count the operation required.
        expected: usize,
        /// Element count actually supplied.
        got: usize,
        /// Operation or argument that rejected the shape.
        context: &'static str,
    },
    /// The operation received zero candidates where at least one is required.
    #[error("empty input in {context}")]
    EmptyInput {
        /// Operation or argument that rejected the input.
        context: &'static str,
    },
}
