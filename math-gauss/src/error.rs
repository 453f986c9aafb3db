//! Error types for the Gaussian elimination engine.
//!
//! Pre-flight validation errors (dimension, worker count, chunk size) are
//! reported before any array is touched. Numerical failures are reported
//! only when the fail-fast pivot policy is active.

use thiserror::Error;

/// Errors that can occur while building or solving a linear system.
#[derive(Debug, Error)]
pub enum GaussError {
    /// Matrix dimension is outside `[1, capacity]`.
    #[error("invalid dimension: N = {dim} is out of range (must be in [1, {capacity}])")]
    InvalidDimension { dim: i64, capacity: usize },

    /// Worker count is below one.
    #[error("invalid worker count: {workers} (must be >= 1)")]
    InvalidWorkerCount { workers: i64 },

    /// Chunk size is below one.
    #[error("invalid chunk size: {chunk_size} (must be >= 1)")]
    InvalidChunkSize { chunk_size: usize },

    /// Element access outside `[0, N)`.
    #[error("{target} index {index} out of range for dimension {dim}")]
    OutOfRange {
        target: &'static str,
        index: usize,
        dim: usize,
    },

    /// Array shapes do not describe an N×N system.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A pivot is zero, NaN, or below the configured tolerance.
    #[error("singular pivot at row {row}: |{value:e}| <= tolerance {tolerance:e}")]
    SingularPivot { row: usize, value: f64, tolerance: f64 },

    /// The cancellation token fired between elimination steps.
    #[error("solve cancelled before elimination step {step}")]
    Cancelled { step: usize },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A configuration file could not be read, written, or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for elimination operations.
pub type Result<T> = std::result::Result<T, GaussError>;

impl GaussError {
    /// Returns `true` for errors detected before any work begins.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            GaussError::InvalidDimension { .. }
                | GaussError::InvalidWorkerCount { .. }
                | GaussError::InvalidChunkSize { .. }
                | GaussError::DimensionMismatch { .. }
        )
    }

    /// Returns `true` if the system turned out to be numerically degenerate.
    pub fn is_numerical_error(&self) -> bool {
        matches!(self, GaussError::SingularPivot { .. })
    }

    /// Returns `true` for indexing contract violations.
    pub fn is_range_error(&self) -> bool {
        matches!(self, GaussError::OutOfRange { .. })
    }
}
