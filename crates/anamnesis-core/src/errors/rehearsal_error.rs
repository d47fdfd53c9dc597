//! Pseudo-rehearsal sampling errors.

use super::error_code::{self, ErrorCode};

/// Errors raised while drawing synthetic features from stored distributions.
#[derive(Debug, thiserror::Error)]
pub enum RehearsalError {
    #[error("covariance is not positive definite (dim {dim})")]
    NotPositiveDefinite { dim: usize },

    #[error("distribution has no usable components (all centroids degenerate)")]
    NoUsableComponents,

    #[error("dimension mismatch: mean has {mean}, spread has {spread}")]
    DimensionMismatch { mean: usize, spread: usize },
}

impl ErrorCode for RehearsalError {
    fn error_code(&self) -> &'static str {
        error_code::REHEARSAL_ERROR
    }
}
