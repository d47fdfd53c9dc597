//! Distance-matrix / optimal-transport errors.

use crate::models::ClassId;

use super::error_code::{self, ErrorCode};

/// Errors raised while computing distributional distances.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("class {class} is outside the matrix (size {size})")]
    ClassOutOfRange { class: ClassId, size: usize },

    #[error("no distribution stored for class {class}")]
    MissingDistribution { class: ClassId },

    #[error("dimension mismatch between classes: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("transport problem has an empty side ({rows} x {cols})")]
    EmptyProblem { rows: usize, cols: usize },

    #[error("non-finite ground cost at ({row}, {col})")]
    NonFiniteCost { row: usize, col: usize },

    #[error("transport solver failed: {reason}")]
    SolverFailed { reason: String },

    #[error("sampling failed: {0}")]
    Sampling(#[from] super::RehearsalError),
}

impl ErrorCode for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sampling(e) => e.error_code(),
            _ => error_code::TRANSPORT_ERROR,
        }
    }
}
