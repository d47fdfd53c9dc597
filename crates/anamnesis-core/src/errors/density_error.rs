//! Density estimation errors.

use crate::models::ClassId;

use super::error_code::{self, ErrorCode};

/// Errors raised while collecting per-class feature statistics.
#[derive(Debug, thiserror::Error)]
pub enum DensityError {
    #[error("class {class} has no examples")]
    EmptyClass { class: ClassId },

    #[error("no classes supplied for task {task}")]
    NoClasses { task: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("feature extraction failed for class {class}: {reason}")]
    ExtractionFailed { class: ClassId, reason: String },

    #[error("clustering failed for class {class}: {reason}")]
    ClusteringFailed { class: ClassId, reason: String },

    #[error("collective exchange failed on rank {rank}: {reason}")]
    CollectiveFailed { rank: usize, reason: String },
}

impl ErrorCode for DensityError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CollectiveFailed { .. } => error_code::COLLECTIVE_ERROR,
            Self::ExtractionFailed { .. } => error_code::EXTRACTOR_ERROR,
            _ => error_code::DENSITY_ERROR,
        }
    }
}
