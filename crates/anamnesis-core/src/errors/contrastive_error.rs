//! Weighted contrastive loss errors.

use crate::models::TaskId;

use super::error_code::{self, ErrorCode};

/// Errors raised by the contrastive objectives.
#[derive(Debug, thiserror::Error)]
pub enum ContrastiveError {
    #[error("batch mismatch: {features} feature rows, {labels} labels")]
    BatchMismatch { features: usize, labels: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("temperature must be finite and > 0, got {0}")]
    InvalidTemperature(f64),

    #[error("no taxonomy grouping available for task {task}")]
    MissingTaxonomy { task: TaskId },

    #[error("label {label} outside weight matrix of size {size}")]
    LabelOutOfRange { label: usize, size: usize },
}

impl ErrorCode for ContrastiveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTaxonomy { .. } => error_code::MISSING_TAXONOMY,
            _ => error_code::CONTRASTIVE_ERROR,
        }
    }
}
