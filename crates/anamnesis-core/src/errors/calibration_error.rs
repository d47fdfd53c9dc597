//! Classifier calibration errors.

use crate::models::{ClassId, TaskId};

use super::error_code::{self, ErrorCode};

/// Errors raised by the classifier calibration phase and its persisted state.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// Loss became NaN or infinite. Fatal: the run must stop, nothing is retried.
    #[error("loss is {loss} at epoch {epoch} step {step}, stopping training")]
    Diverged { epoch: usize, step: usize, loss: f64 },

    #[error("no distribution stored for class {class} (task {task})")]
    MissingDistribution { class: ClassId, task: TaskId },

    #[error("task {task} is outside the class schedule ({num_tasks} tasks)")]
    UnknownTask { task: TaskId, num_tasks: usize },

    #[error("head shape mismatch: expected {expected}, got {actual}")]
    HeadShapeMismatch { expected: String, actual: String },

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("checkpoint error: {reason}")]
    Checkpoint { reason: String },
}

impl CalibrationError {
    /// Whether the error must terminate the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }
}

impl ErrorCode for CalibrationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Diverged { .. } => error_code::DIVERGED,
            Self::Checkpoint { .. } => error_code::CHECKPOINT_ERROR,
            _ => error_code::CALIBRATION_ERROR,
        }
    }
}
