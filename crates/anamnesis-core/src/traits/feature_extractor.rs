use nalgebra::DMatrix;

use crate::errors::AnamnesisResult;
use crate::models::TaskId;

/// Everything a backbone forward pass yields for one input batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorOutput {
    /// N×D projected features used by the contrastive objective.
    pub features: DMatrix<f64>,
    /// N×C class logits.
    pub logits: DMatrix<f64>,
    /// N×D features before the classifier, used for class statistics.
    pub pre_logits: DMatrix<f64>,
}

/// The backbone, consumed as an opaque function.
pub trait FeatureExtractor: Send + Sync {
    /// One batch of raw inputs.
    type Input;

    /// Run a batch through the backbone, optionally conditioned on a task.
    fn extract(&self, input: &Self::Input, task: Option<TaskId>) -> AnamnesisResult<ExtractorOutput>;

    /// Dimensionality of `pre_logits`.
    fn feature_dim(&self) -> usize;
}
