use serde::{Deserialize, Serialize};

use super::defaults;

/// Evaluation-time distance re-scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Added to the covariance diagonal before inversion.
    pub mahalanobis_jitter: f64,
    /// Logit scale η₀ in the group energy.
    pub eta0: f64,
    /// Distance scale η in the group energy.
    pub eta: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mahalanobis_jitter: defaults::DEFAULT_MAHALANOBIS_JITTER,
            eta0: defaults::DEFAULT_ETA0,
            eta: defaults::DEFAULT_ETA,
        }
    }
}
