use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::DistributionMode;

/// Per-class statistics collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Storage mode for every class distribution in the run.
    pub mode: DistributionMode,
    /// K for multi-centroid mode.
    pub n_centroids: usize,
    pub kmeans_max_iterations: usize,
    /// Stop Lloyd iterations once no centroid moves further than this.
    pub kmeans_tolerance: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            mode: DistributionMode::default(),
            n_centroids: defaults::DEFAULT_N_CENTROIDS,
            kmeans_max_iterations: defaults::DEFAULT_KMEANS_MAX_ITERATIONS,
            kmeans_tolerance: defaults::DEFAULT_KMEANS_TOLERANCE,
        }
    }
}
