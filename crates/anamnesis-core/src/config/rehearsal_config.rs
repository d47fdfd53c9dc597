use serde::{Deserialize, Serialize};

use super::defaults;

/// Synthetic sample generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RehearsalConfig {
    /// Training minibatch size of the outer loop.
    pub batch_size: usize,
    /// Per-class sample unit is `batch_size * sample_multiplier`.
    pub sample_multiplier: usize,
    /// Root seed. Every draw derives its RNG from this plus a stage key.
    pub seed: u64,
}

impl RehearsalConfig {
    pub fn samples_per_class(&self) -> usize {
        self.batch_size * self.sample_multiplier
    }
}

impl Default for RehearsalConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::DEFAULT_BATCH_SIZE,
            sample_multiplier: defaults::DEFAULT_SAMPLE_MULTIPLIER,
            seed: defaults::DEFAULT_SEED,
        }
    }
}
