use serde::{Deserialize, Serialize};

use super::defaults;

/// Weighted contrastive objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastiveConfig {
    pub temperature: f64,
    /// Derive Γ from the original-space distance matrix. When off, Γ is all ones.
    pub ot_weighting: bool,
    /// Distance scale δ in `Γ = exp(-d / δ)`.
    pub delta: f64,
    /// Coefficient of the global (unweighted, unscoped) term.
    pub reg_glob: f64,
    /// Coefficient of the taxonomy-scoped term.
    pub reg_sub: f64,
    pub prototype_coefficient: f64,
    pub prototype_temperature: f64,
}

impl Default for ContrastiveConfig {
    fn default() -> Self {
        Self {
            temperature: defaults::DEFAULT_TEMPERATURE,
            ot_weighting: defaults::DEFAULT_OT_WEIGHTING,
            delta: defaults::DEFAULT_DELTA,
            reg_glob: defaults::DEFAULT_REG_GLOB,
            reg_sub: defaults::DEFAULT_REG_SUB,
            prototype_coefficient: defaults::DEFAULT_PROTOTYPE_COEFFICIENT,
            prototype_temperature: defaults::DEFAULT_PROTOTYPE_TEMPERATURE,
        }
    }
}
