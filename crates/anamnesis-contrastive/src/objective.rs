//! ContrastiveObjective: the combined per-step term used during ordinary
//! training of tasks after the first.

use anamnesis_core::config::ContrastiveConfig;
use anamnesis_core::errors::ContrastiveError;
use anamnesis_core::models::{ClassId, SyntheticBatch, TaskId, TaxonomyGroups};
use anamnesis_core::traits::TaxonomySource;
use anamnesis_rehearsal::RehearsalBuffer;
use nalgebra::DMatrix;
use rand::Rng;
use tracing::debug;

use crate::supcon::{global_loss, ContrastiveOutput};
use crate::taxonomy_scoped::taxonomy_scoped_loss;
use crate::weights::ClassWeights;

/// `reg_glob · global + reg_sub · scoped` over the minibatch joined with a
/// replay slice.
#[derive(Debug, Clone)]
pub struct ContrastiveObjective {
    config: ContrastiveConfig,
    weights: Option<ClassWeights>,
    groups: TaxonomyGroups,
}

impl ContrastiveObjective {
    /// `weights` is ignored when OT weighting is off.
    pub fn new(config: ContrastiveConfig, weights: Option<ClassWeights>, groups: TaxonomyGroups) -> Self {
        let weights = if config.ot_weighting { weights } else { None };
        Self {
            config,
            weights,
            groups,
        }
    }

    /// Objective for `task`, looking its taxonomy level up in `taxonomy`.
    pub fn for_task(
        config: ContrastiveConfig,
        weights: Option<ClassWeights>,
        taxonomy: &dyn TaxonomySource,
        task: TaskId,
    ) -> Result<Self, ContrastiveError> {
        let groups = taxonomy
            .groups_for_task(task)
            .ok_or(ContrastiveError::MissingTaxonomy { task })?;
        Ok(Self::new(config, weights, groups))
    }

    pub fn groups(&self) -> &TaxonomyGroups {
        &self.groups
    }

    pub fn weights(&self) -> Option<&ClassWeights> {
        self.weights.as_ref()
    }

    /// Loss over `features ⊕ replay`. The gradient covers the minibatch
    /// rows only; replay rows are constants.
    pub fn loss(
        &self,
        features: &DMatrix<f64>,
        labels: &[ClassId],
        replay: Option<&SyntheticBatch>,
    ) -> Result<ContrastiveOutput, ContrastiveError> {
        let (n, d) = features.shape();
        if labels.len() != n {
            return Err(ContrastiveError::BatchMismatch {
                features: n,
                labels: labels.len(),
            });
        }
        let joined = match replay.filter(|r| !r.is_empty()) {
            Some(r) if r.dim() != d => {
                return Err(ContrastiveError::DimensionMismatch {
                    expected: d,
                    actual: r.dim(),
                })
            }
            Some(r) => SyntheticBatch::concat(&[SyntheticBatch::new(features.clone(), labels.to_vec()), r.clone()]),
            None => SyntheticBatch::new(features.clone(), labels.to_vec()),
        };

        let global = global_loss(&joined.features, &joined.labels, self.config.temperature)?;
        let scoped = taxonomy_scoped_loss(
            &joined.features,
            &joined.labels,
            &self.groups,
            self.config.temperature,
            self.weights.as_ref(),
        )?;

        let loss = self.config.reg_glob * global.loss + self.config.reg_sub * scoped.loss;
        debug!(
            rows = n,
            replay = joined.len() - n,
            global = global.loss,
            scoped = scoped.loss,
            "contrastive objective"
        );
        let grad = (global.grad.rows(0, n) * self.config.reg_glob)
            + (scoped.grad.rows(0, n) * self.config.reg_sub);
        Ok(ContrastiveOutput { loss, grad })
    }

    /// [`loss`](Self::loss) with a fresh slice of `replay_size` rows drawn
    /// from `buffer`.
    pub fn loss_with_replay<R: Rng + ?Sized>(
        &self,
        features: &DMatrix<f64>,
        labels: &[ClassId],
        buffer: &RehearsalBuffer,
        replay_size: usize,
        rng: &mut R,
    ) -> Result<ContrastiveOutput, ContrastiveError> {
        let slice = buffer.replay_slice(replay_size, rng);
        self.loss(features, labels, slice.as_ref())
    }
}
