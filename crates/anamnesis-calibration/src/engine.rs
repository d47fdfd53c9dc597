//! CalibrationEngine: the calls the outer task loop makes at each boundary.
//!
//! Per task `t`:
//! 1. `collect_original_statistics(t)` summarises the new classes under the
//!    frozen backbone and fills the original-space distances.
//! 2. `begin_task(t)` picks up the taxonomy level and builds the
//!    contrastive objective (Γ from those distances).
//! 3. Ordinary training calls `contrastive_loss` / `prototype_loss` per step.
//! 4. `collect_adapted_statistics(t)` summarises the classes under the
//!    trained model.
//! 5. `calibrate` retrains the head and refreshes the rehearsal buffer.
//! 6. `checkpoint(t)` persists the state.

use std::collections::BTreeMap;

use anamnesis_contrastive::{
    prototype_separation_loss, ClassWeights, ContrastiveObjective, ContrastiveOutput,
};
use anamnesis_core::config::AnamnesisConfig;
use anamnesis_core::errors::{AnamnesisResult, CalibrationError, ContrastiveError};
use anamnesis_core::models::{ClassId, ClassSchedule, FeatureSpace, TaskId, TaxonomyGroups};
use anamnesis_core::traits::{ClassifierHead, Collective, FeatureExtractor, TaxonomySource};
use anamnesis_density::DensityEstimator;
use anamnesis_observability::{
    calibration_span, contrastive_span, density_span, scoring_span, transport_span,
};
use anamnesis_rehearsal::{derive_seed, stage_rng, RehearsalSampler};
use anamnesis_transport::{DistanceComputer, FillReport};
use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::calibrator::{CalibrationReport, ClassifierCalibrator};
use crate::checkpoint::Checkpoint;
use crate::scoring::{mahalanobis_scores, taxonomy_energy_rescore};
use crate::state::CalibrationState;

const REPLAY_STREAM: u64 = 0x7265706c;

pub struct CalibrationEngine {
    config: AnamnesisConfig,
    schedule: ClassSchedule,
    taxonomy: Box<dyn TaxonomySource>,
    state: CalibrationState,
    objective: Option<(TaskId, ContrastiveObjective)>,
}

impl CalibrationEngine {
    pub fn new(
        config: AnamnesisConfig,
        schedule: ClassSchedule,
        taxonomy: Box<dyn TaxonomySource>,
    ) -> Self {
        let state = CalibrationState::new(schedule.num_classes());
        Self {
            config,
            schedule,
            taxonomy,
            state,
            objective: None,
        }
    }

    /// Resume from a checkpoint written by a run with the same class schedule.
    pub fn from_checkpoint(
        config: AnamnesisConfig,
        schedule: ClassSchedule,
        taxonomy: Box<dyn TaxonomySource>,
        checkpoint: Checkpoint,
    ) -> AnamnesisResult<Self> {
        if checkpoint.state.num_classes() != schedule.num_classes() {
            return Err(CalibrationError::Checkpoint {
                reason: format!(
                    "checkpoint covers {} classes, schedule has {}",
                    checkpoint.state.num_classes(),
                    schedule.num_classes()
                ),
            }
            .into());
        }
        info!(
            task = checkpoint.task,
            adapted = checkpoint.state.adapted.distributions.len(),
            original = checkpoint.state.original.distributions.len(),
            "engine resumed from checkpoint"
        );
        Ok(Self {
            config,
            schedule,
            taxonomy,
            state: checkpoint.state,
            objective: None,
        })
    }

    pub fn config(&self) -> &AnamnesisConfig {
        &self.config
    }

    pub fn schedule(&self) -> &ClassSchedule {
        &self.schedule
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Look up the taxonomy level for `task` and build its contrastive
    /// objective. Γ comes from the original-space distances when OT
    /// weighting is on, so every class of `task` must already have an
    /// original-space distribution.
    pub fn begin_task(&mut self, task: TaskId) -> AnamnesisResult<&ContrastiveObjective> {
        self.check_task(task)?;
        if self.config.contrastive.ot_weighting {
            let original = &self.state.original.distributions;
            let classes = self.schedule.task_classes(task).unwrap_or_default();
            if let Some(&class) = classes.iter().find(|&&c| !original.contains(c)) {
                return Err(CalibrationError::MissingDistribution { class, task }.into());
            }
        }
        let weights = self
            .config
            .contrastive
            .ot_weighting
            .then(|| ClassWeights::from_distances(&self.state.original.distances, self.config.contrastive.delta));
        let objective =
            ContrastiveObjective::for_task(self.config.contrastive.clone(), weights, &*self.taxonomy, task)?;
        self.state.groups = objective.groups().clone();
        debug!(task, groups = objective.groups().len(), "task objective ready");
        Ok(&self.objective.insert((task, objective)).1)
    }

    /// Objective built by the last [`begin_task`](Self::begin_task).
    pub fn objective(&self) -> Option<&ContrastiveObjective> {
        self.objective.as_ref().map(|(_, o)| o)
    }

    /// Combined contrastive term for one training step, replaying a slice
    /// of the rehearsal buffer. Before the first calibration the buffer is
    /// empty and only the minibatch is contrasted.
    pub fn contrastive_loss(
        &self,
        task: TaskId,
        step: usize,
        features: &DMatrix<f64>,
        labels: &[ClassId],
    ) -> AnamnesisResult<ContrastiveOutput> {
        let _span = contrastive_span!(task).entered();
        let objective = match &self.objective {
            Some((t, objective)) if *t == task => objective,
            _ => return Err(ContrastiveError::MissingTaxonomy { task }.into()),
        };
        let mut rng = stage_rng(self.config.rehearsal.seed, &[REPLAY_STREAM, task as u64, step as u64]);
        let replay_size = self.config.rehearsal.samples_per_class();
        Ok(objective.loss_with_replay(features, labels, &self.state.rehearsal, replay_size, &mut rng)?)
    }

    /// Prototype separation against every adapted-space class mean.
    pub fn prototype_loss(&self, features: &DMatrix<f64>) -> ContrastiveOutput {
        let prototypes = self.state.adapted.distributions.prototypes();
        prototype_separation_loss(
            features,
            &prototypes,
            self.config.contrastive.prototype_temperature,
            self.config.contrastive.prototype_coefficient,
        )
    }

    /// Statistics of `task`'s classes under the frozen original backbone.
    pub fn collect_original_statistics<E: FeatureExtractor>(
        &mut self,
        extractor: &E,
        collective: &dyn Collective,
        task: TaskId,
        class_examples: &BTreeMap<ClassId, Vec<E::Input>>,
    ) -> AnamnesisResult<FillReport>
    where
        E::Input: Clone,
    {
        self.collect_statistics(FeatureSpace::Original, extractor, collective, task, class_examples)
    }

    /// Statistics of `task`'s classes under the model being trained.
    pub fn collect_adapted_statistics<E: FeatureExtractor>(
        &mut self,
        extractor: &E,
        collective: &dyn Collective,
        task: TaskId,
        class_examples: &BTreeMap<ClassId, Vec<E::Input>>,
    ) -> AnamnesisResult<FillReport>
    where
        E::Input: Clone,
    {
        self.collect_statistics(FeatureSpace::Adapted, extractor, collective, task, class_examples)
    }

    /// Estimate distributions for classes the space has not stored yet, then
    /// fill every missing distance.
    pub fn collect_statistics<E: FeatureExtractor>(
        &mut self,
        space: FeatureSpace,
        extractor: &E,
        collective: &dyn Collective,
        task: TaskId,
        class_examples: &BTreeMap<ClassId, Vec<E::Input>>,
    ) -> AnamnesisResult<FillReport>
    where
        E::Input: Clone,
    {
        self.check_task(task)?;
        let root = self.config.rehearsal.seed;
        let space_key = space_key(space);

        let pending: BTreeMap<ClassId, Vec<E::Input>> = class_examples
            .iter()
            .filter(|(class, _)| !self.state.space(space).distributions.contains(**class))
            .map(|(class, batches)| (*class, batches.clone()))
            .collect();

        if !pending.is_empty() {
            let _span = density_span!(space, task).entered();
            let estimator = DensityEstimator::new(self.config.density.clone(), derive_seed(root, &[space_key]));
            for (class, distribution) in estimator.estimate(extractor, collective, task, &pending)? {
                self.state.space_mut(space).distributions.insert(class, distribution);
            }
        }

        let computer = DistanceComputer::new(&self.config.transport, RehearsalSampler::new(&self.config.rehearsal));
        let target = self.state.space_mut(space);
        let _span = transport_span!(space, target.distributions.len()).entered();
        let report = target
            .distances
            .fill(&target.distributions, &computer, derive_seed(root, &[space_key, DISTANCE_STREAM]))?;
        info!(
            %space,
            task,
            estimated = pending.len(),
            stored = target.distributions.len(),
            computed = report.computed,
            "statistics collected"
        );
        Ok(report)
    }

    /// Retrain `head` on adapted-space samples after `task`.
    ///
    /// Returns `None` for task 0 unless first-task calibration is enabled.
    /// The report's buffer becomes the replay source for the next task.
    pub fn calibrate<H: ClassifierHead + ?Sized>(
        &mut self,
        head: &mut H,
        task: TaskId,
    ) -> AnamnesisResult<Option<CalibrationReport>> {
        self.check_task(task)?;
        if task == 0 && !self.config.calibration.calibrate_first_task {
            debug!(task, "first task, calibration skipped");
            return Ok(None);
        }
        let _span = calibration_span!(task, self.config.calibration.epochs).entered();
        let calibrator = ClassifierCalibrator::new(self.config.calibration.clone(), &self.config.rehearsal);
        let report = calibrator.run(
            head,
            &self.state.adapted.distributions,
            &self.schedule,
            task,
            self.config.rehearsal.seed,
        )?;
        self.state.rehearsal = report.buffer.clone();
        info!(
            task,
            epochs = report.epochs.len(),
            final_loss = report.final_loss().unwrap_or(0.0),
            buffered = report.buffer.len(),
            "calibration complete"
        );
        Ok(Some(report))
    }

    /// Evaluation-time logits re-weighted by adapted-space Mahalanobis
    /// distances and the current taxonomy groups.
    pub fn rescore(&self, features: &DMatrix<f64>, logits: &DMatrix<f64>) -> AnamnesisResult<DMatrix<f64>> {
        self.rescore_with_groups(features, logits, &self.state.groups)
    }

    pub fn rescore_with_groups(
        &self,
        features: &DMatrix<f64>,
        logits: &DMatrix<f64>,
        groups: &TaxonomyGroups,
    ) -> AnamnesisResult<DMatrix<f64>> {
        let _span = scoring_span!(features.nrows()).entered();
        let scoring = &self.config.scoring;
        let distances = mahalanobis_scores(
            features,
            &self.state.adapted.distributions,
            self.schedule.num_classes(),
            scoring.mahalanobis_jitter,
        )?;
        let weights = if self.config.contrastive.ot_weighting {
            ClassWeights::from_distances(&self.state.original.distances, self.config.contrastive.delta)
        } else {
            ClassWeights::uniform(self.schedule.num_classes())
        };
        Ok(taxonomy_energy_rescore(&distances, logits, groups, &weights, scoring.eta0, scoring.eta)?)
    }

    /// Snapshot the state for `task`.
    pub fn checkpoint(&self, task: TaskId) -> AnamnesisResult<Checkpoint> {
        Ok(Checkpoint::new(task, self.state.clone())?)
    }

    fn check_task(&self, task: TaskId) -> Result<(), CalibrationError> {
        if task >= self.schedule.num_tasks() {
            return Err(CalibrationError::UnknownTask {
                task,
                num_tasks: self.schedule.num_tasks(),
            });
        }
        Ok(())
    }
}

const DISTANCE_STREAM: u64 = 0x64697374;

fn space_key(space: FeatureSpace) -> u64 {
    match space {
        FeatureSpace::Adapted => 1,
        FeatureSpace::Original => 2,
    }
}
