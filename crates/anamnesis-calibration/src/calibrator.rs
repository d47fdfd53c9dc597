//! ClassifierCalibrator: head retraining on pseudo-rehearsal features.

use anamnesis_core::config::{CalibrationConfig, RehearsalConfig};
use anamnesis_core::errors::{AnamnesisResult, CalibrationError};
use anamnesis_core::models::{ClassSchedule, DistributionStore, SyntheticBatch, TaskId};
use anamnesis_core::traits::ClassifierHead;
use anamnesis_rehearsal::{stage_rng, RehearsalBuffer, RehearsalSampler};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::loss::masked_cross_entropy;
use crate::optim::{self, CosineAnnealing};

const CALIBRATION_STREAM: u64 = 0x63616c69;

/// Loss summary for one calibration epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub lr: f64,
    pub mean_loss: f64,
    pub steps: usize,
    pub samples: usize,
}

/// Outcome of one calibration run.
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub task: TaskId,
    pub epochs: Vec<EpochSummary>,
    /// Last epoch's samples for the task's own classes.
    pub buffer: RehearsalBuffer,
}

impl CalibrationReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.mean_loss)
    }
}

/// Retrains a classifier head on features sampled from stored class
/// distributions.
#[derive(Debug, Clone)]
pub struct ClassifierCalibrator {
    config: CalibrationConfig,
    sampler: RehearsalSampler,
}

impl ClassifierCalibrator {
    pub fn new(config: CalibrationConfig, rehearsal: &RehearsalConfig) -> Self {
        Self {
            config,
            sampler: RehearsalSampler::new(rehearsal),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Retrain `head` after `task`.
    ///
    /// Each epoch samples the per-class unit for every class of tasks
    /// `0..=task`, shuffles, and steps once per chunk of that size. Logits
    /// of classes from later tasks are masked when configured. A non-finite
    /// loss stops the run with [`CalibrationError::Diverged`].
    pub fn run<H: ClassifierHead + ?Sized>(
        &self,
        head: &mut H,
        store: &DistributionStore,
        schedule: &ClassSchedule,
        task: TaskId,
        seed: u64,
    ) -> AnamnesisResult<CalibrationReport> {
        let own = schedule.task_classes(task).ok_or(CalibrationError::UnknownTask {
            task,
            num_tasks: schedule.num_tasks(),
        })?;
        if head.num_classes() != schedule.num_classes() || head.input_dim() != store.dim() {
            return Err(CalibrationError::HeadShapeMismatch {
                expected: format!("{}x{}", schedule.num_classes(), store.dim()),
                actual: format!("{}x{}", head.num_classes(), head.input_dim()),
            }
            .into());
        }

        let seen = schedule.classes_through(task);
        let allowed: Option<Vec<bool>> = self
            .config
            .mask_unseen
            .then(|| schedule.unseen_mask(task).iter().map(|unseen| !unseen).collect());
        let unit = self.sampler.samples_per_class();

        let mut optimizer = optim::build(&self.config);
        let mut lr_schedule = CosineAnnealing::new(self.config.lr, self.config.eta_min, self.config.epochs);
        let mut epochs = Vec::with_capacity(self.config.epochs);
        let mut last = SyntheticBatch::empty(store.dim());

        for epoch in 0..self.config.epochs {
            let lr = lr_schedule.lr() * optimizer.lr_scale();
            let mut rng = stage_rng(seed, &[CALIBRATION_STREAM, task as u64, epoch as u64]);

            let mut parts = Vec::with_capacity(seen.len());
            for &class in &seen {
                let distribution = store
                    .get(class)
                    .ok_or(CalibrationError::MissingDistribution { class, task })?;
                parts.push(self.sampler.sample_labeled(class, distribution, unit, &mut rng)?);
            }
            let mut data = SyntheticBatch::concat(&parts);
            data.shuffle(&mut rng);

            let mut total = 0.0;
            let chunks = data.chunks(unit);
            for (step, chunk) in chunks.iter().enumerate() {
                let logits = head.forward(&chunk.features);
                let ce = masked_cross_entropy(&logits, &chunk.labels, allowed.as_deref());
                if !ce.loss.is_finite() {
                    error!(task, epoch, step, loss = ce.loss, "calibration loss diverged");
                    return Err(CalibrationError::Diverged {
                        epoch,
                        step,
                        loss: ce.loss,
                    }
                    .into());
                }
                let grad = head.backward(&chunk.features, &ce.grad);
                optimizer.step(head.parameters_mut(), &grad, lr);
                total += ce.loss;
            }

            let summary = EpochSummary {
                epoch,
                lr,
                mean_loss: if chunks.is_empty() { 0.0 } else { total / chunks.len() as f64 },
                steps: chunks.len(),
                samples: data.len(),
            };
            info!(
                task,
                epoch,
                lr = summary.lr,
                mean_loss = summary.mean_loss,
                steps = summary.steps,
                optimizer = optimizer.name(),
                "calibration epoch complete"
            );
            epochs.push(summary);
            lr_schedule.step();
            last = data;
        }

        let keep: Vec<usize> = last
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| own.contains(label))
            .map(|(i, _)| i)
            .collect();
        let buffer = if keep.is_empty() {
            RehearsalBuffer::default()
        } else {
            RehearsalBuffer::new(last.select(&keep))
        };

        Ok(CalibrationReport {
            task,
            epochs,
            buffer,
        })
    }
}
