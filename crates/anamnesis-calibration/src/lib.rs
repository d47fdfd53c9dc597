//! # anamnesis-calibration
//!
//! After each task: retrain the classifier head on synthetic features drawn
//! from every seen class's stored distribution, keep the final epoch's
//! samples for replay, and persist the per-class statistics and distance
//! matrices between tasks. `CalibrationEngine` drives the whole
//! task-boundary sequence.

pub mod calibrator;
pub mod checkpoint;
pub mod engine;
pub mod head;
pub mod loss;
pub mod optim;
pub mod scoring;
pub mod state;

pub use calibrator::{CalibrationReport, ClassifierCalibrator, EpochSummary};
pub use checkpoint::Checkpoint;
pub use engine::CalibrationEngine;
pub use head::LinearHead;
pub use loss::{masked_cross_entropy, CrossEntropyOutput};
pub use optim::{AdamW, CosineAnnealing, Optimizer, Sgd};
pub use scoring::{mahalanobis_scores, taxonomy_energy_rescore};
pub use state::{CalibrationState, SpaceState};
