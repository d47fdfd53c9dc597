//! # anamnesis-density
//!
//! Turns per-class feature batches into `ClassDistribution` summaries.
//! Features are pooled across cooperating workers through a `Collective`
//! before statistics are derived, so every worker stores identical summaries.

pub mod collective;
pub mod estimator;
pub mod kmeans;
pub mod statistics;

pub use collective::{LocalCollective, ThreadCollective, WorkerGroup};
pub use estimator::DensityEstimator;
pub use kmeans::{Clustering, KMeans};
