//! # anamnesis-core
//!
//! Foundation crate for the anamnesis calibration engine.
//! Defines the class-distribution data model, collaborator traits, errors,
//! config, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::AnamnesisConfig;
pub use errors::{AnamnesisError, AnamnesisResult};
pub use models::{
    ClassDistribution, ClassId, ClassSchedule, DistributionMode, DistributionStore, FeatureSpace,
    SyntheticBatch, TaskId, TaxonomyGroups,
};
