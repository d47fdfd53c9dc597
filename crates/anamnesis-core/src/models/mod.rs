//! Data model shared by every stage of the calibration engine.

pub mod class_schedule;
pub mod distribution;
pub mod distribution_store;
pub mod feature_space;
pub mod synthetic_batch;
pub mod taxonomy;

pub use class_schedule::ClassSchedule;
pub use distribution::{Centroid, ClassDistribution, DistributionMode};
pub use distribution_store::DistributionStore;
pub use feature_space::FeatureSpace;
pub use synthetic_batch::SyntheticBatch;
pub use taxonomy::{StaticTaxonomy, TaxonomyGroups, TaxonomyNode};

/// Identifier of a class in the global label space.
pub type ClassId = usize;

/// Index of a task in the sequence.
pub type TaskId = usize;
