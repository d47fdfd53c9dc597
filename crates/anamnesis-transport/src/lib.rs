//! # anamnesis-transport
//!
//! Distributional distances between classes and the symmetric,
//! fill-once matrix that stores them.

pub mod computer;
pub mod emd;
pub mod gaussian;
pub mod matrix;

pub use anamnesis_core::config::{DistanceStrategy, GroundCost};
pub use computer::DistanceComputer;
pub use gaussian::gaussian_wasserstein;
pub use matrix::{DistanceMatrix, FillReport};
