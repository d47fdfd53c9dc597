//! # anamnesis-rehearsal
//!
//! Draws synthetic features from stored class distributions so past tasks
//! can be replayed without keeping raw examples.

pub mod buffer;
pub mod gaussian;
pub mod sampler;
pub mod seeding;

pub use buffer::RehearsalBuffer;
pub use gaussian::GaussianSampler;
pub use sampler::RehearsalSampler;
pub use seeding::{derive_seed, stage_rng};
