//! # anamnesis-contrastive
//!
//! Supervised contrastive loss with optional class-pair weights Γ derived
//! from distributional distances, scoped per taxonomy group and combined
//! with an unweighted global term. Every loss returns its gradient with
//! respect to the input rows alongside the value.

pub mod objective;
pub mod prototype;
pub mod supcon;
pub mod taxonomy_scoped;
pub mod weights;

pub use objective::ContrastiveObjective;
pub use prototype::prototype_separation_loss;
pub use supcon::{global_loss, supervised_contrastive, ContrastiveOutput};
pub use taxonomy_scoped::taxonomy_scoped_loss;
pub use weights::ClassWeights;
