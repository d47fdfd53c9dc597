//! Configuration for anamnesis.
//! TOML-based, 3-layer resolution: env > file > defaults.

pub mod anamnesis_config;
pub mod calibration_config;
pub mod contrastive_config;
pub mod defaults;
pub mod density_config;
pub mod observability_config;
pub mod rehearsal_config;
pub mod scoring_config;
pub mod transport_config;

pub use anamnesis_config::AnamnesisConfig;
pub use calibration_config::{CalibrationConfig, OptimizerKind};
pub use contrastive_config::ContrastiveConfig;
pub use density_config::DensityConfig;
pub use observability_config::ObservabilityConfig;
pub use rehearsal_config::RehearsalConfig;
pub use scoring_config::ScoringConfig;
pub use transport_config::{DistanceStrategy, GroundCost, TransportConfig};
