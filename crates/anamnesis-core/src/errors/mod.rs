//! Error handling for anamnesis.
//! One error enum per subsystem, `thiserror` only.

pub mod anamnesis_error;
pub mod calibration_error;
pub mod config_error;
pub mod contrastive_error;
pub mod density_error;
pub mod error_code;
pub mod rehearsal_error;
pub mod transport_error;

pub use anamnesis_error::{AnamnesisError, AnamnesisResult};
pub use calibration_error::CalibrationError;
pub use config_error::ConfigError;
pub use contrastive_error::ContrastiveError;
pub use density_error::DensityError;
pub use error_code::ErrorCode;
pub use rehearsal_error::RehearsalError;
pub use transport_error::TransportError;
