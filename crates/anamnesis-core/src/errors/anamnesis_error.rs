//! Top-level error aggregating every subsystem error via `From` conversions.

use super::error_code::ErrorCode;
use super::{
    CalibrationError, ConfigError, ContrastiveError, DensityError, RehearsalError, TransportError,
};

/// Any error the engine can surface to the outer task loop.
#[derive(Debug, thiserror::Error)]
pub enum AnamnesisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Density error: {0}")]
    Density(#[from] DensityError),

    #[error("Rehearsal error: {0}")]
    Rehearsal(#[from] RehearsalError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Contrastive error: {0}")]
    Contrastive(#[from] ContrastiveError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),
}

impl AnamnesisError {
    /// Whether the error must terminate the run (loss divergence).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Calibration(e) if e.is_fatal())
    }
}

impl ErrorCode for AnamnesisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Density(e) => e.error_code(),
            Self::Rehearsal(e) => e.error_code(),
            Self::Transport(e) => e.error_code(),
            Self::Contrastive(e) => e.error_code(),
            Self::Calibration(e) => e.error_code(),
        }
    }
}

/// Convenience alias used across the workspace.
pub type AnamnesisResult<T> = Result<T, AnamnesisError>;
