//! ErrorCode trait: stable machine-readable codes for every error enum.

/// Every error enum implements this to expose a structured error code
/// string the outer training loop can match on or log.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "DENSITY_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted coded string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const UNSUPPORTED_MODE: &str = "UNSUPPORTED_MODE";
pub const DENSITY_ERROR: &str = "DENSITY_ERROR";
pub const COLLECTIVE_ERROR: &str = "COLLECTIVE_ERROR";
pub const REHEARSAL_ERROR: &str = "REHEARSAL_ERROR";
pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
pub const CONTRASTIVE_ERROR: &str = "CONTRASTIVE_ERROR";
pub const MISSING_TAXONOMY: &str = "MISSING_TAXONOMY";
pub const CALIBRATION_ERROR: &str = "CALIBRATION_ERROR";
pub const DIVERGED: &str = "DIVERGED";
pub const CHECKPOINT_ERROR: &str = "CHECKPOINT_ERROR";
pub const EXTRACTOR_ERROR: &str = "EXTRACTOR_ERROR";
