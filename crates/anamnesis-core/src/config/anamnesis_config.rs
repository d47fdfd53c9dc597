//! Top-level anamnesis configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    CalibrationConfig, ContrastiveConfig, DensityConfig, ObservabilityConfig, RehearsalConfig,
    ScoringConfig, TransportConfig,
};
use crate::errors::ConfigError;
use crate::models::DistributionMode;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`ANAMNESIS_*`)
/// 2. Config file
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnamnesisConfig {
    pub density: DensityConfig,
    pub rehearsal: RehearsalConfig,
    pub transport: TransportConfig,
    pub contrastive: ContrastiveConfig,
    pub calibration: CalibrationConfig,
    pub scoring: ScoringConfig,
    pub observability: ObservabilityConfig,
}

impl AnamnesisConfig {
    /// Load configuration: file (if given and present), then env, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file without env overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `ANAMNESIS_*` environment overrides.
    ///
    /// An unknown distribution mode is an error. Unparseable numbers are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Keys are the
    /// `ANAMNESIS_*` variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ANAMNESIS_DISTRIBUTION_MODE") {
            self.density.mode = val.parse::<DistributionMode>()?;
        }
        if let Some(v) = lookup("ANAMNESIS_N_CENTROIDS").and_then(|s| s.parse().ok()) {
            self.density.n_centroids = v;
        }
        if let Some(v) = lookup("ANAMNESIS_BATCH_SIZE").and_then(|s| s.parse().ok()) {
            self.rehearsal.batch_size = v;
        }
        if let Some(v) = lookup("ANAMNESIS_SEED").and_then(|s| s.parse().ok()) {
            self.rehearsal.seed = v;
        }
        if let Some(v) = lookup("ANAMNESIS_CALIBRATION_EPOCHS").and_then(|s| s.parse().ok()) {
            self.calibration.epochs = v;
        }
        if let Some(val) = lookup("ANAMNESIS_LOG_LEVEL") {
            self.observability.log_level = val;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.density.mode == DistributionMode::MultiCentroid && self.density.n_centroids == 0 {
            return Err(invalid("density.n_centroids", "must be greater than 0"));
        }
        if self.density.kmeans_max_iterations == 0 {
            return Err(invalid("density.kmeans_max_iterations", "must be greater than 0"));
        }
        if self.rehearsal.batch_size == 0 {
            return Err(invalid("rehearsal.batch_size", "must be greater than 0"));
        }
        if self.rehearsal.sample_multiplier == 0 {
            return Err(invalid("rehearsal.sample_multiplier", "must be greater than 0"));
        }
        if !(self.contrastive.temperature.is_finite() && self.contrastive.temperature > 0.0) {
            return Err(invalid("contrastive.temperature", "must be finite and > 0"));
        }
        if !(self.contrastive.delta.is_finite() && self.contrastive.delta > 0.0) {
            return Err(invalid("contrastive.delta", "must be finite and > 0"));
        }
        if !(self.contrastive.prototype_temperature.is_finite()
            && self.contrastive.prototype_temperature > 0.0)
        {
            return Err(invalid("contrastive.prototype_temperature", "must be finite and > 0"));
        }
        for (field, value) in [
            ("contrastive.reg_glob", self.contrastive.reg_glob),
            ("contrastive.reg_sub", self.contrastive.reg_sub),
            ("contrastive.prototype_coefficient", self.contrastive.prototype_coefficient),
            ("calibration.weight_decay", self.calibration.weight_decay),
            ("calibration.eta_min", self.calibration.eta_min),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be finite and >= 0"));
            }
        }
        if !(self.calibration.lr.is_finite() && self.calibration.lr > 0.0) {
            return Err(invalid("calibration.lr", "must be finite and > 0"));
        }
        if !(0.0..1.0).contains(&self.calibration.momentum) {
            return Err(invalid("calibration.momentum", "must be in [0, 1)"));
        }
        if self.scoring.mahalanobis_jitter < 0.0 {
            return Err(invalid("scoring.mahalanobis_jitter", "must be >= 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
