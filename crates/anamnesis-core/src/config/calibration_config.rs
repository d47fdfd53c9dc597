use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Optimizer used for head retraining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// SGD with momentum and coupled weight decay.
    #[default]
    Sgd,
    /// AdamW at a tenth of the configured learning rate.
    AdamW,
}

impl FromStr for OptimizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sgd" => Ok(Self::Sgd),
            "adamw" => Ok(Self::AdamW),
            other => Err(ConfigError::UnsupportedMode {
                kind: "optimizer".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sgd => "sgd",
            Self::AdamW => "adamw",
        })
    }
}

/// Classifier head retraining after each task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub epochs: usize,
    pub lr: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    pub optimizer: OptimizerKind,
    /// Floor of the cosine schedule.
    pub eta_min: f64,
    /// Mask logits of classes not yet introduced.
    pub mask_unseen: bool,
    /// Also calibrate after task 0.
    pub calibrate_first_task: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            epochs: defaults::DEFAULT_CALIBRATION_EPOCHS,
            lr: defaults::DEFAULT_CALIBRATION_LR,
            momentum: defaults::DEFAULT_MOMENTUM,
            weight_decay: defaults::DEFAULT_WEIGHT_DECAY,
            optimizer: OptimizerKind::default(),
            eta_min: defaults::DEFAULT_ETA_MIN,
            mask_unseen: defaults::DEFAULT_MASK_UNSEEN,
            calibrate_first_task: defaults::DEFAULT_CALIBRATE_FIRST_TASK,
        }
    }
}
