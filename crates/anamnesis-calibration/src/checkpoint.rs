//! Per-task checkpoint of the calibration state.
//!
//! Written next to the outer system's model checkpoint so a resumed run can
//! skip statistics and distances already computed for earlier classes.

use std::path::Path;

use anamnesis_core::constants::CHECKPOINT_FORMAT_VERSION;
use anamnesis_core::errors::CalibrationError;
use anamnesis_core::models::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::CalibrationState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub format_version: u32,
    pub task: TaskId,
    pub created_at: DateTime<Utc>,
    /// blake3 hex digest of the serialized state.
    pub digest: String,
    pub state: CalibrationState,
}

impl Checkpoint {
    pub fn new(task: TaskId, state: CalibrationState) -> Result<Self, CalibrationError> {
        let digest = state_digest(&state)?;
        Ok(Self {
            format_version: CHECKPOINT_FORMAT_VERSION,
            task,
            created_at: Utc::now(),
            digest,
            state,
        })
    }

    pub fn to_json(&self) -> Result<String, CalibrationError> {
        serde_json::to_string(self).map_err(|e| checkpoint_error(format!("serialize: {e}")))
    }

    /// Parse and verify the format version and digest.
    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| checkpoint_error(format!("parse: {e}")))?;
        if checkpoint.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(checkpoint_error(format!(
                "unsupported format version {} (expected {})",
                checkpoint.format_version, CHECKPOINT_FORMAT_VERSION
            )));
        }
        let actual = state_digest(&checkpoint.state)?;
        if actual != checkpoint.digest {
            return Err(checkpoint_error(format!(
                "digest mismatch: recorded {}, computed {}",
                checkpoint.digest, actual
            )));
        }
        Ok(checkpoint)
    }

    pub fn save(&self, path: &Path) -> Result<(), CalibrationError> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .map_err(|e| checkpoint_error(format!("write {}: {e}", path.display())))?;
        info!(task = self.task, path = %path.display(), "checkpoint saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| checkpoint_error(format!("read {}: {e}", path.display())))?;
        let checkpoint = Self::from_json(&json)?;
        info!(task = checkpoint.task, path = %path.display(), "checkpoint loaded");
        Ok(checkpoint)
    }
}

fn state_digest(state: &CalibrationState) -> Result<String, CalibrationError> {
    let bytes =
        serde_json::to_vec(state).map_err(|e| checkpoint_error(format!("serialize state: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn checkpoint_error(reason: String) -> CalibrationError {
    CalibrationError::Checkpoint { reason }
}
