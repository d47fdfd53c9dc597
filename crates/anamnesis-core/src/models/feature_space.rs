use std::fmt;

use serde::{Deserialize, Serialize};

/// Which feature extractor a distribution / distance matrix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSpace {
    /// The model being trained task after task.
    Adapted,
    /// The frozen original backbone.
    Original,
}

impl fmt::Display for FeatureSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adapted => f.write_str("adapted"),
            Self::Original => f.write_str("original"),
        }
    }
}
