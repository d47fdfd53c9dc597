//! CalibrationState: everything the engine carries from one task to the next.

use anamnesis_core::models::{DistributionStore, FeatureSpace, TaxonomyGroups};
use anamnesis_rehearsal::RehearsalBuffer;
use anamnesis_transport::DistanceMatrix;
use serde::{Deserialize, Serialize};

/// Distributions and pairwise distances for one feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceState {
    pub distributions: DistributionStore,
    pub distances: DistanceMatrix,
}

impl SpaceState {
    pub fn new(num_classes: usize) -> Self {
        Self {
            distributions: DistributionStore::new(),
            distances: DistanceMatrix::new(num_classes),
        }
    }
}

/// Owned by the outer task loop and passed into every stage.
///
/// The rehearsal buffer is rebuilt by the next calibration and is not
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub adapted: SpaceState,
    pub original: SpaceState,
    /// Taxonomy groups of the most recently started task.
    #[serde(default)]
    pub groups: TaxonomyGroups,
    #[serde(skip)]
    pub rehearsal: RehearsalBuffer,
}

impl CalibrationState {
    pub fn new(num_classes: usize) -> Self {
        Self {
            adapted: SpaceState::new(num_classes),
            original: SpaceState::new(num_classes),
            groups: TaxonomyGroups::default(),
            rehearsal: RehearsalBuffer::default(),
        }
    }

    pub fn space(&self, space: FeatureSpace) -> &SpaceState {
        match space {
            FeatureSpace::Adapted => &self.adapted,
            FeatureSpace::Original => &self.original,
        }
    }

    pub fn space_mut(&mut self, space: FeatureSpace) -> &mut SpaceState {
        match space {
            FeatureSpace::Adapted => &mut self.adapted,
            FeatureSpace::Original => &mut self.original,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.adapted.distances.size()
    }
}
