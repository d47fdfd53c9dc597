//! Append-only class-id → distribution map.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::{ClassDistribution, ClassId};

/// Distributions for every class observed so far in one feature space.
///
/// Entries are snapshots: once a class has a distribution it is never
/// replaced, so a resumed run keeps the statistics of the original pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionStore {
    entries: BTreeMap<ClassId, ClassDistribution>,
}

impl DistributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a distribution. Returns `false` (and keeps the existing entry)
    /// if the class already has one.
    pub fn insert(&mut self, class: ClassId, distribution: ClassDistribution) -> bool {
        if self.entries.contains_key(&class) {
            return false;
        }
        self.entries.insert(class, distribution);
        true
    }

    pub fn get(&self, class: ClassId) -> Option<&ClassDistribution> {
        self.entries.get(&class)
    }

    pub fn contains(&self, class: ClassId) -> bool {
        self.entries.contains_key(&class)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Class ids in ascending order.
    pub fn class_ids(&self) -> Vec<ClassId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassDistribution)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Feature dimensionality of the stored summaries (0 when empty).
    pub fn dim(&self) -> usize {
        self.entries.values().map(|d| d.dim()).find(|&d| d > 0).unwrap_or(0)
    }

    /// Every stored component mean, in class order. Used as class prototypes.
    pub fn prototypes(&self) -> Vec<DVector<f64>> {
        self.entries
            .values()
            .flat_map(|d| d.means().into_iter().cloned())
            .collect()
    }
}
