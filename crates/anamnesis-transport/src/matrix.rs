//! DistanceMatrix: symmetric, presence-tracked, filled at most once per pair.

use anamnesis_core::errors::TransportError;
use anamnesis_core::models::{ClassId, DistributionStore};
use anamnesis_rehearsal::stage_rng;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::computer::DistanceComputer;

/// Square class × class distance table.
///
/// Each off-diagonal entry is either unset or holds a computed distance;
/// a stored zero is a real distance and is never recomputed. The diagonal
/// is implicitly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    entries: Vec<Option<f64>>,
}

/// Outcome of one [`DistanceMatrix::fill`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FillReport {
    /// Pairs computed by this call.
    pub computed: usize,
    /// Pairs already present and left untouched.
    pub skipped: usize,
    /// Largest entry in the matrix after the call.
    pub max_distance: f64,
}

impl DistanceMatrix {
    /// An empty matrix over the class universe `0..size`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            entries: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `distance(i, j)`; `Some(0.0)` on the diagonal, `None` if unset or out of range.
    pub fn get(&self, i: ClassId, j: ClassId) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        if i == j {
            return Some(0.0);
        }
        self.entries[i * self.size + j]
    }

    pub fn is_set(&self, i: ClassId, j: ClassId) -> bool {
        self.get(i, j).is_some()
    }

    /// Write `(i, j)` and `(j, i)`. Diagonal writes are ignored.
    pub fn set(&mut self, i: ClassId, j: ClassId, distance: f64) -> Result<(), TransportError> {
        for class in [i, j] {
            if class >= self.size {
                return Err(TransportError::ClassOutOfRange {
                    class,
                    size: self.size,
                });
            }
        }
        if i != j {
            self.entries[i * self.size + j] = Some(distance);
            self.entries[j * self.size + i] = Some(distance);
        }
        Ok(())
    }

    /// Number of distinct unordered pairs present.
    pub fn computed_pairs(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count() / 2
    }

    /// Largest stored distance (0 when empty).
    pub fn max_distance(&self) -> f64 {
        self.entries.iter().flatten().copied().fold(0.0, f64::max)
    }

    /// Dense copy with `unset` in place of missing entries.
    pub fn to_dense(&self, unset: f64) -> DMatrix<f64> {
        DMatrix::from_fn(self.size, self.size, |i, j| self.get(i, j).unwrap_or(unset))
    }

    /// Compute every unset pair among the classes in `store`.
    ///
    /// Pairs run in parallel; each pair draws from its own generator keyed
    /// on `(seed, i, j)`, so the result does not depend on scheduling and a
    /// second call with the same store changes nothing.
    pub fn fill(
        &mut self,
        store: &DistributionStore,
        computer: &DistanceComputer,
        seed: u64,
    ) -> Result<FillReport, TransportError> {
        let ids = store.class_ids();
        if let Some(&class) = ids.iter().find(|&&c| c >= self.size) {
            return Err(TransportError::ClassOutOfRange {
                class,
                size: self.size,
            });
        }

        let mut pending = Vec::new();
        let mut skipped = 0;
        for (a, &i) in ids.iter().enumerate() {
            for &j in &ids[a + 1..] {
                if self.is_set(i, j) {
                    skipped += 1;
                } else {
                    pending.push((i, j));
                }
            }
        }

        let computed: Vec<(ClassId, ClassId, f64)> = pending
            .par_iter()
            .map(|&(i, j)| {
                let left = store.get(i).ok_or(TransportError::MissingDistribution { class: i })?;
                let right = store.get(j).ok_or(TransportError::MissingDistribution { class: j })?;
                let mut rng = stage_rng(seed, &[i as u64, j as u64]);
                computer.distance(left, right, &mut rng).map(|d| (i, j, d))
            })
            .collect::<Result<_, _>>()?;

        for &(i, j, d) in &computed {
            self.set(i, j, d)?;
        }

        let report = FillReport {
            computed: computed.len(),
            skipped,
            max_distance: self.max_distance(),
        };
        info!(
            classes = ids.len(),
            computed = report.computed,
            skipped = report.skipped,
            max_distance = report.max_distance,
            "distance matrix filled"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_symmetric() {
        let mut m = DistanceMatrix::new(3);
        m.set(0, 2, 1.5).unwrap();
        assert_eq!(m.get(2, 0), Some(1.5));
        assert_eq!(m.get(1, 1), Some(0.0));
        assert_eq!(m.get(0, 1), None);
        assert_eq!(m.computed_pairs(), 1);
    }

    #[test]
    fn zero_distance_counts_as_present() {
        let mut m = DistanceMatrix::new(2);
        m.set(0, 1, 0.0).unwrap();
        assert!(m.is_set(1, 0));
    }

    #[test]
    fn out_of_range_write_fails() {
        let mut m = DistanceMatrix::new(2);
        assert!(matches!(
            m.set(0, 5, 1.0),
            Err(TransportError::ClassOutOfRange { class: 5, size: 2 })
        ));
    }

    #[test]
    fn dense_view_fills_unset() {
        let mut m = DistanceMatrix::new(2);
        assert_eq!(m.to_dense(-1.0)[(0, 1)], -1.0);
        m.set(1, 0, 3.0).unwrap();
        assert_eq!(m.to_dense(-1.0)[(0, 1)], 3.0);
    }
}
