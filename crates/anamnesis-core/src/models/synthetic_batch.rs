//! A batch of labelled feature rows, real or synthetic.

use nalgebra::DMatrix;
use rand::seq::SliceRandom;
use rand::Rng;

use super::ClassId;

/// Feature rows (N×D) with one label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticBatch {
    pub features: DMatrix<f64>,
    pub labels: Vec<ClassId>,
}

impl SyntheticBatch {
    /// # Panics
    /// Panics if the row count and label count differ.
    pub fn new(features: DMatrix<f64>, labels: Vec<ClassId>) -> Self {
        assert_eq!(features.nrows(), labels.len(), "one label per feature row");
        Self { features, labels }
    }

    pub fn empty(dim: usize) -> Self {
        Self {
            features: DMatrix::zeros(0, dim),
            labels: Vec::new(),
        }
    }

    /// `n` copies of `class` over the given rows.
    pub fn uniform(features: DMatrix<f64>, class: ClassId) -> Self {
        let labels = vec![class; features.nrows()];
        Self { features, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.features.ncols()
    }

    /// Stack batches row-wise. All non-empty parts must share a dimension.
    pub fn concat(parts: &[SyntheticBatch]) -> Self {
        let dim = parts.iter().map(|p| p.dim()).find(|&d| d > 0).unwrap_or(0);
        let total: usize = parts.iter().map(|p| p.len()).sum();
        let mut features = DMatrix::zeros(total, dim);
        let mut labels = Vec::with_capacity(total);
        let mut row = 0;
        for part in parts.iter().filter(|p| !p.is_empty()) {
            features
                .rows_mut(row, part.len())
                .copy_from(&part.features);
            labels.extend_from_slice(&part.labels);
            row += part.len();
        }
        Self { features, labels }
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let dim = self.dim();
        let features = DMatrix::from_fn(indices.len(), dim, |r, c| self.features[(indices[r], c)]);
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        Self { features, labels }
    }

    /// Random row permutation.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        *self = self.select(&order);
    }

    /// Consecutive chunks of at most `size` rows.
    pub fn chunks(&self, size: usize) -> Vec<SyntheticBatch> {
        let size = size.max(1);
        (0..self.len())
            .step_by(size)
            .map(|start| {
                let end = (start + size).min(self.len());
                let indices: Vec<usize> = (start..end).collect();
                self.select(&indices)
            })
            .collect()
    }
}
