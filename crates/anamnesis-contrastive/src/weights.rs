//! Class-pair weights Γ for the contrastive similarity.

use anamnesis_core::models::ClassId;
use anamnesis_transport::DistanceMatrix;
use nalgebra::DMatrix;

/// Symmetric C×C weight matrix indexed by class id.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassWeights {
    gamma: DMatrix<f64>,
}

impl ClassWeights {
    /// All-ones weights over `size` classes.
    pub fn uniform(size: usize) -> Self {
        Self {
            gamma: DMatrix::from_element(size, size, 1.0),
        }
    }

    /// `Γ[a, b] = exp(-d(a, b) / δ)`. Pairs without a distance, and the
    /// diagonal, weigh 1: close classes are pulled apart hardest.
    pub fn from_distances(matrix: &DistanceMatrix, delta: f64) -> Self {
        let size = matrix.size();
        let gamma = DMatrix::from_fn(size, size, |a, b| match matrix.get(a, b) {
            Some(d) => (-d / delta).exp(),
            None => 1.0,
        });
        Self { gamma }
    }

    pub fn from_dense(gamma: DMatrix<f64>) -> Self {
        Self { gamma }
    }

    pub fn size(&self) -> usize {
        self.gamma.nrows()
    }

    /// Γ[a, b]. Callers check labels against [`size`](Self::size) first.
    pub fn weight(&self, a: ClassId, b: ClassId) -> f64 {
        self.gamma[(a, b)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn larger_distance_smaller_weight() {
        let mut matrix = DistanceMatrix::new(3);
        matrix.set(0, 1, 0.5).unwrap();
        matrix.set(0, 2, 4.0).unwrap();
        let w = ClassWeights::from_distances(&matrix, 1.0);
        assert!(w.weight(0, 1) > w.weight(0, 2));
        assert_eq!(w.weight(1, 0), w.weight(0, 1));
        assert_eq!(w.weight(2, 2), 1.0);
        // (1, 2) never computed.
        assert_eq!(w.weight(1, 2), 1.0);
        assert!((w.weight(0, 2) - (-4.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn delta_softens_weights() {
        let mut matrix = DistanceMatrix::new(2);
        matrix.set(0, 1, 2.0).unwrap();
        let sharp = ClassWeights::from_distances(&matrix, 0.5).weight(0, 1);
        let soft = ClassWeights::from_distances(&matrix, 4.0).weight(0, 1);
        assert!(soft > sharp);
    }
}
