//! DistanceComputer: one strategy for every pair of class distributions.

use anamnesis_core::config::{DistanceStrategy, GroundCost, TransportConfig};
use anamnesis_core::errors::TransportError;
use anamnesis_core::models::ClassDistribution;
use anamnesis_rehearsal::RehearsalSampler;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::emd;
use crate::gaussian::gaussian_wasserstein;

/// Computes the distance between two class distributions.
#[derive(Debug, Clone, Copy)]
pub struct DistanceComputer {
    strategy: DistanceStrategy,
    ground_cost: GroundCost,
    sampler: RehearsalSampler,
}

impl DistanceComputer {
    pub fn new(config: &TransportConfig, sampler: RehearsalSampler) -> Self {
        Self {
            strategy: config.strategy,
            ground_cost: config.ground_cost,
            sampler,
        }
    }

    pub fn strategy(&self) -> DistanceStrategy {
        self.strategy
    }

    /// Distance between `a` and `b`.
    ///
    /// Closed form applies only when both sides are single Gaussians; a
    /// mixture on either side falls back to sampling. Sampling draws the
    /// per-class sample unit from each side and solves exact OT under the
    /// configured ground cost.
    pub fn distance<R: Rng + ?Sized>(
        &self,
        a: &ClassDistribution,
        b: &ClassDistribution,
        rng: &mut R,
    ) -> Result<f64, TransportError> {
        if a.dim() != b.dim() {
            return Err(TransportError::DimensionMismatch {
                left: a.dim(),
                right: b.dim(),
            });
        }
        match (self.strategy, closed_form_parts(a), closed_form_parts(b)) {
            (DistanceStrategy::ClosedForm, Some((m1, c1)), Some((m2, c2))) => {
                Ok(gaussian_wasserstein(&m1, &c1, &m2, &c2))
            }
            _ => self.sampled(a, b, rng),
        }
    }

    fn sampled<R: Rng + ?Sized>(
        &self,
        a: &ClassDistribution,
        b: &ClassDistribution,
        rng: &mut R,
    ) -> Result<f64, TransportError> {
        let n = self.sampler.samples_per_class();
        let xa = self.sampler.sample(a, n, rng)?;
        let xb = self.sampler.sample(b, n, rng)?;
        let cost = self.cost_matrix(&xa, &xb);
        emd::solve(&cost)
    }

    /// Pairwise ground cost between the rows of `xa` and `xb`.
    pub fn cost_matrix(&self, xa: &DMatrix<f64>, xb: &DMatrix<f64>) -> DMatrix<f64> {
        let rows_a: Vec<Vec<f64>> = xa.row_iter().map(|r| r.iter().copied().collect()).collect();
        let rows_b: Vec<Vec<f64>> = xb.row_iter().map(|r| r.iter().copied().collect()).collect();
        DMatrix::from_fn(rows_a.len(), rows_b.len(), |i, j| {
            self.ground_cost.cost(&rows_a[i], &rows_b[j])
        })
    }
}

fn closed_form_parts(dist: &ClassDistribution) -> Option<(DVector<f64>, DMatrix<f64>)> {
    match dist {
        ClassDistribution::GaussianFull { mean, covariance } => {
            Some((mean.clone(), covariance.clone()))
        }
        ClassDistribution::GaussianDiagonal { mean, variance } => {
            Some((mean.clone(), DMatrix::from_diagonal(variance)))
        }
        ClassDistribution::MixtureOfCentroids { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anamnesis_core::config::RehearsalConfig;
    use anamnesis_core::models::Centroid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn computer(strategy: DistanceStrategy) -> DistanceComputer {
        let rehearsal = RehearsalConfig {
            batch_size: 4,
            ..RehearsalConfig::default()
        };
        DistanceComputer::new(
            &TransportConfig {
                strategy,
                ground_cost: GroundCost::SquaredEuclidean,
            },
            RehearsalSampler::new(&rehearsal),
        )
    }

    #[test]
    fn mixture_falls_back_to_sampling() {
        let mixture = ClassDistribution::MixtureOfCentroids {
            centroids: vec![Centroid {
                mean: DVector::from_element(2, 10.0),
                variance: DVector::from_element(2, 0.01),
                weight: 5,
            }],
        };
        let gaussian = ClassDistribution::GaussianDiagonal {
            mean: DVector::zeros(2),
            variance: DVector::from_element(2, 0.01),
        };
        let d = computer(DistanceStrategy::ClosedForm)
            .distance(&mixture, &gaussian, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap();
        // Squared ground cost between clouds ~200 apart.
        assert!(d > 150.0 && d < 250.0, "d = {d}");
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let a = ClassDistribution::GaussianDiagonal {
            mean: DVector::zeros(2),
            variance: DVector::from_element(2, 1.0),
        };
        let b = ClassDistribution::GaussianDiagonal {
            mean: DVector::zeros(3),
            variance: DVector::from_element(3, 1.0),
        };
        let err = computer(DistanceStrategy::Sampling)
            .distance(&a, &b, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, TransportError::DimensionMismatch { left: 2, right: 3 }));
    }
}
