//! Multivariate normal sampling.

use anamnesis_core::errors::RehearsalError;
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

/// N(mean, LLᵀ) sampler holding the lower Cholesky factor `L`.
#[derive(Debug, Clone)]
pub struct GaussianSampler {
    mean: DVector<f64>,
    factor: DMatrix<f64>,
}

impl GaussianSampler {
    /// Full covariance. Fails if `covariance` is not positive definite.
    pub fn new(mean: DVector<f64>, covariance: &DMatrix<f64>) -> Result<Self, RehearsalError> {
        let d = mean.len();
        if covariance.shape() != (d, d) {
            return Err(RehearsalError::DimensionMismatch {
                mean: d,
                spread: covariance.nrows(),
            });
        }
        let chol = Cholesky::new(covariance.clone())
            .ok_or(RehearsalError::NotPositiveDefinite { dim: d })?;
        Ok(Self {
            mean,
            factor: chol.l(),
        })
    }

    /// Diagonal covariance given as a variance vector.
    pub fn diagonal(mean: DVector<f64>, variance: &DVector<f64>) -> Result<Self, RehearsalError> {
        let d = mean.len();
        if variance.len() != d {
            return Err(RehearsalError::DimensionMismatch {
                mean: d,
                spread: variance.len(),
            });
        }
        if variance.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(RehearsalError::NotPositiveDefinite { dim: d });
        }
        Ok(Self {
            mean,
            factor: DMatrix::from_diagonal(&variance.map(f64::sqrt)),
        })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Draw `n` rows.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> DMatrix<f64> {
        let d = self.dim();
        let z: DMatrix<f64> = DMatrix::from_fn(n, d, |_, _| rng.sample(StandardNormal));
        let mut out = z * self.factor.transpose();
        for mut row in out.row_iter_mut() {
            row += self.mean.transpose();
        }
        out
    }
}
