//! RehearsalSampler: stored class distribution → synthetic labelled rows.

use anamnesis_core::config::RehearsalConfig;
use anamnesis_core::constants::COVARIANCE_REGULARIZER;
use anamnesis_core::errors::RehearsalError;
use anamnesis_core::models::{ClassDistribution, ClassId, SyntheticBatch};
use nalgebra::DMatrix;
use rand::Rng;
use tracing::debug;

use crate::gaussian::GaussianSampler;

/// Draws synthetic features from class distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RehearsalSampler {
    samples_per_class: usize,
}

impl RehearsalSampler {
    pub fn new(config: &RehearsalConfig) -> Self {
        Self {
            samples_per_class: config.samples_per_class(),
        }
    }

    /// The per-class sample unit (`batch_size * multiplier`).
    pub fn samples_per_class(&self) -> usize {
        self.samples_per_class
    }

    /// Draw from `distribution`.
    ///
    /// A Gaussian yields exactly `n` rows. A mixture yields `n` rows per
    /// non-degenerate centroid, each centroid sampled from
    /// N(mean, diag(variance) + 1e-4·I).
    pub fn sample<R: Rng + ?Sized>(
        &self,
        distribution: &ClassDistribution,
        n: usize,
        rng: &mut R,
    ) -> Result<DMatrix<f64>, RehearsalError> {
        match distribution {
            ClassDistribution::GaussianFull { mean, covariance } => {
                Ok(GaussianSampler::new(mean.clone(), covariance)?.sample(n, rng))
            }
            ClassDistribution::GaussianDiagonal { mean, variance } => {
                Ok(GaussianSampler::diagonal(mean.clone(), variance)?.sample(n, rng))
            }
            ClassDistribution::MixtureOfCentroids { centroids } => {
                let mut parts = Vec::with_capacity(centroids.len());
                for (index, centroid) in centroids.iter().enumerate() {
                    if centroid.is_degenerate() {
                        debug!(centroid = index, "degenerate centroid skipped");
                        continue;
                    }
                    let variance = centroid.variance.add_scalar(COVARIANCE_REGULARIZER);
                    parts.push(GaussianSampler::diagonal(centroid.mean.clone(), &variance)?.sample(n, rng));
                }
                if parts.is_empty() {
                    return Err(RehearsalError::NoUsableComponents);
                }
                let dim = parts[0].ncols();
                let mut out = DMatrix::zeros(parts.len() * n, dim);
                for (i, part) in parts.iter().enumerate() {
                    out.rows_mut(i * n, n).copy_from(part);
                }
                Ok(out)
            }
        }
    }

    /// [`sample`](Self::sample) with every row labelled `class`.
    pub fn sample_labeled<R: Rng + ?Sized>(
        &self,
        class: ClassId,
        distribution: &ClassDistribution,
        n: usize,
        rng: &mut R,
    ) -> Result<SyntheticBatch, RehearsalError> {
        Ok(SyntheticBatch::uniform(self.sample(distribution, n, rng)?, class))
    }
}
