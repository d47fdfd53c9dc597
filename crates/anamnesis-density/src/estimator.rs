//! DensityEstimator: pooled per-class features → `ClassDistribution`.

use std::collections::BTreeMap;

use anamnesis_core::config::DensityConfig;
use anamnesis_core::constants::COVARIANCE_REGULARIZER;
use anamnesis_core::errors::{AnamnesisResult, DensityError};
use anamnesis_core::models::{Centroid, ClassDistribution, ClassId, DistributionMode, TaskId};
use anamnesis_core::traits::{Collective, FeatureExtractor};
use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::collective::concat_rows;
use crate::kmeans::KMeans;
use crate::statistics;

/// Collects feature statistics for the classes of one task.
#[derive(Debug, Clone)]
pub struct DensityEstimator {
    config: DensityConfig,
    seed: u64,
}

impl DensityEstimator {
    /// `seed` drives clustering; combined with the class id so each class
    /// clusters independently and identically on every worker.
    pub fn new(config: DensityConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn mode(&self) -> DistributionMode {
        self.config.mode
    }

    /// Run every class's examples through `extractor`, pool the resulting
    /// `pre_logits` across workers, and summarise each class.
    ///
    /// Returns `(class, distribution)` pairs in ascending class order. Every
    /// worker must call this with the same class set.
    pub fn estimate<E: FeatureExtractor>(
        &self,
        extractor: &E,
        collective: &dyn Collective,
        task: TaskId,
        class_examples: &BTreeMap<ClassId, Vec<E::Input>>,
    ) -> AnamnesisResult<Vec<(ClassId, ClassDistribution)>> {
        if class_examples.is_empty() {
            return Err(DensityError::NoClasses { task }.into());
        }
        let dim = extractor.feature_dim();
        let mut out = Vec::with_capacity(class_examples.len());

        for (&class, batches) in class_examples {
            let mut local_parts = Vec::with_capacity(batches.len());
            for batch in batches {
                let output = extractor.extract(batch, Some(task))?;
                if output.pre_logits.nrows() > 0 && output.pre_logits.ncols() != dim {
                    return Err(DensityError::DimensionMismatch {
                        expected: dim,
                        actual: output.pre_logits.ncols(),
                    }
                    .into());
                }
                local_parts.push(output.pre_logits);
            }
            let local = if local_parts.is_empty() {
                DMatrix::zeros(0, dim)
            } else {
                concat_rows(&local_parts)?
            };

            collective.barrier()?;
            let gathered = collective.all_gather(&local)?;
            let pooled = concat_rows(&gathered)?;

            let distribution = self.summarize(class, &pooled)?;
            debug!(
                class,
                task,
                samples = pooled.nrows(),
                rank = collective.rank(),
                mode = %self.config.mode,
                "class distribution estimated"
            );
            out.push((class, distribution));
        }

        info!(task, classes = out.len(), mode = %self.config.mode, "density estimation complete");
        Ok(out)
    }

    /// Summarise one class's pooled N×D features in the configured mode.
    pub fn summarize(
        &self,
        class: ClassId,
        features: &DMatrix<f64>,
    ) -> Result<ClassDistribution, DensityError> {
        if features.nrows() == 0 {
            return Err(DensityError::EmptyClass { class });
        }
        let mean = statistics::mean(features);

        match self.config.mode {
            DistributionMode::FullCovariance => {
                let covariance = statistics::covariance(features, &mean);
                Ok(ClassDistribution::GaussianFull {
                    mean,
                    covariance: statistics::regularize(&covariance, COVARIANCE_REGULARIZER),
                })
            }
            DistributionMode::DiagonalVariance => {
                let covariance = statistics::covariance(features, &mean);
                let regularized = statistics::regularize(&covariance, COVARIANCE_REGULARIZER);
                Ok(ClassDistribution::GaussianDiagonal {
                    mean,
                    variance: regularized.diagonal(),
                })
            }
            DistributionMode::MultiCentroid => {
                let kmeans = KMeans {
                    k: self.config.n_centroids,
                    max_iterations: self.config.kmeans_max_iterations,
                    tolerance: self.config.kmeans_tolerance,
                    seed: self.seed.wrapping_add(class as u64),
                };
                let clustering = kmeans.fit(features);
                if clustering.centroids.is_empty() {
                    return Err(DensityError::ClusteringFailed {
                        class,
                        reason: "no clusters produced".to_string(),
                    });
                }
                let centroids = clustering
                    .centroids
                    .iter()
                    .enumerate()
                    .map(|(c, centre)| {
                        let members = clustering.members(features, c);
                        let cluster_mean = if members.nrows() > 0 {
                            statistics::mean(&members)
                        } else {
                            centre.clone()
                        };
                        Centroid {
                            variance: statistics::population_variance(&members, &cluster_mean),
                            mean: cluster_mean,
                            weight: members.nrows(),
                        }
                    })
                    .collect();
                Ok(ClassDistribution::MixtureOfCentroids { centroids })
            }
        }
    }
}
