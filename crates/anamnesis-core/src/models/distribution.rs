//! Per-class feature distribution summaries.
//!
//! A summary is a snapshot of how one feature extractor saw one class at the
//! end of that class's task. The storage mode is fixed for the whole run and
//! every stage dispatches on the variant instead of re-checking a mode string.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Process-wide storage mode for class distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistributionMode {
    /// Mean + full D×D covariance.
    #[default]
    #[serde(rename = "covariance")]
    FullCovariance,
    /// Mean + length-D variance (diagonal of the regularised covariance).
    #[serde(rename = "variance")]
    DiagonalVariance,
    /// K cluster centroids, each with its own variance vector.
    #[serde(rename = "multi-centroid")]
    MultiCentroid,
}

impl DistributionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullCovariance => "covariance",
            Self::DiagonalVariance => "variance",
            Self::MultiCentroid => "multi-centroid",
        }
    }
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "covariance" => Ok(Self::FullCovariance),
            "variance" => Ok(Self::DiagonalVariance),
            "multi-centroid" => Ok(Self::MultiCentroid),
            other => Err(ConfigError::UnsupportedMode {
                kind: "distribution mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// One cluster of a multi-centroid class summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub mean: DVector<f64>,
    /// Population variance of the cluster members. Not regularised.
    pub variance: DVector<f64>,
    /// Number of pooled samples assigned to the cluster.
    pub weight: usize,
}

impl Centroid {
    /// A cluster whose mean variance is exactly zero carries no spread and is
    /// skipped by sampling and distance computation.
    pub fn is_degenerate(&self) -> bool {
        if self.variance.is_empty() {
            return true;
        }
        self.variance.iter().sum::<f64>() / self.variance.len() as f64 == 0.0
    }
}

/// Summary of one class's feature distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassDistribution {
    GaussianFull {
        mean: DVector<f64>,
        covariance: DMatrix<f64>,
    },
    GaussianDiagonal {
        mean: DVector<f64>,
        variance: DVector<f64>,
    },
    MixtureOfCentroids {
        centroids: Vec<Centroid>,
    },
}

impl ClassDistribution {
    pub fn mode(&self) -> DistributionMode {
        match self {
            Self::GaussianFull { .. } => DistributionMode::FullCovariance,
            Self::GaussianDiagonal { .. } => DistributionMode::DiagonalVariance,
            Self::MixtureOfCentroids { .. } => DistributionMode::MultiCentroid,
        }
    }

    /// Feature dimensionality D. Zero for an empty mixture.
    pub fn dim(&self) -> usize {
        match self {
            Self::GaussianFull { mean, .. } | Self::GaussianDiagonal { mean, .. } => mean.len(),
            Self::MixtureOfCentroids { centroids } => {
                centroids.first().map(|c| c.mean.len()).unwrap_or(0)
            }
        }
    }

    /// All component means: one for a Gaussian, one per centroid for a mixture
    /// (degenerate centroids included).
    pub fn means(&self) -> Vec<&DVector<f64>> {
        match self {
            Self::GaussianFull { mean, .. } | Self::GaussianDiagonal { mean, .. } => vec![mean],
            Self::MixtureOfCentroids { centroids } => centroids.iter().map(|c| &c.mean).collect(),
        }
    }

    /// Number of components that sampling will draw from.
    pub fn usable_components(&self) -> usize {
        match self {
            Self::GaussianFull { .. } | Self::GaussianDiagonal { .. } => 1,
            Self::MixtureOfCentroids { centroids } => {
                centroids.iter().filter(|c| !c.is_degenerate()).count()
            }
        }
    }
}
