//! Evaluation-time scoring against stored class distributions.
//!
//! Mahalanobis distances to every class are turned into per-group energies
//! that re-weight the head's logits. Taxonomy groups whose nearest class is
//! close in feature space keep their logits; distant groups are damped.

use anamnesis_core::constants::UNKNOWN_CLASS_DISTANCE;
use anamnesis_core::errors::CalibrationError;
use anamnesis_core::models::{ClassDistribution, DistributionStore, TaxonomyGroups};
use anamnesis_contrastive::ClassWeights;
use nalgebra::{DMatrix, DVector};
use tracing::warn;

/// N×`num_classes` Mahalanobis distances from each feature row to each
/// stored class.
///
/// Full covariance uses `(Σ + jitter·I)⁻¹`; diagonal and mixture summaries
/// use their variance as a diagonal covariance, and a mixture takes the
/// minimum over its centroids. Classes without a distribution score
/// [`UNKNOWN_CLASS_DISTANCE`].
pub fn mahalanobis_scores(
    features: &DMatrix<f64>,
    store: &DistributionStore,
    num_classes: usize,
    jitter: f64,
) -> Result<DMatrix<f64>, CalibrationError> {
    let (n, d) = features.shape();
    let mut out = DMatrix::from_element(n, num_classes, UNKNOWN_CLASS_DISTANCE);

    for (class, distribution) in store.iter().filter(|(c, _)| *c < num_classes) {
        if distribution.dim() != d {
            return Err(CalibrationError::DimensionMismatch {
                expected: distribution.dim(),
                actual: d,
            });
        }
        let components: Vec<(&DVector<f64>, DMatrix<f64>)> = match distribution {
            ClassDistribution::GaussianFull { mean, covariance } => vec![(mean, covariance.clone())],
            ClassDistribution::GaussianDiagonal { mean, variance } => {
                vec![(mean, DMatrix::from_diagonal(variance))]
            }
            ClassDistribution::MixtureOfCentroids { centroids } => centroids
                .iter()
                .map(|c| (&c.mean, DMatrix::from_diagonal(&c.variance)))
                .collect(),
        };

        for (mean, covariance) in components {
            let precision = match precision(&covariance, jitter) {
                Some(p) => p,
                None => {
                    warn!(class, "covariance not invertible, class left unscored");
                    continue;
                }
            };
            for r in 0..n {
                let diff = features.row(r).transpose() - mean;
                let squared = (diff.transpose() * &precision * &diff)[(0, 0)];
                let distance = squared.max(0.0).sqrt();
                if distance < out[(r, class)] {
                    out[(r, class)] = distance;
                }
            }
        }
    }
    Ok(out)
}

fn precision(covariance: &DMatrix<f64>, jitter: f64) -> Option<DMatrix<f64>> {
    let d = covariance.nrows();
    let regularized = covariance + DMatrix::identity(d, d) * jitter;
    match regularized.clone().cholesky() {
        Some(chol) => Some(chol.inverse()),
        None => regularized.try_inverse(),
    }
}

/// Re-weight `logits` by taxonomy-group energies.
///
/// For each row and group `g`: take the group's highest-logit class `k`,
/// its weighted distance `d_g = Σ_{c∈g} w[k, c] · dist[c]`, and the energy
/// `E_g = exp(eta0 · logit[k] − eta · d_g)`. Logits of `g` are multiplied
/// by `E_g / Σ E`. Classes outside every group become −∞.
pub fn taxonomy_energy_rescore(
    distances: &DMatrix<f64>,
    logits: &DMatrix<f64>,
    groups: &TaxonomyGroups,
    weights: &ClassWeights,
    eta0: f64,
    eta: f64,
) -> Result<DMatrix<f64>, CalibrationError> {
    if distances.shape() != logits.shape() {
        return Err(CalibrationError::HeadShapeMismatch {
            expected: format!("{}x{}", distances.nrows(), distances.ncols()),
            actual: format!("{}x{}", logits.nrows(), logits.ncols()),
        });
    }
    let (n, c) = logits.shape();
    let mut out = DMatrix::from_element(n, c, f64::NEG_INFINITY);
    let groups: Vec<Vec<usize>> = groups
        .iter()
        .map(|g| g.iter().copied().filter(|&k| k < c).collect::<Vec<_>>())
        .filter(|g| !g.is_empty())
        .collect();
    if groups.is_empty() {
        return Ok(out);
    }

    for r in 0..n {
        let log_energy: Vec<f64> = groups
            .iter()
            .map(|group| {
                let (nearest, top) = group
                    .iter()
                    .map(|&k| (k, logits[(r, k)]))
                    .fold((group[0], f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });
                let spread: f64 = group
                    .iter()
                    .map(|&k| weight_or_one(weights, nearest, k) * distances[(r, k)])
                    .sum();
                eta0 * top - eta * spread
            })
            .collect();
        let max = log_energy.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let normalizer: f64 = log_energy.iter().map(|e| (e - max).exp()).sum();
        for (group, e) in groups.iter().zip(&log_energy) {
            let share = if max.is_finite() {
                (e - max).exp() / normalizer
            } else {
                1.0 / groups.len() as f64
            };
            for &k in group {
                out[(r, k)] = logits[(r, k)] * share;
            }
        }
    }
    Ok(out)
}

fn weight_or_one(weights: &ClassWeights, a: usize, b: usize) -> f64 {
    if a < weights.size() && b < weights.size() {
        weights.weight(a, b)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anamnesis_core::models::Centroid;
    use approx::assert_relative_eq;

    #[test]
    fn identity_covariance_is_euclidean() {
        let mut store = DistributionStore::new();
        store.insert(
            0,
            ClassDistribution::GaussianFull {
                mean: DVector::zeros(2),
                covariance: DMatrix::identity(2, 2),
            },
        );
        let x = DMatrix::from_row_slice(1, 2, &[3.0, 4.0]);
        let scores = mahalanobis_scores(&x, &store, 2, 0.0).unwrap();
        assert_relative_eq!(scores[(0, 0)], 5.0, epsilon = 1e-9);
        assert_eq!(scores[(0, 1)], UNKNOWN_CLASS_DISTANCE);
    }

    #[test]
    fn mixture_takes_nearest_centroid() {
        let mut store = DistributionStore::new();
        store.insert(
            0,
            ClassDistribution::MixtureOfCentroids {
                centroids: vec![
                    Centroid { mean: DVector::from_vec(vec![10.0, 0.0]), variance: DVector::from_element(2, 1.0), weight: 5 },
                    Centroid { mean: DVector::from_vec(vec![0.0, 1.0]), variance: DVector::from_element(2, 4.0), weight: 5 },
                ],
            },
        );
        let scores = mahalanobis_scores(&DMatrix::from_row_slice(1, 2, &[0.0, 3.0]), &store, 1, 0.0).unwrap();
        assert_relative_eq!(scores[(0, 0)], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let mut store = DistributionStore::new();
        store.insert(
            0,
            ClassDistribution::GaussianDiagonal {
                mean: DVector::zeros(3),
                variance: DVector::from_element(3, 1.0),
            },
        );
        let err = mahalanobis_scores(&DMatrix::zeros(1, 2), &store, 1, 1e-6).unwrap_err();
        assert!(matches!(err, CalibrationError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn distant_group_is_damped() {
        let logits = DMatrix::from_row_slice(1, 5, &[2.0, 1.0, 2.0, 1.0, 9.0]);
        let distances = DMatrix::from_row_slice(1, 5, &[0.1, 0.2, 5.0, 6.0, 0.0]);
        let groups: TaxonomyGroups = vec![vec![0, 1], vec![2, 3]].into();
        let out = taxonomy_energy_rescore(&distances, &logits, &groups, &ClassWeights::uniform(5), 1.0, 1.0)
            .unwrap();
        assert!(out[(0, 0)] > out[(0, 2)]);
        assert_eq!(out[(0, 4)], f64::NEG_INFINITY);
        let share_a = out[(0, 0)] / logits[(0, 0)];
        let share_b = out[(0, 2)] / logits[(0, 2)];
        assert_relative_eq!(share_a + share_b, 1.0, epsilon = 1e-12);
    }
}
