use std::collections::BTreeMap;

use anamnesis_core::config::DensityConfig;
use anamnesis_core::errors::AnamnesisError;
use anamnesis_core::models::{ClassDistribution, DistributionMode};
use anamnesis_core::traits::Collective;
use anamnesis_density::{DensityEstimator, LocalCollective, WorkerGroup};
use approx::assert_abs_diff_eq;
use nalgebra::{DMatrix, SymmetricEigen};
use proptest::prelude::*;
use test_fixtures::{gaussian_cloud, TableExtractor};

fn estimator(mode: DistributionMode) -> DensityEstimator {
    DensityEstimator::new(
        DensityConfig {
            mode,
            n_centroids: 3,
            ..DensityConfig::default()
        },
        42,
    )
}

/// 100 four-dimensional rows with mean 1 and unit spread per dimension:
/// each coordinate is 1 ± 1, the sign pattern taken from the row index bits.
fn balanced_unit_rows() -> DMatrix<f64> {
    DMatrix::from_fn(100, 4, |r, c| if (r >> c) & 1 == 0 { 2.0 } else { 0.0 })
}

#[test]
fn hundred_samples_recover_mean_and_unit_variance() {
    let dist = estimator(DistributionMode::FullCovariance)
        .summarize(0, &balanced_unit_rows())
        .unwrap();
    assert_mean_and_unit_diagonal(&dist, 0.3);
}

#[test]
fn large_gaussian_sample_recovers_moments() {
    let features = gaussian_cloud(&[1.0, 1.0, 1.0, 1.0], 1.0, 2000, 2024);
    let dist = estimator(DistributionMode::FullCovariance)
        .summarize(0, &features)
        .unwrap();
    assert_mean_and_unit_diagonal(&dist, 0.3);
}

fn assert_mean_and_unit_diagonal(dist: &ClassDistribution, tol: f64) {
    match dist {
        ClassDistribution::GaussianFull { mean, covariance } => {
            for i in 0..4 {
                assert!((mean[i] - 1.0).abs() < tol, "mean[{i}] = {}", mean[i]);
                assert!(
                    (covariance[(i, i)] - (1.0 + 1e-4)).abs() < tol,
                    "cov[{i},{i}] = {}",
                    covariance[(i, i)]
                );
            }
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn estimate_goes_through_extractor_and_collective() {
    let class0 = gaussian_cloud(&[0.0, 0.0], 0.5, 20, 1);
    let class1 = gaussian_cloud(&[5.0, 5.0], 0.5, 20, 2);
    let mut table = DMatrix::zeros(40, 2);
    table.rows_mut(0, 20).copy_from(&class0);
    table.rows_mut(20, 20).copy_from(&class1);
    let extractor = TableExtractor::new(table, 2);

    let mut examples = BTreeMap::new();
    examples.insert(1, vec![(20..30).collect::<Vec<_>>(), (30..40).collect()]);
    examples.insert(0, vec![(0..20).collect()]);

    let out = estimator(DistributionMode::DiagonalVariance)
        .estimate(&extractor, &LocalCollective, 0, &examples)
        .unwrap();
    assert_eq!(out.iter().map(|(c, _)| *c).collect::<Vec<_>>(), vec![0, 1]);
    let expected = estimator(DistributionMode::DiagonalVariance)
        .summarize(1, &class1)
        .unwrap();
    let (_, got) = &out[1];
    match (got, &expected) {
        (
            ClassDistribution::GaussianDiagonal { mean: a, variance: va },
            ClassDistribution::GaussianDiagonal { mean: b, variance: vb },
        ) => {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
            assert_abs_diff_eq!(va, vb, epsilon = 1e-12);
        }
        _ => panic!("unexpected variants"),
    }
}

#[test]
fn empty_mapping_is_rejected() {
    let extractor = TableExtractor::new(DMatrix::zeros(1, 2), 2);
    let examples: BTreeMap<usize, Vec<Vec<usize>>> = BTreeMap::new();
    let err = estimator(DistributionMode::FullCovariance)
        .estimate(&extractor, &LocalCollective, 3, &examples)
        .unwrap_err();
    assert!(matches!(err, AnamnesisError::Density(_)));
}

#[test]
fn workers_with_disjoint_shards_agree_bit_for_bit() {
    let table = gaussian_cloud(&[2.0, -1.0, 0.5], 1.0, 60, 9);
    let extractor = TableExtractor::new(table, 1);
    let handles = WorkerGroup::spawn_handles(3);
    let est = estimator(DistributionMode::MultiCentroid);

    let results: Vec<Vec<(usize, ClassDistribution)>> = std::thread::scope(|s| {
        let joins: Vec<_> = handles
            .iter()
            .map(|h| {
                let extractor = &extractor;
                let est = &est;
                s.spawn(move || {
                    let shard: Vec<usize> = (h.rank() * 20..(h.rank() + 1) * 20).collect();
                    let mut examples = BTreeMap::new();
                    examples.insert(0usize, vec![shard]);
                    est.estimate(extractor, h, 0, &examples).unwrap()
                })
            })
            .collect();
        joins.into_iter().map(|j| j.join().unwrap()).collect()
    });

    for r in &results[1..] {
        assert_eq!(r, &results[0]);
    }
    // Pooled over all shards: total cluster weight is every row.
    match &results[0][0].1 {
        ClassDistribution::MixtureOfCentroids { centroids } => {
            assert_eq!(centroids.iter().map(|c| c.weight).sum::<usize>(), 60);
        }
        other => panic!("unexpected {other:?}"),
    }
}

proptest! {
    #[test]
    fn regularized_covariance_floor(
        seed in 0u64..500,
        n in 1usize..12,
        scale in 0.0f64..3.0,
    ) {
        let features = gaussian_cloud(&[0.0, 0.0, 0.0], scale, n, seed);
        let dist = estimator(DistributionMode::FullCovariance).summarize(0, &features).unwrap();
        if let ClassDistribution::GaussianFull { covariance, .. } = dist {
            let eig = SymmetricEigen::new(covariance);
            let min = eig.eigenvalues.iter().cloned().fold(f64::INFINITY, f64::min);
            prop_assert!(min >= 1e-4 - 1e-10, "min eigenvalue {}", min);
        } else {
            prop_assert!(false);
        }
    }

    #[test]
    fn diagonal_floor(seed in 0u64..500, n in 1usize..8) {
        let features = gaussian_cloud(&[1.0, -1.0], 0.0, n, seed);
        let dist = estimator(DistributionMode::DiagonalVariance).summarize(0, &features).unwrap();
        if let ClassDistribution::GaussianDiagonal { variance, .. } = dist {
            prop_assert!(variance.iter().all(|v| *v >= 1e-4 - 1e-15));
        } else {
            prop_assert!(false);
        }
    }
}

#[test]
fn local_collective_is_single_worker() {
    assert_eq!(LocalCollective.world_size(), 1);
    assert_eq!(LocalCollective.rank(), 0);
}
