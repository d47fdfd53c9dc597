use anamnesis_core::config::{DistanceStrategy, GroundCost, RehearsalConfig, TransportConfig};
use anamnesis_core::models::{Centroid, ClassDistribution, DistributionStore};
use anamnesis_rehearsal::{stage_rng, RehearsalSampler};
use anamnesis_transport::{DistanceComputer, DistanceMatrix};
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;
use rand::Rng;

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

fn diagonal(mean: f64, variance: f64, dim: usize) -> ClassDistribution {
    ClassDistribution::GaussianDiagonal {
        mean: DVector::from_element(dim, mean),
        variance: DVector::from_element(dim, variance),
    }
}

#[test]
fn identical_unit_gaussians_have_zero_closed_form_distance() {
    let mut store = DistributionStore::new();
    store.insert(0, diagonal(0.0, 1.0, 4));
    store.insert(1, diagonal(0.0, 1.0, 4));
    let mut matrix = DistanceMatrix::new(2);
    matrix
        .fill(&store, &computer(DistanceStrategy::ClosedForm), 0)
        .unwrap();
    let d = matrix.get(0, 1).unwrap();
    assert!(d.abs() < 1e-5, "d = {d}");
    // The zero is recorded as present.
    assert!(matrix.is_set(0, 1));
}

#[test]
fn second_fill_leaves_matrix_byte_identical() {
    let mut store = DistributionStore::new();
    store.insert(0, diagonal(0.0, 1.0, 3));
    store.insert(1, diagonal(2.0, 0.5, 3));
    let computer = computer(DistanceStrategy::Sampling);

    let mut matrix = DistanceMatrix::new(4);
    let first = matrix.fill(&store, &computer, 17).unwrap();
    assert_eq!(first.computed, 1);
    let d01 = matrix.get(0, 1).unwrap();
    assert_eq!(Some(d01), matrix.get(1, 0));
    assert!(d01 > 0.0);

    let snapshot = serde_json::to_vec(&matrix).unwrap();
    let second = matrix.fill(&store, &computer, 17).unwrap();
    assert_eq!(second.computed, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(serde_json::to_vec(&matrix).unwrap(), snapshot);
}

#[test]
fn incremental_fill_only_computes_new_pairs() {
    let mut store = DistributionStore::new();
    store.insert(0, diagonal(0.0, 1.0, 2));
    store.insert(1, diagonal(1.0, 1.0, 2));
    let computer = computer(DistanceStrategy::ClosedForm);
    let mut matrix = DistanceMatrix::new(3);
    matrix.fill(&store, &computer, 0).unwrap();
    let before = matrix.get(0, 1);

    store.insert(
        2,
        ClassDistribution::MixtureOfCentroids {
            centroids: vec![Centroid {
                mean: DVector::from_element(2, 5.0),
                variance: DVector::from_element(2, 0.2),
                weight: 3,
            }],
        },
    );
    let report = matrix.fill(&store, &computer, 0).unwrap();
    assert_eq!(report.computed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(matrix.get(0, 1), before);
    assert!(matrix.get(2, 0).unwrap() > matrix.get(1, 0).unwrap());
    assert_eq!(matrix.computed_pairs(), 3);
}

#[test]
fn fill_is_independent_of_thread_scheduling() {
    let mut store = DistributionStore::new();
    for class in 0..5 {
        store.insert(class, diagonal(class as f64, 0.3, 2));
    }
    let computer = computer(DistanceStrategy::Sampling);
    let mut a = DistanceMatrix::new(5);
    let mut b = DistanceMatrix::new(5);
    a.fill(&store, &computer, 99).unwrap();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    pool.install(|| b.fill(&store, &computer, 99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn class_beyond_matrix_is_rejected() {
    let mut store = DistributionStore::new();
    store.insert(7, diagonal(0.0, 1.0, 2));
    let mut matrix = DistanceMatrix::new(3);
    assert!(matrix
        .fill(&store, &computer(DistanceStrategy::Sampling), 0)
        .is_err());
}

fn full_gaussian(seed: u64, dim: usize) -> ClassDistribution {
    let mut rng = stage_rng(seed, &[]);
    let a = DMatrix::from_fn(dim, dim, |_, _| rng.gen_range(-1.0..1.0));
    ClassDistribution::GaussianFull {
        mean: DVector::from_fn(dim, |_, _| rng.gen_range(-2.0..2.0)),
        covariance: &a * a.transpose() + DMatrix::identity(dim, dim) * 1e-4,
    }
}

proptest! {
    #[test]
    fn matrix_is_exactly_symmetric(seeds in prop::collection::vec(any::<u64>(), 2..5), dim in 1usize..4) {
        let mut store = DistributionStore::new();
        for (class, seed) in seeds.iter().enumerate() {
            store.insert(class, full_gaussian(*seed, dim));
        }
        let mut matrix = DistanceMatrix::new(seeds.len());
        matrix.fill(&store, &computer(DistanceStrategy::ClosedForm), 0).unwrap();
        for i in 0..seeds.len() {
            for j in 0..seeds.len() {
                prop_assert_eq!(matrix.get(i, j), matrix.get(j, i));
                prop_assert!(matrix.get(i, j).unwrap() >= 0.0);
            }
        }
    }

    #[test]
    fn closed_form_distance_is_symmetric_in_arguments(s1 in any::<u64>(), s2 in any::<u64>()) {
        let computer = computer(DistanceStrategy::ClosedForm);
        let (a, b) = (full_gaussian(s1, 3), full_gaussian(s2, 3));
        let mut rng = stage_rng(0, &[]);
        let ab = computer.distance(&a, &b, &mut rng).unwrap();
        let ba = computer.distance(&b, &a, &mut rng).unwrap();
        prop_assert!((ab - ba).abs() < 1e-6 * (1.0 + ab));
    }
}
