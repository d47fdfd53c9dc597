use anamnesis_core::config::RehearsalConfig;
use anamnesis_core::models::{Centroid, ClassDistribution};
use anamnesis_rehearsal::{stage_rng, RehearsalSampler};
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;

fn sampler() -> RehearsalSampler {
    RehearsalSampler::new(&RehearsalConfig::default())
}

fn mixture(k: usize, dim: usize, degenerate: usize) -> ClassDistribution {
    let centroids = (0..k)
        .map(|i| Centroid {
            mean: DVector::from_element(dim, i as f64),
            variance: if i < degenerate {
                DVector::zeros(dim)
            } else {
                DVector::from_element(dim, 0.5)
            },
            weight: 4,
        })
        .collect();
    ClassDistribution::MixtureOfCentroids { centroids }
}

proptest! {
    #[test]
    fn gaussian_yields_exactly_n_rows(n in 0usize..200, dim in 1usize..8, seed in any::<u64>()) {
        let dist = ClassDistribution::GaussianFull {
            mean: DVector::zeros(dim),
            covariance: DMatrix::identity(dim, dim) * 2.0,
        };
        let x = sampler().sample(&dist, n, &mut stage_rng(seed, &[0])).unwrap();
        prop_assert_eq!(x.shape(), (n, dim));
    }

    #[test]
    fn mixture_yields_k_times_n_rows(k in 1usize..6, n in 1usize..50, dim in 1usize..5) {
        let x = sampler().sample(&mixture(k, dim, 0), n, &mut stage_rng(3, &[k as u64])).unwrap();
        prop_assert_eq!(x.shape(), (k * n, dim));
    }

    #[test]
    fn degenerate_centroids_are_skipped(k in 2usize..6, n in 1usize..20) {
        let x = sampler().sample(&mixture(k, 3, 1), n, &mut stage_rng(3, &[])).unwrap();
        prop_assert_eq!(x.nrows(), (k - 1) * n);
    }
}

#[test]
fn same_stage_key_same_samples() {
    let dist = mixture(3, 2, 0);
    let a = sampler().sample(&dist, 10, &mut stage_rng(42, &[1, 2])).unwrap();
    let b = sampler().sample(&dist, 10, &mut stage_rng(42, &[1, 2])).unwrap();
    let c = sampler().sample(&dist, 10, &mut stage_rng(42, &[1, 3])).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn mixture_rows_are_grouped_by_centroid() {
    let dist = ClassDistribution::MixtureOfCentroids {
        centroids: vec![
            Centroid {
                mean: DVector::from_element(2, -100.0),
                variance: DVector::from_element(2, 0.01),
                weight: 1,
            },
            Centroid {
                mean: DVector::from_element(2, 100.0),
                variance: DVector::from_element(2, 0.01),
                weight: 1,
            },
        ],
    };
    let x = sampler().sample(&dist, 5, &mut stage_rng(0, &[])).unwrap();
    for r in 0..5 {
        assert!(x[(r, 0)] < 0.0);
        assert!(x[(r + 5, 0)] > 0.0);
    }
}
