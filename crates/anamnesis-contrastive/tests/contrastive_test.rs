use anamnesis_contrastive::{
    global_loss, supervised_contrastive, taxonomy_scoped_loss, ClassWeights, ContrastiveObjective,
};
use anamnesis_core::config::ContrastiveConfig;
use anamnesis_core::errors::ContrastiveError;
use anamnesis_core::models::{StaticTaxonomy, SyntheticBatch};
use anamnesis_rehearsal::{stage_rng, RehearsalBuffer};
use anamnesis_transport::DistanceMatrix;
use nalgebra::DMatrix;
use proptest::prelude::*;
use test_fixtures::load_fixture;

fn clustered_batch() -> DMatrix<f64> {
    DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 0.9, 0.1, 0.0, 1.0, 0.1, 0.9])
}

#[test]
fn grouped_labels_cost_less_than_interleaved() {
    let features = clustered_batch();
    let uniform = ClassWeights::uniform(2);
    let grouped = supervised_contrastive(&features, &[0, 0, 1, 1], 0.1, Some(&uniform)).unwrap();
    let interleaved = supervised_contrastive(&features, &[0, 1, 0, 1], 0.1, Some(&uniform)).unwrap();
    assert!(grouped.loss < interleaved.loss);
}

#[test]
fn uniform_weights_equal_no_weights() {
    let features = clustered_batch();
    let a = supervised_contrastive(&features, &[0, 0, 1, 1], 0.1, Some(&ClassWeights::uniform(2))).unwrap();
    let b = global_loss(&features, &[0, 0, 1, 1], 0.1).unwrap();
    assert!((a.loss - b.loss).abs() < 1e-12);
}

#[test]
fn distance_weights_change_the_loss() {
    let mut matrix = DistanceMatrix::new(2);
    matrix.set(0, 1, 3.0).unwrap();
    let weights = ClassWeights::from_distances(&matrix, 1.0);
    let features = clustered_batch();
    let weighted = supervised_contrastive(&features, &[0, 0, 1, 1], 0.1, Some(&weights)).unwrap();
    let plain = global_loss(&features, &[0, 0, 1, 1], 0.1).unwrap();
    assert!((weighted.loss - plain.loss).abs() > 1e-9);
}

#[test]
fn objective_uses_taxonomy_level_for_task() {
    let taxonomy: StaticTaxonomy = load_fixture("taxonomy/two_level.json");
    let objective =
        ContrastiveObjective::for_task(ContrastiveConfig::default(), None, &taxonomy, 1).unwrap();
    assert_eq!(objective.groups().len(), 3);

    let err = ContrastiveObjective::for_task(ContrastiveConfig::default(), None, &taxonomy, 5)
        .unwrap_err();
    assert!(matches!(err, ContrastiveError::MissingTaxonomy { task: 5 }));
}

#[test]
fn objective_combines_global_and_scoped_terms() {
    let config = ContrastiveConfig {
        reg_glob: 0.3,
        reg_sub: 0.7,
        ..ContrastiveConfig::default()
    };
    let groups = vec![vec![0, 1]];
    let objective = ContrastiveObjective::new(config, None, groups.clone().into());
    let features = clustered_batch();
    let labels = [0, 0, 1, 1];
    let combined = objective.loss(&features, &labels, None).unwrap();
    let global = global_loss(&features, &labels, 0.1).unwrap();
    let scoped = taxonomy_scoped_loss(&features, &labels, &groups.into(), 0.1, None).unwrap();
    assert!((combined.loss - (0.3 * global.loss + 0.7 * scoped.loss)).abs() < 1e-12);
}

#[test]
fn replay_rows_join_the_batch() {
    let objective =
        ContrastiveObjective::new(ContrastiveConfig::default(), None, vec![vec![0, 1]].into());
    let features = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
    // Alone the minibatch has no positive pair.
    let alone = objective.loss(&features, &[0, 1], None).unwrap();
    assert_eq!(alone.loss, 0.0);

    let buffer = RehearsalBuffer::new(SyntheticBatch::new(
        DMatrix::from_row_slice(2, 2, &[0.9, 0.1, 0.1, 0.9]),
        vec![0, 1],
    ));
    let mut rng = stage_rng(0, &[]);
    let replayed = objective
        .loss_with_replay(&features, &[0, 1], &buffer, 2, &mut rng)
        .unwrap();
    assert!(replayed.loss > 0.0);
    assert!(replayed.grad.iter().any(|g| *g != 0.0));
}

proptest! {
    #[test]
    fn loss_is_non_negative(
        values in prop::collection::vec(-3.0f64..3.0, 24),
        labels in prop::collection::vec(0usize..3, 8),
        temperature in 0.05f64..2.0,
    ) {
        let features = DMatrix::from_row_slice(8, 3, &values);
        let out = supervised_contrastive(&features, &labels, temperature, None).unwrap();
        prop_assert!(out.loss >= 0.0);
        prop_assert!(out.loss.is_finite());
    }

    #[test]
    fn distinct_labels_give_zero(values in prop::collection::vec(-3.0f64..3.0, 15)) {
        let features = DMatrix::from_row_slice(5, 3, &values);
        let out = supervised_contrastive(&features, &[0, 1, 2, 3, 4], 0.1, None).unwrap();
        prop_assert_eq!(out.loss, 0.0);
    }
}
