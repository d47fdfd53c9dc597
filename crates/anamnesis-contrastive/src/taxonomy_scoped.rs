//! Taxonomy-scoped contrastive loss.

use anamnesis_core::errors::ContrastiveError;
use anamnesis_core::models::{ClassId, TaxonomyGroups};
use nalgebra::DMatrix;

use crate::supcon::{supervised_contrastive, ContrastiveOutput};
use crate::weights::ClassWeights;

/// Base loss computed within each taxonomy group, averaged over the groups
/// that have at least one batch member.
///
/// Rows whose label belongs to several groups contribute to each of them.
/// With no populated group the loss is zero.
pub fn taxonomy_scoped_loss(
    features: &DMatrix<f64>,
    labels: &[ClassId],
    groups: &TaxonomyGroups,
    temperature: f64,
    weights: Option<&ClassWeights>,
) -> Result<ContrastiveOutput, ContrastiveError> {
    let (n, d) = features.shape();
    if labels.len() != n {
        return Err(ContrastiveError::BatchMismatch {
            features: n,
            labels: labels.len(),
        });
    }

    let mut total = ContrastiveOutput::zero(n, d);
    let mut populated = 0usize;
    for group in groups.iter() {
        let rows: Vec<usize> = (0..n).filter(|&r| group.contains(&labels[r])).collect();
        if rows.is_empty() {
            continue;
        }
        populated += 1;

        let sub_features = DMatrix::from_fn(rows.len(), d, |r, c| features[(rows[r], c)]);
        let sub_labels: Vec<ClassId> = rows.iter().map(|&r| labels[r]).collect();
        let out = supervised_contrastive(&sub_features, &sub_labels, temperature, weights)?;

        total.loss += out.loss;
        for (local, &row) in rows.iter().enumerate() {
            let mut target = total.grad.row_mut(row);
            target += out.grad.row(local);
        }
    }

    if populated == 0 {
        return Ok(total);
    }
    Ok(total.scaled(1.0 / populated as f64))
}
