//! Base supervised contrastive loss, value and gradient.

use anamnesis_core::errors::ContrastiveError;
use anamnesis_core::models::ClassId;
use nalgebra::DMatrix;

use crate::weights::ClassWeights;

/// Rows with a norm below this are treated as zero vectors.
const NORM_EPS: f64 = 1e-12;

/// A loss value and its gradient w.r.t. the N×D input rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastiveOutput {
    pub loss: f64,
    pub grad: DMatrix<f64>,
}

impl ContrastiveOutput {
    pub fn zero(rows: usize, dim: usize) -> Self {
        Self {
            loss: 0.0,
            grad: DMatrix::zeros(rows, dim),
        }
    }

    /// `self * factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.loss *= factor;
        self.grad *= factor;
        self
    }
}

/// Supervised contrastive loss over `features` (N×D, L2-normalised
/// internally) with per-row `labels`.
///
/// `s_ik = Γ[y_i, y_k] · cos(x_i, x_k) / τ`; for every anchor the softmax
/// runs over all other rows, and the loss is the negative mean log
/// probability over all positive (same label, non-self) pairs. A batch
/// with no positive pair yields exactly zero loss and gradient.
pub fn supervised_contrastive(
    features: &DMatrix<f64>,
    labels: &[ClassId],
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
    if !(temperature.is_finite() && temperature > 0.0) {
        return Err(ContrastiveError::InvalidTemperature(temperature));
    }
    if let Some(w) = weights {
        if let Some(&label) = labels.iter().find(|&&l| l >= w.size()) {
            return Err(ContrastiveError::LabelOutOfRange {
                label,
                size: w.size(),
            });
        }
    }

    let positives: usize = (0..n)
        .map(|i| (0..n).filter(|&k| k != i && labels[k] == labels[i]).count())
        .sum();
    if positives == 0 {
        return Ok(ContrastiveOutput::zero(n, d));
    }

    let norms: Vec<f64> = features.row_iter().map(|r| r.norm()).collect();
    let mut unit = features.clone();
    for (i, mut row) in unit.row_iter_mut().enumerate() {
        if norms[i] > NORM_EPS {
            row /= norms[i];
        } else {
            row.fill(0.0);
        }
    }

    let gram = &unit * unit.transpose();
    let pair_weight = |i: usize, k: usize| weights.map_or(1.0, |w| w.weight(labels[i], labels[k]));
    let scaled = DMatrix::from_fn(n, n, |i, k| gram[(i, k)] * pair_weight(i, k) / temperature);

    let p = positives as f64;
    let mut loss = 0.0;
    // dL/ds_ik
    let mut ds = DMatrix::zeros(n, n);
    for i in 0..n {
        let max = (0..n)
            .filter(|&k| k != i)
            .map(|k| scaled[(i, k)])
            .fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            continue;
        }
        let denom: f64 = (0..n).filter(|&k| k != i).map(|k| (scaled[(i, k)] - max).exp()).sum();
        let log_denom = denom.ln() + max;
        let anchor_positives = (0..n).filter(|&k| k != i && labels[k] == labels[i]).count() as f64;
        for k in (0..n).filter(|&k| k != i) {
            let prob = (scaled[(i, k)] - log_denom).exp();
            let positive = labels[k] == labels[i];
            if positive {
                loss -= scaled[(i, k)] - log_denom;
            }
            ds[(i, k)] = (anchor_positives * prob - if positive { 1.0 } else { 0.0 }) / p;
        }
    }
    loss /= p;

    // dL/du_i = Σ_k (ds_ik + ds_ki) Γ_ik u_k / τ, then back through the normalisation.
    let mut grad = DMatrix::zeros(n, d);
    for i in 0..n {
        if norms[i] <= NORM_EPS {
            continue;
        }
        let mut g = nalgebra::RowDVector::zeros(d);
        for k in (0..n).filter(|&k| k != i) {
            let coeff = (ds[(i, k)] + ds[(k, i)]) * pair_weight(i, k) / temperature;
            if coeff != 0.0 {
                g += unit.row(k) * coeff;
            }
        }
        let u = unit.row(i);
        let radial = g.dot(&u);
        grad.set_row(i, &((g - u * radial) / norms[i]));
    }

    Ok(ContrastiveOutput { loss, grad })
}

/// The global term: base loss over the whole batch with uniform weights.
pub fn global_loss(
    features: &DMatrix<f64>,
    labels: &[ClassId],
    temperature: f64,
) -> Result<ContrastiveOutput, ContrastiveError> {
    supervised_contrastive(features, labels, temperature, None)
}
