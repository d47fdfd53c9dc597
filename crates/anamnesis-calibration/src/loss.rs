//! Cross-entropy over a restricted label set.

use anamnesis_core::models::ClassId;
use nalgebra::DMatrix;

/// Mean loss and its gradient with respect to the logits.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossEntropyOutput {
    pub loss: f64,
    pub grad: DMatrix<f64>,
}

/// Softmax cross-entropy averaged over rows.
///
/// With `allowed`, logits of classes marked `false` are set to −∞ before the
/// softmax and receive no gradient. A target outside the allowed set makes
/// the loss infinite, which the calibration loop treats as divergence.
pub fn masked_cross_entropy(
    logits: &DMatrix<f64>,
    targets: &[ClassId],
    allowed: Option<&[bool]>,
) -> CrossEntropyOutput {
    let (n, c) = logits.shape();
    debug_assert_eq!(targets.len(), n);
    let mut grad = DMatrix::zeros(n, c);
    if n == 0 {
        return CrossEntropyOutput { loss: 0.0, grad };
    }
    let keep = |k: usize| allowed.map_or(true, |mask| mask.get(k).copied().unwrap_or(false));

    let mut total = 0.0;
    for r in 0..n {
        let max = (0..c)
            .filter(|&k| keep(k))
            .map(|k| logits[(r, k)])
            .fold(f64::NEG_INFINITY, f64::max);
        let denom: f64 = (0..c)
            .filter(|&k| keep(k))
            .map(|k| (logits[(r, k)] - max).exp())
            .sum();
        let log_denom = max + denom.ln();
        let target = targets[r];
        total += if target < c && keep(target) {
            log_denom - logits[(r, target)]
        } else {
            f64::INFINITY
        };
        for k in (0..c).filter(|&k| keep(k)) {
            grad[(r, k)] = (logits[(r, k)] - log_denom).exp();
        }
        if target < c && keep(target) {
            grad[(r, target)] -= 1.0;
        }
    }
    grad /= n as f64;
    CrossEntropyOutput {
        loss: total / n as f64,
        grad,
    }
}
