//! Prototype separation regulariser.
//!
//! Stacks the stored class means on top of the batch features and asks each
//! row of the scaled Gram matrix to pick itself out: a cross-entropy with
//! the identity assignment. Pushes batch features away from each other and
//! from every known class prototype.

use nalgebra::{DMatrix, DVector};

use crate::supcon::ContrastiveOutput;

/// `coefficient · CE(M Mᵀ / τ, arange)` with `M = [prototypes; features]`.
///
/// The gradient covers the feature rows only; prototypes are constants.
/// Without prototypes only the batch rows are used.
pub fn prototype_separation_loss(
    features: &DMatrix<f64>,
    prototypes: &[DVector<f64>],
    temperature: f64,
    coefficient: f64,
) -> ContrastiveOutput {
    let (n, d) = features.shape();
    let p = prototypes.iter().filter(|v| v.len() == d).count();
    let rows = p + n;
    if n == 0 {
        return ContrastiveOutput::zero(0, d);
    }

    let mut stacked = DMatrix::zeros(rows, d);
    for (i, proto) in prototypes.iter().filter(|v| v.len() == d).enumerate() {
        stacked.set_row(i, &proto.transpose());
    }
    stacked.rows_mut(p, n).copy_from(features);

    let sim = &stacked * stacked.transpose() / temperature;
    let mut loss = 0.0;
    let mut dsim = DMatrix::zeros(rows, rows);
    for r in 0..rows {
        let max = sim.row(r).max();
        let denom: f64 = sim.row(r).iter().map(|s| (s - max).exp()).sum();
        let log_denom = denom.ln() + max;
        loss -= sim[(r, r)] - log_denom;
        for c in 0..rows {
            let prob = (sim[(r, c)] - log_denom).exp();
            dsim[(r, c)] = (prob - if r == c { 1.0 } else { 0.0 }) / rows as f64;
        }
    }
    loss /= rows as f64;

    let dstacked = (&dsim + dsim.transpose()) * &stacked / temperature;
    ContrastiveOutput {
        loss: coefficient * loss,
        grad: dstacked.rows(p, n).into_owned() * coefficient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_matches_finite_differences() {
        let features = DMatrix::from_row_slice(3, 2, &[0.5, 0.1, -0.2, 0.4, 0.3, -0.6]);
        let protos = vec![DVector::from_vec(vec![1.0, 0.0]), DVector::from_vec(vec![0.0, -1.0])];
        let analytic = prototype_separation_loss(&features, &protos, 0.8, 0.1).grad;
        let h = 1e-6;
        for r in 0..3 {
            for c in 0..2 {
                let mut plus = features.clone();
                plus[(r, c)] += h;
                let mut minus = features.clone();
                minus[(r, c)] -= h;
                let numeric = (prototype_separation_loss(&plus, &protos, 0.8, 0.1).loss
                    - prototype_separation_loss(&minus, &protos, 0.8, 0.1).loss)
                    / (2.0 * h);
                assert!((numeric - analytic[(r, c)]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn separated_batch_costs_less_than_collapsed() {
        let spread = DMatrix::from_row_slice(2, 2, &[3.0, 0.0, -3.0, 0.0]);
        let collapsed = DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 3.0, 0.0]);
        let a = prototype_separation_loss(&spread, &[], 0.8, 1.0).loss;
        let b = prototype_separation_loss(&collapsed, &[], 0.8, 1.0).loss;
        assert!(a < b);
    }
}
