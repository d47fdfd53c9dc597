//! Sample statistics over N×D feature rows.

use nalgebra::{DMatrix, DVector};

/// Column means of `features`. A zero-row input yields a zero vector.
pub fn mean(features: &DMatrix<f64>) -> DVector<f64> {
    let n = features.nrows();
    if n == 0 {
        return DVector::zeros(features.ncols());
    }
    features.row_sum().transpose() / n as f64
}

/// Unbiased (N−1) sample covariance. Fewer than two rows yield zeros.
pub fn covariance(features: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    let (n, d) = features.shape();
    if n < 2 {
        return DMatrix::zeros(d, d);
    }
    let centered = centered(features, mean);
    let cov = centered.transpose() * &centered / (n - 1) as f64;
    // Symmetrise away rounding so downstream eigen/Cholesky see an exact mirror.
    (&cov + cov.transpose()) * 0.5
}

/// Population (ddof 0) per-dimension variance.
pub fn population_variance(features: &DMatrix<f64>, mean: &DVector<f64>) -> DVector<f64> {
    let (n, d) = features.shape();
    if n == 0 {
        return DVector::zeros(d);
    }
    let centered = centered(features, mean);
    DVector::from_fn(d, |c, _| centered.column(c).norm_squared() / n as f64)
}

/// `cov + eps·I`.
pub fn regularize(covariance: &DMatrix<f64>, eps: f64) -> DMatrix<f64> {
    let d = covariance.nrows();
    covariance + DMatrix::identity(d, d) * eps
}

fn centered(features: &DMatrix<f64>, mean: &DVector<f64>) -> DMatrix<f64> {
    let mut centered = features.clone();
    for mut row in centered.row_iter_mut() {
        row -= mean.transpose();
    }
    centered
}
