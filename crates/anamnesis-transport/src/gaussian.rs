//! Closed-form 2-Wasserstein distance between Gaussians.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// W2 between N(m1, c1) and N(m2, c2):
/// `sqrt(|m1 - m2|² + tr(c1 + c2 - 2·sqrtm(c1^½ c2 c1^½)))`.
///
/// `sqrtm(c1 c2)` and `sqrtm(c1^½ c2 c1^½)` share a trace; the symmetric form
/// keeps everything real. Negative eigenvalue residue is clamped to zero and
/// the squared distance is clamped at zero before the root, so the result is
/// always real and non-negative.
pub fn gaussian_wasserstein(
    m1: &DVector<f64>,
    c1: &DMatrix<f64>,
    m2: &DVector<f64>,
    c2: &DMatrix<f64>,
) -> f64 {
    let mean_term = (m1 - m2).norm_squared();
    let root1 = psd_sqrt(c1);
    let cross = &root1 * c2 * &root1;
    let cross_trace: f64 = clamped_eigenvalues(&cross).iter().map(|l| l.sqrt()).sum();
    let squared = mean_term + c1.trace() + c2.trace() - 2.0 * cross_trace;
    squared.max(0.0).sqrt()
}

/// Principal square root of a symmetric positive semi-definite matrix.
pub fn psd_sqrt(m: &DMatrix<f64>) -> DMatrix<f64> {
    let eig = SymmetricEigen::new(symmetrize(m));
    let roots = eig.eigenvalues.map(|l| l.max(0.0).sqrt());
    &eig.eigenvectors * DMatrix::from_diagonal(&roots) * eig.eigenvectors.transpose()
}

fn clamped_eigenvalues(m: &DMatrix<f64>) -> DVector<f64> {
    SymmetricEigen::new(symmetrize(m)).eigenvalues.map(|l| l.max(0.0))
}

fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    (m + m.transpose()) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identical_gaussians_are_zero_apart() {
        let m = DVector::zeros(4);
        let c = DMatrix::identity(4, 4);
        assert!(gaussian_wasserstein(&m, &c, &m, &c) < 1e-5);
    }

    #[test]
    fn mean_shift_only() {
        let c = DMatrix::identity(2, 2);
        let d = gaussian_wasserstein(
            &DVector::from_vec(vec![0.0, 0.0]),
            &c,
            &DVector::from_vec(vec![3.0, 4.0]),
            &c,
        );
        assert_relative_eq!(d, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn commuting_covariances_match_scalar_formula() {
        // For diagonal covariances W2² = |Δm|² + Σ (σ1 − σ2)².
        let c1 = DMatrix::from_diagonal(&DVector::from_vec(vec![4.0, 1.0]));
        let c2 = DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, 9.0]));
        let m = DVector::zeros(2);
        let d = gaussian_wasserstein(&m, &c1, &m, &c2);
        assert_relative_eq!(d, (1.0f64 + 4.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn psd_sqrt_squares_back() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        let r = psd_sqrt(&m);
        assert_relative_eq!(&r * &r, m, epsilon = 1e-10);
    }
}
