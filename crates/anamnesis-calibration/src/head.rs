//! Linear classification head.

use anamnesis_core::traits::ClassifierHead;
use nalgebra::{DMatrix, DVector};
use anamnesis_rehearsal::stage_rng;
use rand::Rng;
use rand_distr::Uniform;

const HEAD_INIT_STREAM: u64 = 0x68656164;

/// `logits = x Wᵀ + b` with `W` C×D.
///
/// Parameters are stored flat: `W` row-major, then `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearHead {
    num_classes: usize,
    dim: usize,
    params: DVector<f64>,
}

impl LinearHead {
    /// Uniform(±1/√D) initialisation from `seed`.
    pub fn new(num_classes: usize, dim: usize, seed: u64) -> Self {
        let bound = 1.0 / (dim.max(1) as f64).sqrt();
        let mut rng = stage_rng(seed, &[HEAD_INIT_STREAM]);
        let dist = Uniform::new_inclusive(-bound, bound);
        let params = DVector::from_fn(num_classes * dim + num_classes, |_, _| rng.sample(dist));
        Self {
            num_classes,
            dim,
            params,
        }
    }

    /// Head from explicit weights (C×D) and bias (C).
    pub fn from_parts(weights: &DMatrix<f64>, bias: &DVector<f64>) -> Self {
        let (num_classes, dim) = weights.shape();
        let mut params = DVector::zeros(num_classes * dim + num_classes);
        for c in 0..num_classes {
            for d in 0..dim {
                params[c * dim + d] = weights[(c, d)];
            }
            params[num_classes * dim + c] = bias[c];
        }
        Self {
            num_classes,
            dim,
            params,
        }
    }

    pub fn weights(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.num_classes, self.dim, |c, d| self.params[c * self.dim + d])
    }

    pub fn bias(&self) -> DVector<f64> {
        self.params.rows(self.num_classes * self.dim, self.num_classes).into_owned()
    }
}

impl ClassifierHead for LinearHead {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn input_dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, features: &DMatrix<f64>) -> DMatrix<f64> {
        let mut logits = features * self.weights().transpose();
        let bias = self.bias();
        for mut row in logits.row_iter_mut() {
            row += bias.transpose();
        }
        logits
    }

    fn backward(&self, features: &DMatrix<f64>, grad_logits: &DMatrix<f64>) -> DVector<f64> {
        let grad_w = grad_logits.transpose() * features;
        let grad_b = grad_logits.row_sum();
        let mut grad = DVector::zeros(self.params.len());
        for c in 0..self.num_classes {
            for d in 0..self.dim {
                grad[c * self.dim + d] = grad_w[(c, d)];
            }
            grad[self.num_classes * self.dim + c] = grad_b[c];
        }
        grad
    }

    fn parameters(&self) -> &DVector<f64> {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut DVector<f64> {
        &mut self.params
    }
}
