use nalgebra::DVector;

use super::Optimizer;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Adam with decoupled weight decay.
///
/// Runs at a tenth of the scheduled learning rate.
#[derive(Debug, Clone)]
pub struct AdamW {
    weight_decay: f64,
    t: i32,
    m: Option<DVector<f64>>,
    v: Option<DVector<f64>>,
}

impl AdamW {
    pub fn new(weight_decay: f64) -> Self {
        let weight_decay = if weight_decay.is_finite() && weight_decay >= 0.0 {
            weight_decay
        } else {
            0.0
        };
        Self {
            weight_decay,
            t: 0,
            m: None,
            v: None,
        }
    }
}

impl Optimizer for AdamW {
    fn step(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>, lr: f64) {
        let n = params.len();
        let mut m = self.m.take().filter(|m| m.len() == n).unwrap_or_else(|| DVector::zeros(n));
        let mut v = self.v.take().filter(|v| v.len() == n).unwrap_or_else(|| DVector::zeros(n));
        self.t += 1;

        *params *= 1.0 - lr * self.weight_decay;
        m = m * BETA1 + grad * (1.0 - BETA1);
        v = v * BETA2 + grad.component_mul(grad) * (1.0 - BETA2);

        let bias1 = 1.0 - BETA1.powi(self.t);
        let bias2 = 1.0 - BETA2.powi(self.t);
        for i in 0..n {
            let m_hat = m[i] / bias1;
            let v_hat = v[i] / bias2;
            params[i] -= lr * m_hat / (v_hat.sqrt() + EPSILON);
        }
        self.m = Some(m);
        self.v = Some(v);
    }

    fn lr_scale(&self) -> f64 {
        0.1
    }

    fn name(&self) -> &str {
        "adamw"
    }
}
