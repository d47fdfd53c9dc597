use nalgebra::DVector;

use super::Optimizer;

/// SGD with heavy-ball momentum and L2 weight decay folded into the gradient.
#[derive(Debug, Clone)]
pub struct Sgd {
    momentum: f64,
    weight_decay: f64,
    velocity: Option<DVector<f64>>,
}

impl Sgd {
    pub fn new(momentum: f64, weight_decay: f64) -> Self {
        Self {
            momentum,
            weight_decay,
            velocity: None,
        }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>, lr: f64) {
        let mut d = grad + &*params * self.weight_decay;
        if self.momentum != 0.0 {
            let buf = match self.velocity.take() {
                Some(v) if v.len() == d.len() => v * self.momentum + &d,
                _ => d.clone(),
            };
            d.copy_from(&buf);
            self.velocity = Some(buf);
        }
        params.axpy(-lr, &d, 1.0);
    }

    fn name(&self) -> &str {
        "sgd"
    }
}
