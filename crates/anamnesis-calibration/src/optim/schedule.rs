use std::f64::consts::PI;

/// Cosine annealing from `base_lr` to `eta_min` over `t_max` epochs.
#[derive(Debug, Clone)]
pub struct CosineAnnealing {
    base_lr: f64,
    eta_min: f64,
    t_max: usize,
    epoch: usize,
}

impl CosineAnnealing {
    pub fn new(base_lr: f64, eta_min: f64, t_max: usize) -> Self {
        Self {
            base_lr,
            eta_min,
            t_max,
            epoch: 0,
        }
    }

    /// Learning rate for the current epoch.
    pub fn lr(&self) -> f64 {
        self.lr_at(self.epoch)
    }

    pub fn lr_at(&self, epoch: usize) -> f64 {
        if self.t_max == 0 {
            return self.base_lr;
        }
        let progress = epoch.min(self.t_max) as f64 / self.t_max as f64;
        self.eta_min + (self.base_lr - self.eta_min) * (1.0 + (PI * progress).cos()) / 2.0
    }

    pub fn step(&mut self) {
        self.epoch += 1;
    }
}
