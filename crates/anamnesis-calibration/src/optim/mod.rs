//! Optimizers and learning-rate schedule for head retraining.

mod adamw;
mod schedule;
mod sgd;

pub use adamw::AdamW;
pub use schedule::CosineAnnealing;
pub use sgd::Sgd;

use anamnesis_core::config::{CalibrationConfig, OptimizerKind};
use nalgebra::DVector;

/// A first-order optimizer over a flat parameter vector.
pub trait Optimizer: Send {
    /// Apply one update at learning rate `lr`.
    fn step(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>, lr: f64);

    /// Factor applied to the scheduled learning rate.
    fn lr_scale(&self) -> f64 {
        1.0
    }

    fn name(&self) -> &str;
}

/// Fresh optimizer for one calibration run.
pub fn build(config: &CalibrationConfig) -> Box<dyn Optimizer> {
    match config.optimizer {
        OptimizerKind::Sgd => Box::new(Sgd::new(config.momentum, config.weight_decay)),
        OptimizerKind::AdamW => Box::new(AdamW::new(config.weight_decay)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_follows_config() {
        let mut config = CalibrationConfig::default();
        assert_eq!(build(&config).name(), "sgd");
        config.optimizer = OptimizerKind::AdamW;
        let adam = build(&config);
        assert_eq!(adam.name(), "adamw");
        assert_eq!(adam.lr_scale(), 0.1);
    }
}
