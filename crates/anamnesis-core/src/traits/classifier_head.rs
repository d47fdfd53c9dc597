use nalgebra::{DMatrix, DVector};

/// A classification head callable on already-computed features.
///
/// Parameters are exposed as one flat vector so optimizers stay
/// independent of the head's layout.
pub trait ClassifierHead: Send {
    fn num_classes(&self) -> usize;

    fn input_dim(&self) -> usize;

    /// N×D features → N×C logits.
    fn forward(&self, features: &DMatrix<f64>) -> DMatrix<f64>;

    /// Gradient of the loss w.r.t. the flat parameters, given the N×C
    /// gradient w.r.t. the logits.
    fn backward(&self, features: &DMatrix<f64>, grad_logits: &DMatrix<f64>) -> DVector<f64>;

    fn parameters(&self) -> &DVector<f64>;

    fn parameters_mut(&mut self) -> &mut DVector<f64>;
}
