use crate::layers::dense::{Dense, DenseGradients};

/// Plain stochastic gradient descent: `p ← p − lr · ∂L/∂p`.
/// No momentum, no weight decay, no clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one SGD update to a layer given its freshly computed gradients.
    pub fn step(&self, layer: &mut Dense, grads: &DenseGradients) {
        layer.apply_gradients(grads, self.learning_rate);
    }
}
