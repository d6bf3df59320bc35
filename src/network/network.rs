use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::layers::{Dense, DenseGradients, Relu};
use crate::loss::{softmax, softmax_cross_entropy_with_logits};
use crate::math::matrix::Matrix;
use crate::network::persist::ModelFile;
use crate::optim::sgd::Sgd;

pub const INPUT_DIM: usize = 784;
pub const HIDDEN_DIM: usize = 128;
pub const NUM_CLASSES: usize = 10;

/// Two-layer classifier: Dense1 → ReLU → Dense2 → logits.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoLayerNet {
    pub(crate) dense1: Dense,
    pub(crate) relu: Relu,
    pub(crate) dense2: Dense,
}

/// Parameter gradients from one forward/backward pass, returned by
/// [`TwoLayerNet::compute_gradients`] rather than stashed on the layers.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkGradients {
    pub dense1: DenseGradients,
    pub dense2: DenseGradients,
}

impl TwoLayerNet {
    /// Dense1 is seeded with `seed`, Dense2 with `seed + 1`.
    pub fn new(input_dim: usize, hidden_dim: usize, num_classes: usize, seed: u64) -> TwoLayerNet {
        TwoLayerNet {
            dense1: Dense::new(input_dim, hidden_dim, Some(seed)),
            relu: Relu,
            dense2: Dense::new(hidden_dim, num_classes, Some(seed.wrapping_add(1))),
        }
    }

    /// Builds a network from explicit parameters. Shapes are validated:
    /// `b1` must match `W1`'s columns, `W2`'s rows must equal the hidden width
    /// and `b2` must match `W2`'s columns.
    pub fn from_parameters(w1: Matrix, b1: Vec<f32>, w2: Matrix, b2: Vec<f32>) -> Result<TwoLayerNet> {
        ModelFile { w1, b1, w2, b2 }.into_network()
    }

    pub fn input_dim(&self) -> usize {
        self.dense1.in_dim()
    }

    pub fn hidden_dim(&self) -> usize {
        self.dense1.out_dim()
    }

    pub fn num_classes(&self) -> usize {
        self.dense2.out_dim()
    }

    pub fn dense1(&self) -> &Dense {
        &self.dense1
    }

    pub fn dense2(&self) -> &Dense {
        &self.dense2
    }

    /// Raw logits, shape (batch, num_classes). No softmax applied.
    pub fn forward(&self, x: &Matrix) -> Matrix {
        self.forward_with_hidden(x).1
    }

    /// Returns the hidden ReLU activations alongside the logits.
    pub fn forward_with_hidden(&self, x: &Matrix) -> (Matrix, Matrix) {
        let (z1, _) = self.dense1.forward(x);
        let (a1, _) = self.relu.forward(&z1);
        let (logits, _) = self.dense2.forward(&a1);
        (a1, logits)
    }

    /// Softmax probabilities, shape (batch, num_classes).
    pub fn predict_proba(&self, x: &Matrix) -> Matrix {
        softmax(&self.forward(x))
    }

    /// Predicted class per row; ties go to the lowest class index.
    pub fn predict(&self, x: &Matrix) -> Vec<usize> {
        self.predict_proba(x).argmax_rows()
    }

    /// Forward pass, fused loss, and backward pass through
    /// Dense2 → ReLU → Dense1. The network itself is not modified.
    pub fn compute_gradients(&self, xb: &Matrix, yb: &[usize]) -> (f32, NetworkGradients) {
        assert_eq!(xb.rows, yb.len(), "compute_gradients: {} inputs but {} labels", xb.rows, yb.len());

        let (z1, dense1_cache) = self.dense1.forward(xb);
        let (a1, relu_cache) = self.relu.forward(&z1);
        let (logits, dense2_cache) = self.dense2.forward(&a1);

        let (loss, dlogits) = softmax_cross_entropy_with_logits(&logits, yb);

        let (da1, dense2) = self.dense2.backward(&dense2_cache, &dlogits);
        let dz1 = self.relu.backward(&relu_cache, &da1);
        let (_, dense1) = self.dense1.backward(&dense1_cache, &dz1);

        (loss, NetworkGradients { dense1, dense2 })
    }

    pub fn apply_gradients(&mut self, grads: &NetworkGradients, optimizer: &Sgd) {
        optimizer.step(&mut self.dense2, &grads.dense2);
        optimizer.step(&mut self.dense1, &grads.dense1);
    }

    /// One full forward + loss + backward + SGD update on a mini-batch.
    /// Returns the batch loss measured before the update.
    pub fn train_step(&mut self, xb: &Matrix, yb: &[usize], learning_rate: f32) -> f32 {
        let (loss, grads) = self.compute_gradients(xb, yb);
        self.apply_gradients(&grads, &Sgd::new(learning_rate));
        loss
    }

    /// Writes `W1`, `b1`, `W2`, `b2` to a JSON model file, creating the
    /// parent directory if needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ModelFile::from_network(self).save(path.as_ref())
    }

    /// Loads a model file written by [`TwoLayerNet::save`]. The architecture
    /// is taken from the stored tensor shapes, which must be consistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<TwoLayerNet> {
        let path = path.as_ref();
        let network = ModelFile::load(path)?.into_network()?;
        info!(
            path = %path.display(),
            input_dim = network.input_dim(),
            hidden_dim = network.hidden_dim(),
            num_classes = network.num_classes(),
            "loaded model"
        );
        Ok(network)
    }
}

impl Default for TwoLayerNet {
    /// 784 → 128 → 10, seed 0.
    fn default() -> Self {
        TwoLayerNet::new(INPUT_DIM, HIDDEN_DIM, NUM_CLASSES, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_has_canonical_shape() {
        let net = TwoLayerNet::default();
        assert_eq!((net.input_dim(), net.hidden_dim(), net.num_classes()), (784, 128, 10));
        assert_eq!(net.dense1().weights.shape(), (784, 128));
        assert_eq!(net.dense2().biases.len(), 10);
    }

    #[test]
    fn layers_use_distinct_seeds() {
        let net = TwoLayerNet::new(4, 4, 4, 9);
        assert_eq!(net.dense1.weights, Dense::new(4, 4, Some(9)).weights);
        assert_eq!(net.dense2.weights, Dense::new(4, 4, Some(10)).weights);
    }

    #[test]
    fn forward_does_not_change_the_network() {
        let net = TwoLayerNet::new(6, 5, 3, 2);
        let before = net.clone();
        let x = Matrix::from_vec(2, 6, (0..12).map(|i| i as f32 / 12.0).collect());
        let first = net.forward(&x);
        let second = net.forward(&x);
        assert_eq!(first, second);
        assert_eq!(net, before);
    }

    #[test]
    fn hidden_activations_are_non_negative() {
        let net = TwoLayerNet::new(3, 8, 2, 4);
        let x = Matrix::from_rows(vec![vec![1.0, -2.0, 0.5]]);
        let (hidden, logits) = net.forward_with_hidden(&x);
        assert_eq!(hidden.shape(), (1, 8));
        assert!(hidden.data.iter().all(|&a| a >= 0.0));
        assert_eq!(logits, net.forward(&x));
    }

    #[test]
    fn predict_is_argmax_of_probabilities() {
        let net = TwoLayerNet::new(3, 8, 4, 1);
        let x = Matrix::from_rows(vec![vec![0.1, 0.2, 0.3], vec![0.9, 0.0, 0.4]]);
        let probs = net.predict_proba(&x);
        for row in probs.iter_rows() {
            assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
        assert_eq!(net.predict(&x), probs.argmax_rows());
    }

    #[test]
    fn zero_output_layer_predicts_class_zero() {
        let net = TwoLayerNet::from_parameters(
            Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            vec![0.0, 0.0],
            Matrix::zeros(2, 3),
            vec![0.0; 3],
        )
        .unwrap();
        let x = Matrix::from_rows(vec![vec![0.3, 0.7]]);
        assert_eq!(net.predict(&x), vec![0]);
    }

    #[test]
    fn train_step_matches_compute_then_apply() {
        let x = Matrix::from_rows(vec![vec![0.5, 0.1], vec![-0.3, 0.8], vec![0.0, -0.6]]);
        let y = [0, 1, 2];
        let mut stepped = TwoLayerNet::new(2, 4, 3, 3);
        let mut manual = stepped.clone();

        let loss = stepped.train_step(&x, &y, 0.05);
        let (expected_loss, grads) = manual.compute_gradients(&x, &y);
        manual.apply_gradients(&grads, &Sgd::new(0.05));

        assert_eq!(loss, expected_loss);
        assert_eq!(stepped, manual);
    }
}
