use rand::{rngs::StdRng, SeedableRng};

use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// Fully-connected layer: `Z = X·W + b`.
///
/// - `weights`: (in_dim, out_dim)
/// - `biases`:  (out_dim,)
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    pub weights: Matrix,
    pub biases: Vec<f32>,
}

/// Input retained by [`Dense::forward`] for the matching backward pass.
///
/// Borrowing the input ties the cache to the batch it was computed from, so a
/// backward pass without a preceding forward pass cannot be expressed.
#[derive(Debug, Clone, Copy)]
pub struct DenseCache<'a> {
    input: &'a Matrix,
}

/// Gradients of the loss with respect to a Dense layer's parameters.
/// Recomputed from scratch by every backward call.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGradients {
    pub weights: Matrix,
    pub biases: Vec<f32>,
}

impl Dense {
    /// He-initialized weights, zero biases. `seed = None` draws from entropy.
    pub fn new(in_dim: usize, out_dim: usize, seed: Option<u64>) -> Dense {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Dense {
            weights: Matrix::he(in_dim, out_dim, &mut rng),
            biases: vec![0.0; out_dim],
        }
    }

    /// Builds a layer from existing parameters, checking that the bias length
    /// matches the weight matrix.
    pub fn from_parameters(weights: Matrix, biases: Vec<f32>) -> Result<Dense> {
        if weights.data.len() != weights.rows * weights.cols {
            return Err(NetError::MalformedModel(format!(
                "weight matrix declares {}x{} but holds {} values",
                weights.rows, weights.cols, weights.data.len()
            )));
        }
        if biases.len() != weights.cols {
            return Err(NetError::shape("bias", weights.cols, biases.len()));
        }
        Ok(Dense { weights, biases })
    }

    pub fn in_dim(&self) -> usize {
        self.weights.rows
    }

    pub fn out_dim(&self) -> usize {
        self.weights.cols
    }

    /// Forward pass over a (batch, in_dim) input. Returns the (batch, out_dim)
    /// output and the cache needed by [`Dense::backward`].
    pub fn forward<'a>(&self, input: &'a Matrix) -> (Matrix, DenseCache<'a>) {
        assert_eq!(
            input.cols,
            self.in_dim(),
            "Dense::forward: input has {} features, layer expects {}",
            input.cols,
            self.in_dim()
        );
        let z = input.matmul(&self.weights).add_row(&self.biases);
        (z, DenseCache { input })
    }

    /// Backward pass. `grad_output` is ∂L/∂Z with shape (batch, out_dim).
    ///
    /// Returns ∂L/∂X (batch, in_dim) together with
    /// dW = Xᵗ·dZ and db = column sums of dZ.
    pub fn backward(&self, cache: &DenseCache<'_>, grad_output: &Matrix) -> (Matrix, DenseGradients) {
        let input = cache.input;
        assert_eq!(
            input.cols,
            self.in_dim(),
            "Dense::backward: cache was produced by a layer with {} inputs, this layer has {}",
            input.cols,
            self.in_dim()
        );
        assert_eq!(
            grad_output.shape(),
            (input.rows, self.out_dim()),
            "Dense::backward: gradient shape does not match the cached forward pass"
        );

        let grads = DenseGradients {
            weights: input.t_matmul(grad_output),
            biases: grad_output.sum_rows(),
        };
        let grad_input = grad_output.matmul_t(&self.weights);
        (grad_input, grads)
    }

    /// Applies pre-computed gradients scaled by `lr`.
    pub fn apply_gradients(&mut self, grads: &DenseGradients, lr: f32) {
        assert_eq!(grads.weights.shape(), self.weights.shape(), "Dense::apply_gradients: weight gradient shape mismatch");
        assert_eq!(grads.biases.len(), self.biases.len(), "Dense::apply_gradients: bias gradient length mismatch");
        self.weights.sub_scaled_assign(&grads.weights, lr);
        for (b, &g) in self.biases.iter_mut().zip(&grads.biases) {
            *b -= lr * g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_uses_he_scaled_weights_and_zero_biases() {
        let layer = Dense::new(50, 4, Some(7));
        assert_eq!(layer.weights.shape(), (50, 4));
        assert!(layer.biases.iter().all(|&b| b == 0.0));
        assert_eq!(layer, Dense::new(50, 4, Some(7)));
        assert_ne!(layer, Dense::new(50, 4, Some(8)));
    }

    #[test]
    fn forward_computes_affine_map() {
        let layer = Dense::from_parameters(
            Matrix::from_rows(vec![vec![1.0, -1.0], vec![2.0, 0.5]]),
            vec![0.5, 1.0],
        )
        .unwrap();
        let x = Matrix::from_rows(vec![vec![1.0, 1.0], vec![0.0, 2.0]]);
        let (z, _) = layer.forward(&x);
        assert_eq!(z, Matrix::from_rows(vec![vec![3.5, 0.5], vec![4.5, 2.0]]));
    }

    #[test]
    fn backward_with_unit_gradient_sums_inputs() {
        let layer = Dense::new(3, 2, Some(0));
        let x = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let (_, cache) = layer.forward(&x);
        let ones = Matrix::from_vec(2, 2, vec![1.0; 4]);
        let (dx, grads) = layer.backward(&cache, &ones);

        // dW = Xᵗ·1: each column holds the per-feature input sums.
        assert_eq!(grads.weights, Matrix::from_rows(vec![vec![5.0, 5.0], vec![7.0, 7.0], vec![9.0, 9.0]]));
        assert_eq!(grads.biases, vec![2.0, 2.0]);

        // dX = 1·Wᵗ: every row is the per-input sum of outgoing weights.
        for i in 0..2 {
            for j in 0..3 {
                let expected: f32 = layer.weights.row(j).iter().sum();
                assert_relative_eq!(dx.get(i, j), expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn apply_gradients_is_plain_sgd() {
        let mut layer = Dense::from_parameters(Matrix::from_vec(1, 2, vec![1.0, 2.0]), vec![0.0, 1.0]).unwrap();
        let grads = DenseGradients {
            weights: Matrix::from_vec(1, 2, vec![10.0, -10.0]),
            biases: vec![1.0, 1.0],
        };
        layer.apply_gradients(&grads, 0.1);
        assert_relative_eq!(layer.weights.data[0], 0.0);
        assert_relative_eq!(layer.weights.data[1], 3.0);
        assert_eq!(layer.biases, vec![-0.1, 0.9]);
    }

    #[test]
    fn mismatched_bias_gradient_leaves_layer_untouched() {
        let mut layer = Dense::new(2, 3, Some(0));
        let before = layer.clone();
        let grads = DenseGradients {
            weights: Matrix::from_vec(2, 3, vec![1.0; 6]),
            biases: vec![1.0; 2],
        };
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| layer.apply_gradients(&grads, 0.1)));
        assert!(result.is_err());
        assert_eq!(layer, before);
    }

    #[test]
    fn from_parameters_rejects_bias_mismatch() {
        let err = Dense::from_parameters(Matrix::zeros(3, 2), vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, NetError::ShapeMismatch { .. }));
    }

    #[test]
    #[should_panic(expected = "gradient shape")]
    fn backward_rejects_gradient_from_another_batch() {
        let layer = Dense::new(2, 2, Some(1));
        let x = Matrix::zeros(3, 2);
        let (_, cache) = layer.forward(&x);
        let _ = layer.backward(&cache, &Matrix::zeros(4, 2));
    }
}
