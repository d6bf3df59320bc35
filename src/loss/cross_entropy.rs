use crate::loss::softmax::softmax;
use crate::math::matrix::Matrix;

/// Small epsilon added inside log() to prevent log(0) = -inf.
pub const EPS: f32 = 1e-12;

/// Mean categorical cross-entropy over a batch:
///   L = -mean_i log(probs[i, labels[i]] + eps)
///
/// `probs`  - softmax probabilities, shape (batch, classes)
/// `labels` - integer class indices in [0, classes)
pub fn cross_entropy(probs: &Matrix, labels: &[usize]) -> f32 {
    assert_eq!(
        probs.rows,
        labels.len(),
        "cross_entropy: {} probability rows but {} labels",
        probs.rows,
        labels.len()
    );
    let total: f64 = labels
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            assert!(y < probs.cols, "cross_entropy: label {} out of range for {} classes", y, probs.cols);
            -((probs.get(i, y) + EPS).ln() as f64)
        })
        .sum();
    (total / labels.len() as f64) as f32
}

/// Fused softmax + cross-entropy. Returns the mean batch loss and the
/// gradient with respect to the logits.
///
/// Composed together the Jacobians collapse to
///   ∂L/∂z = (softmax(z) - one_hot(y)) / batch
///
/// This is the only gradient entry point the network uses; there is no
/// separate softmax backward.
pub fn softmax_cross_entropy_with_logits(logits: &Matrix, labels: &[usize]) -> (f32, Matrix) {
    let probs = softmax(logits);
    let loss = cross_entropy(&probs, labels);

    let inv_batch = 1.0 / labels.len() as f32;
    let mut grad = probs;
    for (i, &y) in labels.iter().enumerate() {
        let v = grad.get(i, y);
        grad.set(i, y, v - 1.0);
    }
    (loss, grad.scale(inv_batch))
}
