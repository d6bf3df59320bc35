use crate::math::matrix::Matrix;

/// Row-wise softmax over a (batch, classes) matrix of logits.
///
/// The per-row maximum is subtracted before exponentiating, so large logits
/// never overflow. Every output row sums to 1.
pub fn softmax(logits: &Matrix) -> Matrix {
    let mut probs = logits.clone();
    for i in 0..probs.rows {
        let row = probs.row_mut(i);
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0;
        for x in row.iter_mut() {
            *x = (*x - max).exp();
            sum += *x;
        }
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
    probs
}
