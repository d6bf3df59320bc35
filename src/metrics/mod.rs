pub mod confusion;

pub use confusion::ConfusionMatrix;

/// Fraction of positions where `predicted` and `truth` agree; 0 for empty
/// input.
pub fn accuracy(predicted: &[usize], truth: &[usize]) -> f64 {
    assert_eq!(predicted.len(), truth.len(), "accuracy: {} predictions for {} labels", predicted.len(), truth.len());
    if truth.is_empty() {
        return 0.0;
    }
    let correct = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    correct as f64 / truth.len() as f64
}

/// The `k` most probable classes of one probability row, most probable
/// first. Equal probabilities keep ascending class order.
pub fn top_k(probs: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = probs.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}
