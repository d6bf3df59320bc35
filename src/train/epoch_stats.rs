use serde::{Serialize, Deserialize};

/// Per-epoch training statistics returned by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean of the mini-batch losses reported during this epoch.
    pub train_loss: f64,
    /// Accuracy on the leading `train_eval_samples` training rows, in [0, 1].
    pub train_accuracy: f64,
    /// Test-set accuracy, when a test set was provided.
    pub test_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
