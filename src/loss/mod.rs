pub mod softmax;
pub mod cross_entropy;

pub use softmax::softmax;
pub use cross_entropy::{cross_entropy, softmax_cross_entropy_with_logits};
