pub mod error;
pub mod math;
pub mod layers;
pub mod loss;
pub mod optim;
pub mod network;
pub mod train;
pub mod data;
pub mod metrics;

// Convenience re-exports
pub use error::{NetError, Result};
pub use math::matrix::Matrix;
pub use layers::{Dense, DenseGradients, Relu};
pub use loss::{cross_entropy, softmax, softmax_cross_entropy_with_logits};
pub use network::{NetworkGradients, TwoLayerNet};
pub use optim::sgd::Sgd;
pub use train::{batch_iterator, train_loop, BatchIterator, EpochStats, TrainConfig};
pub use data::{DataConfig, DataSource, Dataset};
pub use metrics::{accuracy, top_k, ConfusionMatrix};
