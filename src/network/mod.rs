pub mod network;
pub mod persist;

pub use network::{NetworkGradients, TwoLayerNet, HIDDEN_DIM, INPUT_DIM, NUM_CLASSES};
pub use persist::ModelFile;
