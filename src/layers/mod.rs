pub mod dense;
pub mod relu;

pub use dense::{Dense, DenseCache, DenseGradients};
pub use relu::{Relu, ReluCache};
