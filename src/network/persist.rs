//! On-disk model format.
//!
//! A model file is a single JSON object with four entries:
//!
//! ```text
//! {
//!   "W1": { "rows": 784, "cols": 128, "data": [ ...row-major f32... ] },
//!   "b1": [ ...128 f32... ],
//!   "W2": { "rows": 128, "cols": 10,  "data": [ ... ] },
//!   "b2": [ ...10 f32... ]
//! }
//! ```
//!
//! There is no version field and no checksum. The architecture is read back
//! from the tensor shapes, which are checked for consistency on load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{NetError, Result};
use crate::layers::{Dense, Relu};
use crate::math::matrix::Matrix;
use crate::network::network::TwoLayerNet;

/// Owned form of a model file, as read from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelFile {
    #[serde(rename = "W1")]
    pub w1: Matrix,
    pub b1: Vec<f32>,
    #[serde(rename = "W2")]
    pub w2: Matrix,
    pub b2: Vec<f32>,
}

/// Borrowed form used for writing, so saving never copies the weights.
#[derive(Serialize)]
struct ModelFileRef<'a> {
    #[serde(rename = "W1")]
    w1: &'a Matrix,
    b1: &'a [f32],
    #[serde(rename = "W2")]
    w2: &'a Matrix,
    b2: &'a [f32],
}

impl ModelFile {
    pub fn load(path: &Path) -> Result<ModelFile> {
        let file = File::open(path)?;
        let model = serde_json::from_reader(BufReader::new(file))?;
        Ok(model)
    }

    /// Checks the tensors against each other and assembles the network.
    pub fn into_network(self) -> Result<TwoLayerNet> {
        check_matrix("W1", &self.w1)?;
        check_matrix("W2", &self.w2)?;
        check_finite("b1", &self.b1)?;
        check_finite("b2", &self.b2)?;

        if self.b1.len() != self.w1.cols {
            return Err(NetError::shape("b1", self.w1.cols, self.b1.len()));
        }
        if self.w2.rows != self.w1.cols {
            return Err(NetError::shape(
                "W2 (hidden dimension)",
                format!("{} rows (W1 columns)", self.w1.cols),
                format!("{} rows", self.w2.rows),
            ));
        }
        if self.b2.len() != self.w2.cols {
            return Err(NetError::shape("b2", self.w2.cols, self.b2.len()));
        }

        Ok(TwoLayerNet {
            dense1: Dense::from_parameters(self.w1, self.b1)?,
            relu: Relu,
            dense2: Dense::from_parameters(self.w2, self.b2)?,
        })
    }

    pub(crate) fn from_network(network: &TwoLayerNet) -> ModelFileWriter<'_> {
        ModelFileWriter {
            inner: ModelFileRef {
                w1: &network.dense1.weights,
                b1: &network.dense1.biases,
                w2: &network.dense2.weights,
                b2: &network.dense2.biases,
            },
        }
    }
}

pub(crate) struct ModelFileWriter<'a> {
    inner: ModelFileRef<'a>,
}

impl ModelFileWriter<'_> {
    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self.inner)?;
        writer.flush()?;
        info!(
            path = %path.display(),
            input_dim = self.inner.w1.rows,
            hidden_dim = self.inner.w1.cols,
            num_classes = self.inner.w2.cols,
            "saved model"
        );
        Ok(())
    }
}

fn check_matrix(name: &str, m: &Matrix) -> Result<()> {
    if m.rows == 0 || m.cols == 0 {
        return Err(NetError::MalformedModel(format!("{} has an empty dimension ({}x{})", name, m.rows, m.cols)));
    }
    if m.data.len() != m.rows * m.cols {
        return Err(NetError::MalformedModel(format!(
            "{} declares {}x{} but holds {} values",
            name, m.rows, m.cols, m.data.len()
        )));
    }
    check_finite(name, &m.data)
}

fn check_finite(name: &str, values: &[f32]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(NetError::MalformedModel(format!("{} contains a non-finite value at index {}", name, i))),
        None => Ok(()),
    }
}
