use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::network::HIDDEN_DIM;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`             - total number of full passes over the training data
/// - `batch_size`         - samples per mini-batch
/// - `learning_rate`      - SGD step size
/// - `hidden_dim`         - width of the hidden layer when building a fresh network
/// - `seed`               - network init seed; epoch `e` shuffles with `seed + e`
/// - `shuffle`            - reshuffle the training rows every epoch
/// - `train_eval_samples` - training accuracy is measured on this many leading rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub hidden_dim: usize,
    pub seed: u64,
    pub shuffle: bool,
    pub train_eval_samples: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 5,
            batch_size: 128,
            learning_rate: 0.1,
            hidden_dim: HIDDEN_DIM,
            seed: 0,
            shuffle: true,
            train_eval_samples: 5000,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetError::Config("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(NetError::Config("batch_size must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetError::Config(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        if self.hidden_dim == 0 {
            return Err(NetError::Config("hidden_dim must be at least 1".into()));
        }
        Ok(())
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a config from JSON. Missing fields take their default values.
    pub fn load_json(path: &Path) -> Result<TrainConfig> {
        let file = File::open(path)?;
        let config: TrainConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}
