pub mod arff;
pub mod dataset;
pub mod idx;
pub mod preprocess;
pub mod split;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::network::NUM_CLASSES;

pub use dataset::Dataset;
pub use split::train_test_split;

/// Where the raw digits come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    /// Directory holding the four standard MNIST IDX files. Already split
    /// into train and test.
    Idx { dir: PathBuf },
    /// A single ARFF export, split with [`train_test_split`].
    Arff { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub source: DataSource,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
}

fn default_test_size() -> f64 {
    split::DEFAULT_TEST_SIZE
}

fn default_split_seed() -> u64 {
    split::DEFAULT_SPLIT_SEED
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            source: DataSource::Idx { dir: PathBuf::from("data/mnist") },
            test_size: split::DEFAULT_TEST_SIZE,
            split_seed: split::DEFAULT_SPLIT_SEED,
        }
    }
}

impl DataConfig {
    /// Loads the configured source and returns `(train, test)`.
    pub fn load_split(&self) -> Result<(Dataset, Dataset)> {
        let (train, test) = match &self.source {
            DataSource::Idx { dir } => idx::load_mnist_dir(dir, NUM_CLASSES)?,
            DataSource::Arff { path } => {
                let all = arff::load_arff(path, NUM_CLASSES)?;
                train_test_split(&all, self.test_size, self.split_seed)?
            }
        };
        info!(train = train.len(), test = test.len(), features = train.features(), "dataset ready");
        Ok((train, test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arff_source_is_split_with_configured_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digits.arff");
        let mut body = String::from("@relation digits\n@data\n");
        for i in 0..10 {
            body.push_str(&format!("{},0,{}\n", i * 20, i));
        }
        std::fs::write(&path, body).unwrap();

        let config = DataConfig { source: DataSource::Arff { path }, test_size: 0.3, split_seed: 42 };
        let (train, test) = config.load_split().unwrap();
        assert_eq!((train.len(), test.len()), (7, 3));
    }

    #[test]
    fn idx_source_reads_standard_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let (img, lbl) = idx::encode_idx_pair(&[vec![0, 255], vec![255, 0], vec![0, 0]], 1, 2, &[1, 2, 3]);
        std::fs::write(dir.path().join(idx::TRAIN_IMAGES), &img).unwrap();
        std::fs::write(dir.path().join(idx::TRAIN_LABELS), &lbl).unwrap();
        let (img, lbl) = idx::encode_idx_pair(&[vec![9, 9]], 1, 2, &[4]);
        std::fs::write(dir.path().join(idx::TEST_IMAGES), &img).unwrap();
        std::fs::write(dir.path().join(idx::TEST_LABELS), &lbl).unwrap();

        let config = DataConfig { source: DataSource::Idx { dir: dir.path().to_path_buf() }, ..DataConfig::default() };
        let (train, test) = config.load_split().unwrap();
        assert_eq!(train.labels, vec![1, 2, 3]);
        assert_eq!(test.labels, vec![4]);
    }

    #[test]
    fn config_json_defaults_split_parameters() {
        let cfg: DataConfig = serde_json::from_str(r#"{"source": {"type": "arff", "path": "x.arff"}}"#).unwrap();
        assert_eq!(cfg.test_size, 0.2);
        assert_eq!(cfg.split_seed, 42);
    }
}
