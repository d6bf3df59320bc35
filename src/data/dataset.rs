use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// Images and their class labels.
///
/// `images` is (N, features) with pixel values in [0, 1]; `labels[i]` is the
/// class of row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub images: Matrix,
    pub labels: Vec<usize>,
}

impl Dataset {
    pub fn new(images: Matrix, labels: Vec<usize>) -> Result<Dataset> {
        if images.rows != labels.len() {
            return Err(NetError::Data(format!(
                "{} images but {} labels",
                images.rows,
                labels.len()
            )));
        }
        Ok(Dataset { images, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn features(&self) -> usize {
        self.images.cols
    }

    /// Rows at `indices`, in order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            images: self.images.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// The first `n` rows (or all of them when fewer exist).
    pub fn head(&self, n: usize) -> Dataset {
        let n = n.min(self.len());
        Dataset {
            images: Matrix::from_vec(n, self.images.cols, self.images.data[..n * self.images.cols].to_vec()),
            labels: self.labels[..n].to_vec(),
        }
    }

    /// Sorted distinct labels.
    pub fn classes(&self) -> Vec<usize> {
        let mut classes = self.labels.clone();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}
