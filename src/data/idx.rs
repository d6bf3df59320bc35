//! Reader for the IDX binary format used by MNIST and its derivatives
//! (Fashion-MNIST, EMNIST, ...).
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index in [0, n_classes)
//! ```

use std::path::Path;

use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

fn data_err(msg: String) -> NetError {
    NetError::Data(msg)
}

fn be_u32(bytes: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]]) as usize
}

/// Validates the 4-byte magic prefix shared by both file kinds.
fn check_magic(bytes: &[u8], kind: &str, header_len: usize, dims: u8) -> Result<()> {
    if bytes.len() < header_len {
        return Err(data_err(format!(
            "IDX {} file too short: expected at least {} header bytes, got {}.",
            kind, header_len, bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(data_err(format!(
            "IDX {} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            kind, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(data_err(format!(
            "IDX {} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            kind, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(data_err(format!(
            "IDX {} file: byte 3 (dimensions) must be {}, got {}.",
            kind, dims, bytes[3]
        )));
    }
    Ok(())
}

/// Parses an image file and a label file into a [`Dataset`]. Pixels are
/// divided by 255 so values lie in [0, 1].
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8], n_classes: usize) -> Result<Dataset> {
    check_magic(image_bytes, "image", 16, 0x03)?;
    check_magic(label_bytes, "label", 8, 0x01)?;

    let n_items = be_u32(image_bytes, 4);
    let rows = be_u32(image_bytes, 8);
    let cols = be_u32(image_bytes, 12);

    let n_pixels = rows
        .checked_mul(cols)
        .ok_or_else(|| data_err(format!("IDX image file: rows * cols overflows usize (rows={}, cols={}).", rows, cols)))?;
    let data_len = n_items
        .checked_mul(n_pixels)
        .ok_or_else(|| data_err(format!("IDX image file: n_items * n_pixels overflows usize (n_items={}, n_pixels={}).", n_items, n_pixels)))?;

    // check_magic guarantees the 16 header bytes, so the subtraction cannot underflow.
    if image_bytes.len() - 16 < data_len {
        return Err(data_err(format!(
            "IDX image file too short: header declares {} items of {}x{} pixels, but file is only {} bytes total.",
            n_items, rows, cols, image_bytes.len()
        )));
    }

    let label_count = be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(data_err(format!(
            "IDX file mismatch: image file declares {} items but label file declares {}.",
            n_items, label_count
        )));
    }
    if label_bytes.len() - 8 < n_items {
        return Err(data_err(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes.",
            n_items, label_bytes.len()
        )));
    }
    if n_classes < 2 {
        return Err(data_err(format!("n_classes must be at least 2, got {}.", n_classes)));
    }

    let pixels: Vec<f32> = image_bytes[16..16 + data_len].iter().map(|&px| px as f32 / 255.0).collect();

    let mut labels = Vec::with_capacity(n_items);
    for (i, &class_idx) in label_bytes[8..8 + n_items].iter().enumerate() {
        let class = class_idx as usize;
        if class >= n_classes {
            return Err(data_err(format!(
                "IDX label at index {}: class index {} is out of range for n_classes={}.",
                i, class, n_classes
            )));
        }
        labels.push(class);
    }

    Dataset::new(Matrix::from_vec(n_items, n_pixels, pixels), labels)
}

/// Reads and parses an IDX image/label file pair from disk.
pub fn load_idx_pair(images: &Path, labels: &Path, n_classes: usize) -> Result<Dataset> {
    let image_bytes = std::fs::read(images)?;
    let label_bytes = std::fs::read(labels)?;
    let dataset = parse_idx_pair(&image_bytes, &label_bytes, n_classes)?;
    debug!(images = %images.display(), rows = dataset.len(), features = dataset.features(), "loaded IDX pair");
    Ok(dataset)
}

/// Loads the standard four-file MNIST layout from `dir`, returning
/// `(train, test)`.
pub fn load_mnist_dir(dir: &Path, n_classes: usize) -> Result<(Dataset, Dataset)> {
    let train = load_idx_pair(&dir.join(TRAIN_IMAGES), &dir.join(TRAIN_LABELS), n_classes)?;
    let test = load_idx_pair(&dir.join(TEST_IMAGES), &dir.join(TEST_LABELS), n_classes)?;
    Ok((train, test))
}

#[cfg(test)]
pub(crate) fn encode_idx_pair(images: &[Vec<u8>], rows: u32, cols: u32, labels: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut image_bytes = vec![0x00, 0x00, 0x08, 0x03];
    image_bytes.extend((images.len() as u32).to_be_bytes());
    image_bytes.extend(rows.to_be_bytes());
    image_bytes.extend(cols.to_be_bytes());
    for img in images {
        image_bytes.extend(img);
    }

    let mut label_bytes = vec![0x00, 0x00, 0x08, 0x01];
    label_bytes.extend((labels.len() as u32).to_be_bytes());
    label_bytes.extend(labels);
    (image_bytes, label_bytes)
}
