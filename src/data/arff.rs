//! Reader for the OpenML `mnist_784.arff` export: a header section followed by
//! `@data`, then one comma-separated row per image (784 pixel values, then
//! the class label).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};
use crate::math::matrix::Matrix;

/// Parses ARFF rows into a [`Dataset`].
///
/// Blank lines and `%` comments are skipped everywhere; everything before the
/// `@data` marker is ignored. If any pixel exceeds 1.0 all pixels are divided
/// by 255.
pub fn parse_arff<R: BufRead>(reader: R, n_classes: usize) -> Result<Dataset> {
    let mut pixels: Vec<f32> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();
    let mut features: Option<usize> = None;
    let mut in_data = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        if !in_data {
            if line.eq_ignore_ascii_case("@data") {
                in_data = true;
            }
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let (label_str, values) = parts
            .split_last()
            .ok_or_else(|| NetError::Data(format!("line {}: empty row", line_no + 1)))?;

        let label: usize = label_str
            .trim_matches(|c| c == '\'' || c == '"')
            .parse()
            .map_err(|_| NetError::Data(format!("line {}: invalid label {:?}", line_no + 1, label_str)))?;
        if label >= n_classes {
            return Err(NetError::Data(format!(
                "line {}: label {} out of range for {} classes",
                line_no + 1, label, n_classes
            )));
        }

        match features {
            None => features = Some(values.len()),
            Some(n) if n != values.len() => {
                return Err(NetError::Data(format!(
                    "line {}: expected {} features, got {}",
                    line_no + 1, n, values.len()
                )));
            }
            Some(_) => {}
        }

        for v in values {
            let x: f32 = v
                .parse()
                .map_err(|_| NetError::Data(format!("line {}: invalid pixel value {:?}", line_no + 1, v)))?;
            pixels.push(x);
        }
        labels.push(label);
    }

    if !in_data {
        return Err(NetError::Data("no @data section found".to_owned()));
    }

    if pixels.iter().any(|&p| p > 1.0) {
        for p in pixels.iter_mut() {
            *p /= 255.0;
        }
    }

    let n_features = features.unwrap_or(0);
    Dataset::new(Matrix::from_vec(labels.len(), n_features, pixels), labels)
}

pub fn load_arff(path: &Path, n_classes: usize) -> Result<Dataset> {
    let file = File::open(path)?;
    let dataset = parse_arff(BufReader::new(file), n_classes)?;
    debug!(path = %path.display(), rows = dataset.len(), features = dataset.features(), "loaded ARFF");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "% MNIST excerpt\n\
        @relation mnist_784\n\
        @attribute pixel1 numeric\n\
        @attribute pixel2 numeric\n\
        @attribute class {0,1,2,3,4,5,6,7,8,9}\n\
        \n\
        @DATA\n\
        0,255,'7'\n\
        % comment inside data\n\
        51,0,3\n";

    #[test]
    fn parses_and_normalizes_integer_pixels() {
        let d = parse_arff(SAMPLE.as_bytes(), 10).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.images.row(0), &[0.0, 1.0]);
        assert_eq!(d.images.row(1), &[0.2, 0.0]);
        assert_eq!(d.labels, vec![7, 3]);
    }

    #[test]
    fn already_normalized_pixels_are_kept() {
        let d = parse_arff("@data\n0.5,0.25,1\n".as_bytes(), 10).unwrap();
        assert_eq!(d.images.row(0), &[0.5, 0.25]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(parse_arff("@data\n1,2,3\n1,2\n".as_bytes(), 10).is_err());
    }

    #[test]
    fn missing_data_section_is_an_error() {
        assert!(parse_arff("@relation x\n".as_bytes(), 10).is_err());
    }
}
