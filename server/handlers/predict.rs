use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use ferrite_mnist::{Matrix, TwoLayerNet};

use crate::routes::{error_response, json_response, HttpResponse};
use crate::state::AppState;

/// Reasons a `/predict` payload is rejected. The messages are part of the
/// HTTP contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PixelError {
    #[error("Missing 'pixels' field.")]
    Missing,
    #[error("pixels must be a list of length {0}.")]
    WrongLength(usize),
    #[error("Could not parse pixels into float array.")]
    NotNumeric,
    #[error("pixels contains NaN/Inf.")]
    NonFinite,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub pred: usize,
    pub probs: Vec<f32>,
    pub hidden: Vec<f32>,
}

pub fn handle(body: &[u8], state: &AppState) -> HttpResponse {
    match predict(body, &state.model) {
        Ok(response) => {
            debug!(pred = response.pred, "prediction");
            json_response(200, &response)
        }
        Err(e) => {
            warn!(reason = %e, "rejected /predict request");
            error_response(400, &e.to_string())
        }
    }
}

/// Validates the JSON body and runs one forward pass.
pub fn predict(body: &[u8], model: &TwoLayerNet) -> Result<PredictResponse, PixelError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| PixelError::Missing)?;
    let pixels = parse_pixels(&payload, model.input_dim())?;

    let x = Matrix::from_vec(1, pixels.len(), pixels);
    let (hidden, logits) = model.forward_with_hidden(&x);
    let probs = ferrite_mnist::softmax(&logits);
    let pred = probs.argmax_rows()[0];

    Ok(PredictResponse {
        pred,
        probs: probs.row(0).to_vec(),
        hidden: hidden.row(0).to_vec(),
    })
}

/// Pulls `pixels` out of the payload as exactly `expected` finite floats.
///
/// Elements may be JSON numbers or strings holding a float.
pub fn parse_pixels(payload: &Value, expected: usize) -> Result<Vec<f32>, PixelError> {
    let list = match payload.get("pixels") {
        Some(v) => v,
        None => return Err(PixelError::Missing),
    };
    let items = match list.as_array() {
        Some(items) if items.len() == expected => items,
        _ => return Err(PixelError::WrongLength(expected)),
    };

    let mut pixels = Vec::with_capacity(expected);
    for item in items {
        let value = match item {
            Value::Number(n) => n.as_f64().ok_or(PixelError::NotNumeric)? as f32,
            Value::String(s) => s.trim().parse::<f32>().map_err(|_| PixelError::NotNumeric)?,
            _ => return Err(PixelError::NotNumeric),
        };
        pixels.push(value);
    }

    if pixels.iter().any(|p| !p.is_finite()) {
        return Err(PixelError::NonFinite);
    }
    Ok(pixels)
}
