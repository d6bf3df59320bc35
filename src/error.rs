use thiserror::Error;

/// Errors surfaced by the library's fallible operations (file I/O, model
/// persistence, dataset parsing, configuration).
///
/// Contract violations inside the numeric core (mismatched matrix shapes,
/// labels out of range) are not represented here; those panic.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Two tensors that must agree on a dimension do not.
    #[error("shape mismatch for {name}: expected {expected}, got {got}")]
    ShapeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("dataset error: {0}")]
    Data(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl NetError {
    pub(crate) fn shape(name: &str, expected: impl ToString, got: impl ToString) -> NetError {
        NetError::ShapeMismatch {
            name: name.to_owned(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetError>;
