//! Crate-level error type and `Result` alias for structured error handling.
//! Configuration problems surface when an adapter is constructed, a missing
//! model file surfaces when the ranker loads it, and lookup failures surface
//! per call with no partial result.
use std::path::PathBuf;

use thiserror::Error;

use crate::types::MatchId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image buffer error: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Pretrained model file does not exist: {}", display_path(.path))]
    PretrainedModelMissing { path: Option<PathBuf> },

    #[error("Match {match_id} is missing required feature '{feature}'")]
    MissingFeature { match_id: MatchId, feature: String },

    #[error("Model expects at least {expected} features per row, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("Malformed model text at line {line}: {message}")]
    ModelFormat { line: usize, message: String },

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<unset>".to_string(),
    }
}

impl Error {
    pub fn invalid<V: std::fmt::Display>(arg: &'static str, value: V) -> Self {
        Error::InvalidArgument {
            arg,
            value: value.to_string(),
        }
    }

    pub fn model_format<M: Into<String>>(line: usize, message: M) -> Self {
        Error::ModelFormat {
            line,
            message: message.into(),
        }
    }

    /// True for failures raised while constructing an adapter. These are
    /// permanent for the given configuration; retrying does not help.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. }
                | Error::PretrainedModelMissing { .. }
                | Error::ModelFormat { .. }
                | Error::UnsupportedModel(_)
        )
    }
}
