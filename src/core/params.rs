use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

fn default_target_size() -> serde_json::Value {
    serde_json::Value::from(224)
}

fn default_how() -> String {
    "BILINEAR".to_string()
}

fn default_channel_axis() -> i64 {
    -1
}

/// Resizer parameters suitable for config files.
///
/// Values are kept loosely typed so that a bad configuration still loads and
/// is rejected by [`crate::ImageResizer::new`] with a configuration error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizerParams {
    /// Integer (shorter edge) or `[height, width]`
    #[serde(default = "default_target_size")]
    pub target_size: serde_json::Value,
    /// One of NEAREST, BILINEAR, BICUBIC, LANCZOS
    #[serde(default = "default_how")]
    pub how: String,
    /// Axis holding the colour channels; negative values count from the end
    #[serde(default = "default_channel_axis")]
    pub channel_axis: i64,
}

impl Default for ResizerParams {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            how: default_how(),
            channel_axis: default_channel_axis(),
        }
    }
}

impl ResizerParams {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Ranker parameters suitable for config files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankerParams {
    /// LightGBM text model; must exist when the ranker is constructed
    pub model_path: Option<PathBuf>,
    /// Column order of the feature matrix, matching the model's training order
    pub feature_names: Vec<String>,
}

impl RankerParams {
    pub fn new<P: Into<PathBuf>>(model_path: P, feature_names: &[&str]) -> Self {
        Self {
            model_path: Some(model_path.into()),
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
