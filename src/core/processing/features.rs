use ndarray::Array2;

use crate::error::{Error, Result};
use crate::types::MatchMeta;

/// Prefix the host uses for per-match metadata fields.
pub const REQUIRED_KEY_PREFIX: &str = "tag_";

/// Metadata keys that must be populated on every match before scoring.
pub fn required_keys(feature_names: &[String]) -> Vec<String> {
    feature_names
        .iter()
        .map(|name| format!("{}{}", REQUIRED_KEY_PREFIX, name))
        .collect()
}

/// Assemble the `matches x features` matrix.
///
/// Rows follow the iteration order of `match_meta`, columns follow
/// `feature_names`. Fails on the first missing value; no partial matrix is
/// returned.
pub fn features_dataset(match_meta: &MatchMeta, feature_names: &[String]) -> Result<Array2<f64>> {
    let mut dataset = Array2::<f64>::zeros((match_meta.len(), feature_names.len()));

    for (row, (match_id, values)) in match_meta.iter().enumerate() {
        for (col, feature) in feature_names.iter().enumerate() {
            let value = values.get(feature).ok_or_else(|| Error::MissingFeature {
                match_id,
                feature: feature.clone(),
            })?;
            dataset[[row, col]] = *value;
        }
    }

    Ok(dataset)
}
