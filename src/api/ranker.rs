use std::collections::HashMap;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::core::booster::Booster;
use crate::core::params::RankerParams;
use crate::core::processing::features::{features_dataset, required_keys};
use crate::error::{Error, Result};
use crate::io::lightgbm::LightGbmModel;
use crate::types::{MatchId, MatchMeta, MatchScore, QueryMeta};

/// Scores matches with a pretrained LightGBM learning-to-rank model.
///
/// The model is loaded once at construction and only read afterwards, so a
/// ranker can be shared between threads without locking.
pub struct LightGbmRanker {
    booster: Box<dyn Booster>,
    feature_names: Vec<String>,
}

impl std::fmt::Debug for LightGbmRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightGbmRanker")
            .field("num_features", &self.booster.num_features())
            .field("feature_names", &self.feature_names)
            .finish()
    }
}

impl LightGbmRanker {
    /// Load the model at `params.model_path`.
    ///
    /// Fails with [`Error::PretrainedModelMissing`] when the path is unset or
    /// does not exist. That failure is permanent for these parameters.
    pub fn new(params: &RankerParams) -> Result<Self> {
        let path = match &params.model_path {
            Some(path) if path.exists() => path,
            _ => {
                return Err(Error::PretrainedModelMissing {
                    path: params.model_path.clone(),
                });
            }
        };
        let model = LightGbmModel::load(path)?;
        Ok(Self::with_booster(Box::new(model), params.feature_names.clone()))
    }

    /// Wrap an already loaded booster.
    pub fn with_booster(booster: Box<dyn Booster>, feature_names: Vec<String>) -> Self {
        if let Some(model_names) = booster.feature_names() {
            if model_names != feature_names.as_slice() {
                warn!(
                    "Configured feature names {:?} differ from the model's {:?}; columns are fed in configured order",
                    feature_names, model_names
                );
            }
        }
        info!(
            "LightGbmRanker ready with {} features: {:?}",
            feature_names.len(),
            feature_names
        );
        Self {
            booster,
            feature_names,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Metadata keys the host must populate on every match before scoring.
    pub fn required_keys(&self) -> Vec<String> {
        required_keys(&self.feature_names)
    }

    /// The `matches x features` matrix handed to the model.
    pub fn features_dataset(&self, match_meta: &MatchMeta) -> Result<Array2<f64>> {
        features_dataset(match_meta, &self.feature_names)
    }

    /// Score every match in one batched prediction.
    ///
    /// `query_meta` and `old_match_scores` are accepted for interface
    /// compatibility and not used. The i-th score belongs to the i-th match
    /// in iteration order, whatever its id.
    pub fn score(
        &self,
        _query_meta: &QueryMeta,
        _old_match_scores: &HashMap<MatchId, f64>,
        match_meta: &MatchMeta,
    ) -> Result<Vec<MatchScore>> {
        if match_meta.is_empty() {
            return Ok(Vec::new());
        }

        let dataset = self.features_dataset(match_meta)?;
        let scores = self.booster.predict(dataset.view())?;
        if scores.len() != match_meta.len() {
            return Err(Error::UnsupportedModel(format!(
                "booster returned {} scores for {} matches",
                scores.len(),
                match_meta.len()
            )));
        }
        debug!("Scored {} matches", scores.len());

        Ok(match_meta
            .ids()
            .zip(scores.iter())
            .map(|(match_id, &score)| MatchScore { match_id, score })
            .collect())
    }
}
