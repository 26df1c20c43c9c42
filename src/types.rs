//! Shared types used by both adapters.
//! Includes `Interpolation`, `TargetSize`, the resizer output `ResizedImage`,
//! and the ranking inputs/outputs `MatchMeta` and `MatchScore`.
use std::collections::HashMap;

use clap::ValueEnum;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a match (candidate retrieval result).
pub type MatchId = i64;

/// Interpolation used when resampling. Filter definitions follow Pillow's
/// `NEAREST`, `BILINEAR`, `BICUBIC` and `LANCZOS`.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Interpolation::Nearest => "NEAREST",
            Interpolation::Bilinear => "BILINEAR",
            Interpolation::Bicubic => "BICUBIC",
            Interpolation::Lanczos => "LANCZOS",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NEAREST" => Ok(Interpolation::Nearest),
            "BILINEAR" => Ok(Interpolation::Bilinear),
            "BICUBIC" => Ok(Interpolation::Bicubic),
            "LANCZOS" => Ok(Interpolation::Lanczos),
            _ => Err(Error::invalid("how", s)),
        }
    }
}

/// Output size of the resizer.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TargetSize {
    /// Scale the shorter edge to this length, keeping the aspect ratio.
    Short(u32),
    /// Resize to exactly this height and width.
    Exact { height: u32, width: u32 },
}

impl Default for TargetSize {
    fn default() -> Self {
        TargetSize::Short(224)
    }
}

impl TargetSize {
    /// Parse the loosely typed configuration form: an integer, or an array of
    /// exactly two integers `[height, width]`.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let reject = || Error::invalid("target_size", value);
        let dim = |v: &serde_json::Value| -> Result<u32> {
            v.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|&n| n > 0)
                .ok_or_else(reject)
        };

        match value {
            serde_json::Value::Number(_) => Ok(TargetSize::Short(dim(value)?)),
            serde_json::Value::Array(items) if items.len() == 2 => Ok(TargetSize::Exact {
                height: dim(&items[0])?,
                width: dim(&items[1])?,
            }),
            _ => Err(reject()),
        }
    }
}

impl std::fmt::Display for TargetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetSize::Short(s) => write!(f, "{}", s),
            TargetSize::Exact { height, width } => write!(f, "{}x{}", height, width),
        }
    }
}

/// Output record of [`crate::ImageResizer::craft`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResizedImage {
    /// Always zero; no crop offset is computed.
    pub offset: usize,
    pub blob: ArrayD<f32>,
}

/// One scored match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub match_id: MatchId,
    pub score: f64,
}

/// Per-match feature values, keyed by feature name.
pub type FeatureValues = HashMap<String, f64>;

/// Per-query metadata passed alongside the matches.
pub type QueryMeta = HashMap<String, serde_json::Value>;

/// Ordered mapping from match id to its feature values.
///
/// Iteration order is insertion order; it defines the row order of the
/// assembled feature matrix. Inserting an id that is already present
/// replaces its values in place. Serialized as a list of [`MatchEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MatchEntry>", into = "Vec<MatchEntry>")]
pub struct MatchMeta {
    entries: Vec<MatchEntry>,
    // id -> position in `entries`
    index: HashMap<MatchId, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub id: MatchId,
    pub features: FeatureValues,
}

impl MatchMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, id: MatchId, features: FeatureValues) {
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].features = features,
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push(MatchEntry { id, features });
            }
        }
    }

    pub fn get(&self, id: MatchId) -> Option<&FeatureValues> {
        self.index.get(&id).map(|&pos| &self.entries[pos].features)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MatchId, &FeatureValues)> {
        self.entries.iter().map(|e| (e.id, &e.features))
    }
}

impl FromIterator<(MatchId, FeatureValues)> for MatchMeta {
    fn from_iter<I: IntoIterator<Item = (MatchId, FeatureValues)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut meta = MatchMeta::with_capacity(iter.size_hint().0);
        for (id, features) in iter {
            meta.insert(id, features);
        }
        meta
    }
}

impl From<Vec<MatchEntry>> for MatchMeta {
    fn from(entries: Vec<MatchEntry>) -> Self {
        entries.into_iter().map(|e| (e.id, e.features)).collect()
    }
}

impl From<MatchMeta> for Vec<MatchEntry> {
    fn from(meta: MatchMeta) -> Self {
        meta.entries
    }
}
