//! Predict-only interface to a pretrained boosted-tree model.
use ndarray::{Array1, ArrayView2};

use crate::error::Result;

/// A loaded, immutable tree ensemble.
///
/// Implementations must be pure: the same rows always yield the same scores,
/// and `predict` never mutates the model, so a single booster can be shared
/// across threads.
pub trait Booster: Send + Sync {
    /// Number of input columns the model reads.
    fn num_features(&self) -> usize;

    /// Score every row of `features` in one batched call, in row order.
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array1<f64>>;

    /// Feature names recorded in the model, when the format stores them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}
