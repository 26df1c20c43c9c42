//! I/O layer: the LightGBM text-model reader behind the ranker, and image
//! decode/encode helpers used by `ImageResizer::craft_encoded` and the CLI.
pub mod raster;
pub mod lightgbm;

pub use lightgbm::{LightGbmModel, OutputTransform};
