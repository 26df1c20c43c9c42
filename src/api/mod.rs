//! High-level adapters: construct from parameters, then call. Prefer these
//! entrypoints over the low-level `core` primitives when integrating.
//!
//! - [`ImageResizer`]: resize decoded image buffers, returning `{offset, blob}`.
//! - [`LightGbmRanker`]: score matches with a pretrained LightGBM model.
pub mod ranker;
pub mod resizer;

pub use ranker::LightGbmRanker;
pub use resizer::ImageResizer;
