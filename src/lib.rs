#![doc = r#"
CRAFTRANK — image resizing and learned-ranking adapters for document-processing
pipelines.

The crate holds two independent adapters. Each one is configured once,
validated at construction, and then called with a single synchronous,
read-only operation:

- [`ImageResizer`] resizes a decoded pixel buffer (shorter-edge or exact
  `[height, width]`) with nearest, bilinear, bicubic or Lanczos resampling and
  returns `{ offset: 0, blob: f32 array }` with the channel axis where it was
  configured.
- [`LightGbmRanker`] loads a LightGBM learning-to-rank model, assembles the
  `matches x features` matrix from per-match metadata, scores it in one batch
  and pairs each score with its match id.

Add dependency
--------------
```toml
[dependencies]
craftrank = "0.1"
```

Resize an image
---------------
```rust
use ndarray::Array3;
use craftrank::{ImageResizer, ResizerParams};

fn main() -> craftrank::Result<()> {
    let resizer = ImageResizer::new(&ResizerParams {
        target_size: serde_json::json!(112),
        how: "BICUBIC".to_string(),
        channel_axis: -1,
    })?;

    let image = Array3::<u8>::zeros((480, 640, 3));
    let out = resizer.craft(image.view().into_dyn())?;
    assert_eq!(out.offset, 0);
    assert_eq!(out.blob.shape(), &[112, 149, 3]);
    Ok(())
}
```

Score matches
-------------
```rust,no_run
use std::collections::HashMap;
use craftrank::{LightGbmRanker, MatchMeta, QueryMeta, RankerParams};

fn main() -> craftrank::Result<()> {
    let ranker = LightGbmRanker::new(&RankerParams::new(
        "/models/ltr.txt",
        &["bm25", "freshness"],
    ))?;
    assert_eq!(ranker.required_keys(), vec!["tag_bm25", "tag_freshness"]);

    let mut matches = MatchMeta::new();
    matches.insert(0, HashMap::from([("bm25".into(), 12.5), ("freshness".into(), 0.3)]));
    matches.insert(1, HashMap::from([("bm25".into(), 7.0), ("freshness".into(), 0.9)]));

    for s in ranker.score(&QueryMeta::new(), &HashMap::new(), &matches)? {
        println!("match {} -> {}", s.match_id, s.score);
    }
    Ok(())
}
```

Error handling
--------------
All public functions return `craftrank::Result<T>`. Configuration problems
(`Error::InvalidArgument`) and a missing model file
(`Error::PretrainedModelMissing`) are raised by the constructors and are
permanent; `Error::MissingFeature` is raised per call and no partial scores
are returned.

Logging
-------
The library emits `tracing` events (including a deprecation notice when an
`ImageResizer` is built) and never installs a subscriber; without one the
events are dropped.

Useful modules
--------------
- [`api`] — the two adapters.
- [`types`] — `Interpolation`, `TargetSize`, `MatchMeta`, `MatchScore`, `ResizedImage`.
- [`core`] — resize/axis primitives, feature assembly, the `Booster` trait, parameters.
- [`io`] — LightGBM text-model reader and image decode/encode helpers.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use api::{ImageResizer, LightGbmRanker};
pub use crate::core::booster::Booster;
pub use crate::core::params::{RankerParams, ResizerParams};
pub use error::{Error, Result};
pub use io::lightgbm::LightGbmModel;
pub use types::{
    FeatureValues, Interpolation, MatchEntry, MatchId, MatchMeta, MatchScore, QueryMeta,
    ResizedImage, TargetSize,
};
