//! Core building blocks: resize and axis primitives, feature-matrix assembly,
//! the `Booster` seam, and configuration parameters. These are internal
//! primitives consumed by the adapters in the `api` module.
pub mod booster;
pub mod params;
pub mod processing;
