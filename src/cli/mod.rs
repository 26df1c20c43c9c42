//! Command Line Interface (CLI) layer for CRAFTRANK.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the `resize` and `score`
//! commands. It wires user-provided options to the adapters exposed by the
//! library.
//!
//! If you are embedding the adapters into another application, use
//! `craftrank::api` directly instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
