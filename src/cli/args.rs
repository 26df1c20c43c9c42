use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use craftrank::Interpolation;

#[derive(Parser)]
#[command(name = "craftrank", version, about = "CRAFTRANK CLI")]
pub struct CliArgs {
    /// Enable logging (filter with RUST_LOG, defaults to debug)
    #[arg(long, global = true, default_value_t = false)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resize an image file and write the result as PNG
    Resize(ResizeArgs),
    /// Score matches from a JSON file with a LightGBM model
    Score(ScoreArgs),
}

#[derive(Args)]
pub struct ResizeArgs {
    /// Input image (PNG or JPEG)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target size. Options:
    /// - N: match the shorter edge to N pixels, keeping the aspect ratio
    /// - H,W: resize to exactly H rows and W columns
    #[arg(long, default_value = "224")]
    pub size: String,

    /// Interpolation (nearest, bilinear, bicubic, lanczos)
    #[arg(long, value_enum, default_value_t = Interpolation::Bilinear)]
    pub how: Interpolation,

    /// Channel axis of the produced array
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub channel_axis: i64,

    /// JSON resizer config (target_size, how, channel_axis); replaces the flags above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// LightGBM text model
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Feature names in model column order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// JSON array of {"id": <int>, "features": {<name>: <value>}}
    #[arg(long)]
    pub matches: PathBuf,

    /// JSON ranker config (model_path, feature_names); replaces --model and --features
    #[arg(long)]
    pub config: Option<PathBuf>,
}
