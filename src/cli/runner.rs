use std::collections::HashMap;
use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

use craftrank::io::raster::save_blob_png;
use craftrank::{
    ImageResizer, LightGbmRanker, MatchEntry, MatchMeta, QueryMeta, RankerParams, ResizerParams,
};

use super::args::{CliArgs, Command, ResizeArgs, ScoreArgs};
use super::errors::AppError;

fn parse_size(size: &str) -> Result<serde_json::Value, AppError> {
    let invalid = || AppError::InvalidSize {
        size: size.to_string(),
    };
    let parts = size
        .split(',')
        .map(|p| p.trim().parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    match parts.as_slice() {
        [short] => Ok(serde_json::json!(short)),
        [height, width] => Ok(serde_json::json!([height, width])),
        _ => Err(invalid()),
    }
}

fn run_resize(args: ResizeArgs) -> Result<(), AppError> {
    let params = match &args.config {
        Some(path) => ResizerParams::from_json_file(path)?,
        None => ResizerParams {
            target_size: parse_size(&args.size)?,
            how: args.how.to_string(),
            channel_axis: args.channel_axis,
        },
    };
    let resizer = ImageResizer::new(&params)?;

    let bytes = fs::read(&args.input)?;
    let out = resizer.craft_encoded(&bytes)?;
    info!(
        "Resized {:?}: blob shape {:?}, offset {}",
        args.input,
        out.blob.shape(),
        out.offset
    );

    save_blob_png(out.blob.view(), params.channel_axis, &args.output)?;
    info!("Successfully wrote: {:?}", args.output);
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let params = match &args.config {
        Some(path) => RankerParams::from_json_file(path)?,
        None => RankerParams {
            model_path: args.model.clone(),
            feature_names: args.features.clone(),
        },
    };
    if params.feature_names.is_empty() {
        return Err(AppError::MissingArgument {
            arg: "--features".to_string(),
        });
    }
    let ranker = LightGbmRanker::new(&params)?;

    let text = fs::read_to_string(&args.matches)?;
    let entries: Vec<MatchEntry> = serde_json::from_str(&text)?;
    let match_meta = MatchMeta::from(entries);
    info!("Scoring {} matches from {:?}", match_meta.len(), args.matches);

    let scores = ranker.score(&QueryMeta::new(), &HashMap::new(), &match_meta)?;
    println!("{}", serde_json::to_string_pretty(&scores)?);
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match args.command {
        Command::Resize(resize) => run_resize(resize)?,
        Command::Score(score) => run_score(score)?,
    }
    Ok(())
}
