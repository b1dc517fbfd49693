//! Render a map description to a PNG file.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use renderer::MapConfig;
use tiles_common::TileCoord;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "render-map")]
#[command(about = "Render a styled map description to a PNG image")]
struct Args {
    /// Map description (YAML, or JSON by extension)
    #[arg(short, long)]
    config: PathBuf,

    /// Output PNG path
    #[arg(short, long, default_value = "map.png")]
    output: PathBuf,

    /// Render slippy tile z/x/y instead of the configured extent
    #[arg(long)]
    tile: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = MapConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(tile) = &args.tile {
        let tile = TileCoord::parse(tile).ok_or_else(|| anyhow!("invalid tile '{}', expected z/x/y", tile))?;
        config.tile = Some(tile);
        config.projection = None;
        config.bounds = None;
        config.width = None;
        config.height = None;
    }

    let base_dir = args
        .config
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let mut map = config.build(&base_dir)?;

    map.render_to_file(&args.output)
        .with_context(|| format!("rendering {}", args.output.display()))?;

    info!(output = %args.output.display(), status = %map.status(), "done");
    Ok(())
}
