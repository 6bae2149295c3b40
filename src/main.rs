mod replay;

use std::path::PathBuf;

use canvas::config::CanvasConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::replay::ReplayError;

#[derive(Parser, Debug)]
#[command(name = "canvas-studio", about = "Replay recorded canvas sessions through the interaction engine")]
struct Cli {
    /// Session file: a JSON array of recorded input events.
    #[arg(env = "CANVAS_SESSION")]
    session: PathBuf,

    /// Canvas element width in CSS pixels.
    #[arg(long, env = "CANVAS_WIDTH", default_value_t = 1280.0)]
    width: f64,

    /// Canvas element height in CSS pixels.
    #[arg(long, env = "CANVAS_HEIGHT", default_value_t = 800.0)]
    height: f64,

    /// Print the summary on a single line.
    #[arg(long)]
    compact: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ReplayError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CanvasConfig::from_env()?;
    let events = replay::load_session(&cli.session)?;
    tracing::info!(session = %cli.session.display(), events = events.len(), "replaying session");

    let summary = replay::run(events, config, cli.width, cli.height).await;
    let out = if cli.compact {
        serde_json::to_string(&summary)?
    } else {
        serde_json::to_string_pretty(&summary)?
    };
    println!("{out}");
    Ok(())
}
