use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cellpick::app::coverage::spawn_coverage_responder;
use cellpick::persistence::load_session_from_path;
use cellpick::{run_cellpick, CellPickConfig, FeatureCountController, SelectionConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick grid cells on a map and copy the selection token.", long_about = None)]
struct Cli {
    /// Engine settings (YAML, or JSON with a `.json` extension).
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Initial map extent.
    #[arg(long, num_args = 4, value_names = ["WEST", "SOUTH", "EAST", "NORTH"], allow_negative_numbers = true)]
    bounds: Option<Vec<f64>>,

    /// Saved session to restore on startup.
    #[arg(long, short = 's')]
    session: Option<PathBuf>,

    #[arg(long, default_value = "Cell selection")]
    title: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut selection = match &cli.config {
        Some(path) => SelectionConfig::load(path)?,
        None => SelectionConfig::default(),
    };
    if let Some(b) = &cli.bounds {
        selection.initial_bounds = [b[0], b[1], b[2], b[3]];
    }

    let initial_session = match &cli.session {
        Some(path) => Some(load_session_from_path(path)?),
        None => None,
    };

    let feature_counts = FeatureCountController::new();
    spawn_coverage_responder(feature_counts.clone());

    tracing::info!(bounds = ?selection.initial_bounds, "starting cell picker");
    let cfg = CellPickConfig {
        title: cli.title,
        selection,
        initial_session,
        feature_count_controller: Some(feature_counts),
        ..Default::default()
    };
    run_cellpick(cfg)?;
    Ok(())
}
