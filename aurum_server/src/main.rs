//! Gold price prediction server
//!
//! Loads configuration and artifacts, then serves the prediction API.
//! Startup fails if any artifact cannot be loaded.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use aurum_server::{logging, run_server, AppConfig, AppState};

/// Gold price prediction server
#[derive(Parser, Debug)]
#[command(name = "aurum-server", about = "Gold closing price prediction API")]
struct Args {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit JSON logs regardless of configuration.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config)?;

    logging::init_tracing(args.json_logs || config.logging.json)?;

    let paths = config.artifact_paths();
    tracing::info!(
        model = %paths.model.display(),
        feature_list = %paths.feature_list.display(),
        dataset = %paths.dataset.display(),
        imputation = ?config.imputation.policy,
        "loading prediction artifacts"
    );

    let state = AppState::load(paths, config.load_options())
        .context("failed to load prediction artifacts")?;
    let addr = config.server.socket_addr()?;

    run_server(Arc::new(state), addr).await
}
