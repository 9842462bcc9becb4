//! rcd-artifact-api - Processed artifact ingestion
//!
//! Reads a processed IMU artifact from the store and prints the time ranges
//! it covers, together with the recording device, as JSON on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rcd_artifact_api::{ImuGapFinder, ImuIngestor};
use rcd_common::config::{resolve_store_root, ConfigResolver};
use rcd_common::store::LocalStore;
use tracing::info;

/// Command-line arguments for rcd-artifact-api
#[derive(Parser, Debug)]
#[command(name = "rcd-artifact-api")]
#[command(about = "IMU artifact ingestion for recordings")]
#[command(version)]
struct Args {
    /// Processed IMU artifact path relative to the store root
    path: String,

    /// Configuration file
    #[arg(short, long, env = "RCD_CONFIG")]
    config: Option<PathBuf>,

    /// Artifact store root folder
    #[arg(short, long, env = "RCD_STORE_ROOT")]
    store_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new("artifact-api")
        .resolve(args.config.as_deref())
        .context("Failed to load configuration")?;
    rcd_common::logging::init(&config.logging);

    info!(
        "Starting rcd-artifact-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let store = LocalStore::new(resolve_store_root(args.store_root.as_deref(), &config));
    info!("Artifact store: {}", store.root().display());

    let ingestor = ImuIngestor::new(ImuGapFinder::from_settings(&config.artifact_api));
    let outcome = ingestor
        .process_artifact(&store, &args.path)
        .await
        .with_context(|| format!("Failed to ingest IMU {}", args.path))?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
