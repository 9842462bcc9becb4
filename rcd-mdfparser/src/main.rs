//! rcd-mdfparser - Metadata and IMU artifact processor
//!
//! Synchronizes raw metadata (MDF or camera health check output) of one
//! recording, computes its recording overview and stores the signals next to
//! the artifact. Also resamples raw IMU artifacts.
//!
//! Prints the outcome of the request as JSON on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rcd_common::config::{resolve_store_root, ConfigResolver};
use rcd_common::imu::ImuSource;
use rcd_common::store::{ArtifactStore, LocalStore};
use rcd_mdfparser::imu::{ImuHandler, ImuTransformer};
use rcd_mdfparser::{MetadataHandler, ProcessorSet, SourceKind, TimeBucketSynchronizer};
use tracing::info;

/// Command-line arguments for rcd-mdfparser
#[derive(Parser, Debug)]
#[command(name = "rcd-mdfparser")]
#[command(about = "Metadata synchronization and IMU resampling for recordings")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "RCD_CONFIG")]
    config: Option<PathBuf>,

    /// Artifact store root folder
    #[arg(short, long, env = "RCD_STORE_ROOT")]
    store_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synchronize a metadata artifact and compute its recording overview
    Metadata {
        /// Artifact path relative to the store root
        path: String,

        /// Format of the artifact (mdf or chc)
        #[arg(long, default_value = "mdf")]
        kind: SourceKind,

        /// Camera health check output of the same recording to merge in
        #[arg(long)]
        chc: Option<String>,
    },

    /// Resample a raw IMU artifact
    Imu {
        /// Artifact path relative to the store root
        path: String,

        #[arg(long)]
        tenant: String,

        #[arg(long)]
        device_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new("mdfparser")
        .resolve(args.config.as_deref())
        .context("Failed to load configuration")?;
    rcd_common::logging::init(&config.logging);

    info!(
        "Starting rcd-mdfparser v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let store_root = resolve_store_root(args.store_root.as_deref(), &config);
    info!("Artifact store: {}", store_root.display());
    let store: Arc<dyn ArtifactStore> = Arc::new(LocalStore::new(store_root));

    let output = match args.command {
        Command::Metadata { path, kind, chc } => {
            let handler = MetadataHandler::new(
                store,
                TimeBucketSynchronizer::new(&config.mdfparser),
                ProcessorSet::with_defaults(),
            );
            let mut sources = vec![(path.as_str(), kind)];
            if let Some(chc) = chc.as_deref() {
                sources.push((chc, SourceKind::Chc));
            }
            let outcome = handler
                .process_sources(&sources)
                .await
                .with_context(|| format!("Failed to process metadata {}", path))?;
            serde_json::to_string_pretty(&outcome)?
        }
        Command::Imu {
            path,
            tenant,
            device_id,
        } => {
            let handler = ImuHandler::new(store, ImuTransformer::new(&config.mdfparser));
            let source = ImuSource { device_id, tenant };
            let outcome = handler
                .process_request(&path, &source)
                .await
                .with_context(|| format!("Failed to process IMU {}", path))?;
            serde_json::to_string_pretty(&outcome)?
        }
    };

    println!("{}", output);
    Ok(())
}
