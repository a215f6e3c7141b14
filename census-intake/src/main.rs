//! census-intake - census spreadsheet ingestion service
//!
//! Accepts member census spreadsheets through an HTTP upload endpoint and,
//! when a watch root is configured, from files dropped into that directory
//! tree. Every file is archived verbatim and re-published as a cleaned,
//! deduplicated xlsx artifact.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use census_common::config::{ensure_root_folder, TomlConfig};
use census_common::events::EventBus;
use census_intake::config::{CliOverrides, IntakeConfig};
use census_intake::store::SqliteArtifactStore;
use census_intake::watcher::spawn_watcher;
use census_intake::AppState;

/// Command-line arguments for census-intake
#[derive(Parser, Debug)]
#[command(name = "census-intake")]
#[command(about = "Census spreadsheet ingestion service")]
#[command(version)]
struct Args {
    /// Folder holding the census database
    #[arg(short, long, env = "CENSUS_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Directory tree to watch for dropped files (watcher disabled if unset)
    #[arg(short, long, env = "CENSUS_WATCH_ROOT")]
    watch_root: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "CENSUS_BIND_ADDRESS")]
    bind: Option<String>,

    /// TOML configuration file (default: ~/.config/census/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = match &args.config {
        Some(path) => TomlConfig::load_from(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => TomlConfig::load_or_default(),
    };

    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "census_intake={level},census_common={level},tower_http={level}",
                    level = level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting census-intake");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = IntakeConfig::resolve(
        CliOverrides {
            root_folder: args.root_folder.as_deref(),
            watch_root: args.watch_root.as_deref(),
            bind_address: args.bind.as_deref(),
        },
        &toml_config,
    )
    .context("Invalid configuration")?;

    ensure_root_folder(&config.root_folder).context("Failed to initialize root folder")?;
    info!("Database: {}", config.database_path.display());

    let pool = census_common::db::init_database(&config.database_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);
    let store = Arc::new(SqliteArtifactStore::new(pool));
    let state = AppState::new(store, config.dedup_key.clone(), event_bus)
        .with_watcher_enabled(config.watcher.is_some());
    info!("Dedup key: {}", config.dedup_key);

    let cancel = CancellationToken::new();

    let watcher = match &config.watcher {
        Some(watcher_config) => Some(
            spawn_watcher(watcher_config.clone(), state.pipeline.clone(), cancel.clone())
                .context("Failed to start directory watcher")?,
        ),
        None => {
            info!("No watch root configured; directory watcher disabled");
            None
        }
    };

    let app = census_intake::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    cancel.cancel();
    if let Some(watcher) = watcher {
        watcher.join().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
