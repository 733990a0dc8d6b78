//! invx-hub - live invoice metrics hub
//!
//! Accepts recognizer output for processed invoices, records one metric
//! sample per document and pushes rolling summaries to dashboard viewers
//! over WebSocket.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use invx_common::config::{ConfigOverrides, HubConfig};
use invx_common::db::init_database;
use invx_hub::store::{InMemoryMetricStore, MetricStore, SqliteMetricStore};
use invx_hub::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for invx-hub
#[derive(Parser, Debug)]
#[command(name = "invx-hub")]
#[command(about = "Live invoice processing metrics hub")]
#[command(version)]
struct Args {
    /// Address to listen on (e.g. 127.0.0.1:5780)
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database holding metric samples
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Outbound message queue length per viewer
    #[arg(long)]
    outbound_buffer: Option<usize>,

    /// Keep samples in memory only (lost on restart)
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invx_hub=debug,invx_common=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delays
    info!(
        "Starting invx-hub v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = HubConfig::resolve(ConfigOverrides {
        bind_addr: args.bind,
        db_path: args.database,
        outbound_buffer: args.outbound_buffer,
    })
    .context("Failed to resolve configuration")?;

    let store: Arc<dyn MetricStore> = if args.memory_store {
        warn!("Using in-memory metric store; samples are lost on restart");
        Arc::new(InMemoryMetricStore::new())
    } else {
        info!("Database path: {}", config.db_path.display());
        let pool = init_database(&config.db_path)
            .await
            .context("Failed to initialize metrics database")?;
        Arc::new(SqliteMetricStore::new(pool))
    };

    let state = AppState::new(store, config.outbound_buffer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("invx-hub listening on http://{}", config.bind_addr);
    info!("Viewer socket: ws://{}/ws", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
            Ok(mut sig) => {
                sig.recv().await;
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
