//! Questionnaire processing service (qss-qp) - Main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use qss_common::config::{CliOverrides, ConfigResolver};
use qss_common::store::{MemoryStore, SqliteStore};
use qss_common::RecordStore;
use tokio::signal;
use tracing::{info, warn};

use qss_qp::{build_router, logging, AppState, Dispatcher, HttpChatbot, RetryPolicy};

/// Command-line arguments for qss-qp
#[derive(Parser, Debug)]
#[command(name = "qss-qp")]
#[command(about = "Questionnaire processing service")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/qss/config.toml)
    #[arg(short, long, env = "QSS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(short, long, env = "QSS_LISTEN_ADDR")]
    listen: Option<String>,

    /// SQLite database file; records stay in memory when unset
    #[arg(short, long, env = "QSS_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Base URL visits are fetched back from
    #[arg(long, env = "QSS_VISIT_SOURCE_BASE")]
    visit_source: Option<String>,

    /// Endpoint normalized results are POSTed to
    #[arg(long, env = "QSS_CHATBOT_URL")]
    chatbot_url: Option<String>,

    /// Fetch attempts per visit
    #[arg(long, env = "QSS_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "QSS_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_file: args.config,
            listen_addr: args.listen,
            database_path: args.database,
            visit_source_base: args.visit_source,
            chatbot_url: args.chatbot_url,
            max_retries: args.max_retries,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before config resolution, which logs
    let log_level = logging::init(args.log_level.as_deref()).context("Failed to initialize tracing")?;

    let config = ConfigResolver::new(args.into())
        .resolve()
        .context("Failed to resolve configuration")?;
    log_level.apply(&config.log_level);

    info!("Starting qss-qp on {}", config.listen_addr);
    info!(
        visit_source = %config.visit_source_base,
        chatbot = %config.chatbot_url,
        max_retries = config.retry.max_retries,
        "Dispatch configured"
    );

    let store: Arc<dyn RecordStore> = match &config.database_path {
        Some(path) => {
            info!("Database: {}", path.display());
            Arc::new(
                SqliteStore::open(path)
                    .await
                    .context("Failed to open database")?,
            )
        }
        None => {
            warn!("No database path configured, records are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let policy = RetryPolicy::from(config.retry);
    let client = reqwest::Client::new();
    let chatbot = Arc::new(HttpChatbot::new(
        client.clone(),
        config.chatbot_url.clone(),
        policy.timeout,
    ));
    let dispatcher = Dispatcher::new(client, config.visit_source_base.clone(), policy, chatbot);

    let app = build_router(AppState::new(store, dispatcher));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    info!("Listening on {}", config.listen_addr);

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
