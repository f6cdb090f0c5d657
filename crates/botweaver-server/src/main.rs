//! # BotWeaver Server
//!
//! Serves the BotWeaver API and hosts generated bots on this machine. On
//! shutdown every hosted bot is stopped before the process exits.

use botweaver_api::{AppState, build_router};
use botweaver_supervisor::{ProcessSupervisor, SupervisorConfig};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "botweaver")]
#[command(author, version, about = "Self-hosted Discord bot builder")]
struct Args {
    /// Address to bind (overrides `server.host`).
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on (overrides `server.port`).
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Root for per-run staging directories (overrides `supervisor.staging_dir`).
    #[arg(long)]
    staging_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    botweaver_common::config::init()?;
    let config = botweaver_common::config::get();

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botweaver=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting BotWeaver v{}", env!("CARGO_PKG_VERSION"));

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);

    let mut supervisor_config = SupervisorConfig::from(&config.supervisor);
    if let Some(dir) = args.staging_dir {
        supervisor_config.staging_root = dir;
    }
    tokio::fs::create_dir_all(&supervisor_config.staging_root).await?;
    tracing::info!(
        staging = %supervisor_config.staging_root.display(),
        install = ?supervisor_config.install_command,
        runtime = ?supervisor_config.runtime_command,
        "Process supervisor ready"
    );

    let supervisor = ProcessSupervisor::new(supervisor_config);
    let router = build_router(AppState::new(supervisor.clone(), config.server.body_limit_bytes));

    let addr = SocketAddr::new(host.parse()?, port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{addr}/api");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down; stopping hosted bots");
    supervisor.shutdown().await;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
