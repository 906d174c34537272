//! # Guildgate Server
//!
//! Main binary that wires the authorization core into a running service:
//! - Layered configuration (defaults, config file, environment)
//! - Structured logging
//! - The process-wide liveness sampler
//! - The REST API
//!
//! The sampler is owned by the API state for the life of the process and
//! stopped on shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use guildgate_api::{build_router, AppState};
use guildgate_common::{
    config::{self, LogConfig},
    guilds::{GuildViewAggregator, IconCdn},
    sampler::RateSampler,
};

#[derive(Debug, Parser)]
#[command(name = "guildgate", version, about = "Dashboard authorization engine")]
struct Args {
    /// Path to a config file (without extension); defaults to ./config if present
    #[arg(short, long, env = "GUILDGATE_CONFIG")]
    config: Option<String>,
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log.filter.as_str().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = config::load(args.config.as_deref())?;

    // Initialize tracing (structured logging)
    init_tracing(&config.log);

    tracing::info!("Starting Guildgate v{}", env!("CARGO_PKG_VERSION"));

    // === Liveness sampler ===
    let liveness = RateSampler::new(&config.sampler);
    let sampler_task = liveness.spawn();

    // === REST API ===
    let state = AppState::new(
        liveness,
        GuildViewAggregator::new(IconCdn::new(config.guilds.cdn_base_url.clone())),
        Duration::from_secs(config.server.request_timeout_secs),
    );
    let router = build_router(state);
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = sampler_task {
        task.abort();
    }
    tracing::info!("Guildgate stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
