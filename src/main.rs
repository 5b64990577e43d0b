//! Cell Router
//!
//! ```text
//!                      ┌───────────────────────────────────────────┐
//!   POST /api/route    │               CELL ROUTER                 │
//!   ───────────────────┼─▶ track ─▶ dispatcher ─▶ auth ─▶ registry │
//!                      │                                  │        │
//!                      │                                  ▼        │      nginx-1
//!   ◀──────────────────┼── headers ◀── response ◀── upstream client ┼────▶ nginx-2
//!                      │                                           │      nginx-N
//!                      │   /health  /ready  /metrics  /            │
//!                      └───────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cell_router::config::load_config;
use cell_router::lifecycle::signals::wait_for_signal;
use cell_router::observability::logging;
use cell_router::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "cell-router", version, about = "Routes requests to cell upstreams by cell ID")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init(&config.observability)?;

    tracing::info!(
        service = %config.service.name,
        version = %config.service.version,
        "cell-router starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstreams = config.upstreams.len(),
        auth_enabled = config.auth.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
