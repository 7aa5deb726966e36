//! Mission Control Server

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mission_server::http::create_router;
use mission_server::{AppState, Config};

/// Mission Control task board and calendar server.
#[derive(Parser, Debug)]
#[command(name = "mission-server", about = "Task board and calendar server")]
#[command(version)]
struct Args {
    /// HTTP server address
    #[arg(long, env = "MISSION_ADDR", default_value = "127.0.0.1:3000")]
    addr: String,

    /// Directory holding tasks.json and calendar-events.json
    #[arg(long, env = "MISSION_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Run mutations one at a time instead of letting concurrent updates race
    #[arg(long, env = "MISSION_SERIALIZE_WRITES")]
    serialize_writes: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.addr,
            data_dir: args.data_dir,
            serialize_writes: args.serialize_writes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mission_server=info,tower_http=info")),
        )
        .with_target(true)
        .init();

    // Load config
    let config = Config::from(Args::parse());
    let http_addr: SocketAddr = config.bind_addr.parse()?;

    tokio::fs::create_dir_all(&config.data_dir).await.map_err(|e| {
        format!(
            "Failed to create data directory '{}': {}",
            config.data_dir.display(),
            e
        )
    })?;

    let state = AppState::from_config(&config);

    info!(
        http_addr = %http_addr,
        tasks = %config.tasks_path().display(),
        calendar = %config.calendar_path().display(),
        serialize_writes = config.serialize_writes,
        "Starting Mission Control server"
    );

    let listener = TcpListener::bind(http_addr).await?;
    info!("HTTP server listening on {}", http_addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Mission Control server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
