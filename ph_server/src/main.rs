//! Party hub server using the async room actor model.
//!
//! Spawns one actor per room behind a shared hub and serves the game
//! protocol over WebSocket alongside a small REST surface.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Error;
use log::info;
use party_hub::{GameHub, auth::InMemoryAccounts};
use pico_args::Arguments;
use ph_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};

const HELP: &str = "\
Run the party hub card game server

USAGE:
  ph_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --max-rooms  N           Maximum live rooms          [default: env MAX_ROOMS or 1000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus exporter address, disabled when unset
  MAX_ROOMS                Maximum live rooms
  DEFAULT_CAPACITY         Capacity for rooms created without one (2-10)
  AWFUL_WIN_SCORE          Round wins needed to take an Awful Answers game
  ROOM_TEARDOWN_SECS       Delay before a finished Awful Answers room closes
  CARD_PACK_PATH           JSON prompt/answer pack for Awful Answers
  ACCOUNTS_PATH            JSON accounts file for password logins
  ADMIN_ORIGINS            Comma-separated IPs granted admin on connect
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let max_rooms_override: Option<usize> = pargs.opt_value_from_str("--max-rooms")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, max_rooms_override)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", metrics_bind);
    }

    let mut hub = GameHub::new(config.hub_settings()?);
    if let Some(path) = &config.accounts_path {
        let accounts = InMemoryAccounts::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load accounts from {}: {}", path.display(), e))?;
        info!("Loaded {} account(s) from {}", accounts.len().await, path.display());
        hub = hub.with_authenticator(Arc::new(accounts));
    }

    info!(
        "Room limits: {} rooms, default capacity {}, Awful Answers to {}",
        config.rooms.max_rooms, config.rooms.default_capacity, config.rooms.awful_win_score
    );
    if !config.admin_origins.is_empty() {
        info!("Admin origins: {:?}", config.admin_origins);
    }

    let app = api::create_router(AppState::new(hub, config.admin_origins.clone()));

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
