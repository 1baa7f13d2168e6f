//! Structured logging configuration.
//!
//! Installs a `tracing` subscriber that also captures `log` records from the
//! game library, and provides helpers for the events operators search for.

use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from the `RUST_LOG` env var, defaulting to `info`.
///
/// # Example
///
/// ```no_run
/// use ph_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a connection opening or closing
///
/// # Arguments
///
/// * `event_type` - `connected` or `disconnected`
/// * `player_id` - Connection identity
/// * `peer` - Remote address
pub fn log_connection_event(event_type: &str, player_id: &str, peer: SocketAddr) {
    tracing::info!(
        event_type = event_type,
        player_id = player_id,
        peer = %peer,
        "Connection {}",
        event_type
    );
}

/// Log a command that needed more than player capability
///
/// # Example
///
/// ```
/// use ph_server::logging::log_privileged_command;
///
/// log_privileged_command("4f0c", "admin", "endGame", Some("ABCD"), true);
/// ```
pub fn log_privileged_command(
    player_id: &str,
    capability: &str,
    command: &str,
    room_code: Option<&str>,
    accepted: bool,
) {
    if accepted {
        tracing::info!(
            player_id = player_id,
            capability = capability,
            command = command,
            room_code = room_code,
            "PRIVILEGED: command applied"
        );
    } else {
        tracing::warn!(
            player_id = player_id,
            capability = capability,
            command = command,
            room_code = room_code,
            "PRIVILEGED: command refused"
        );
    }
}

/// Log a connection being throttled
pub fn log_rate_limited(player_id: &str, peer: SocketAddr) {
    tracing::warn!(
        player_id = player_id,
        peer = %peer,
        "Rate limit exceeded"
    );
}
