//! HTTP/WebSocket API for the party hub.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: Middleware for CORS
//! - **Actor Model**: Room state managed by dedicated actor tasks behind the hub
//!
//! # Modules
//!
//! - [`rooms`]: Lobby browser and leaderboard
//! - [`websocket`]: The game protocol, one JSON command or message per frame
//! - [`rate_limiter`]: Per-connection command throttling
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                                - Health check
//! GET  /api/v1/rooms                          - List live rooms
//! GET  /api/v1/leaderboard?game=&limit=&offset=&search= - Top players
//! GET  /api/v1/leaderboard/{name}?game=       - One player's rank
//! GET  /ws                                    - WebSocket game protocol
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ph_server::api::{AppState, create_router};
//! use party_hub::{GameHub, HubSettings};
//! use std::net::SocketAddr;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState::new(GameHub::new(HubSettings::default()), vec![]);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(
//!     listener,
//!     app.into_make_service_with_connect_info::<SocketAddr>(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod rate_limiter;
pub mod rooms;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use party_hub::{GameHub, auth::Capability};
use serde_json::json;
use std::{
    net::IpAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub hub: GameHub,
    /// Peer addresses granted admin capability on connect
    pub admin_origins: Arc<Vec<IpAddr>>,
    /// Open WebSocket connections
    pub connections: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(hub: GameHub, admin_origins: Vec<IpAddr>) -> Self {
        Self {
            hub,
            admin_origins: Arc::new(admin_origins),
            connections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Capability a peer gets before logging in.
    pub fn origin_capability(&self, ip: IpAddr) -> Capability {
        let ip = ip.to_canonical();
        if self.admin_origins.iter().any(|origin| origin.to_canonical() == ip) {
            Capability::Admin
        } else {
            Capability::Player
        }
    }

    pub fn active_connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with the hub
///
/// # Returns
///
/// Configured Axum router ready to serve requests. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so `/ws` can see
/// the peer address.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/rooms", get(rooms::list_rooms))
        .route("/leaderboard", get(rooms::leaderboard))
        .route("/leaderboard/{name}", get(rooms::standing));

    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","rooms":{"active_count":3},"connections":7,...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let room_count = state.hub.rooms().room_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active_count": room_count,
            "max": state.hub.rooms().settings().max_rooms,
        },
        "connections": state.active_connections(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
