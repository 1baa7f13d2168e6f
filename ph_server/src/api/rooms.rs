//! Lobby browser and leaderboard handlers.
//!
//! Both endpoints are read-only and public. Joining and playing happen over
//! the WebSocket protocol.
//!
//! # Examples
//!
//! List all rooms:
//! ```bash
//! curl http://localhost:6969/api/v1/rooms
//! ```
//!
//! Top ten WildCard players:
//! ```bash
//! curl "http://localhost:6969/api/v1/leaderboard?game=wildCard&limit=10"
//! ```
//!
//! Second page, or names containing "ali":
//! ```bash
//! curl "http://localhost:6969/api/v1/leaderboard?limit=10&offset=10"
//! curl "http://localhost:6969/api/v1/leaderboard?search=ali"
//! ```
//!
//! One player's rank:
//! ```bash
//! curl http://localhost:6969/api/v1/leaderboard/alice
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use party_hub::{
    GameKind, RoomSummary,
    auth::{LeaderboardEntry, Standing},
};
use serde::Deserialize;

use super::AppState;

/// Largest page the leaderboard endpoint returns.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// `wildCard` or `awfulAnswers`; overall ranking when absent
    pub game: Option<GameKind>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Case-insensitive name filter; ignores `offset`
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StandingQuery {
    pub game: Option<GameKind>,
}

/// List every live room.
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.hub.list_rooms().await)
}

/// Top players by points, per game or overall.
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<Vec<LeaderboardEntry>> {
    let limit = query
        .limit
        .unwrap_or(MAX_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    let entries = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            state.hub.search_leaderboard(term, query.game, limit).await
        }
        _ => {
            state
                .hub
                .leaderboard(query.game, limit, query.offset.unwrap_or(0))
                .await
        }
    };
    Json(entries)
}

/// Rank and totals for one display name.
pub async fn standing(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<StandingQuery>,
) -> Result<Json<Standing>, StatusCode> {
    state
        .hub
        .standing(&name, query.game)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
