//! Win tracking and the leaderboard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, ops::RangeInclusive, sync::Arc};
use tokio::sync::RwLock;

use crate::game::GameKind;

/// Points awarded for one game won.
pub const WIN_POINTS: RangeInclusive<u32> = 80..=200;

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub wildcard_wins: u32,
    pub wildcard_points: u32,
    pub awful_answers_wins: u32,
    pub awful_answers_points: u32,
    pub total_wins: u32,
    pub total_points: u32,
    pub last_updated: DateTime<Utc>,
}

impl LeaderboardEntry {
    fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            wildcard_wins: 0,
            wildcard_points: 0,
            awful_answers_wins: 0,
            awful_answers_points: 0,
            total_wins: 0,
            total_points: 0,
            last_updated: Utc::now(),
        }
    }

    /// Points in one game, or across both when `game` is `None`.
    pub fn points(&self, game: Option<GameKind>) -> u32 {
        match game {
            Some(GameKind::WildCard) => self.wildcard_points,
            Some(GameKind::AwfulAnswers) => self.awful_answers_points,
            None => self.total_points,
        }
    }

    /// Wins in one game, or across both when `game` is `None`.
    pub fn wins(&self, game: Option<GameKind>) -> u32 {
        match game {
            Some(GameKind::WildCard) => self.wildcard_wins,
            Some(GameKind::AwfulAnswers) => self.awful_answers_wins,
            None => self.total_wins,
        }
    }
}

/// A player's place on one leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// 1-based; players tied on points share a rank
    pub rank: usize,
    pub entry: LeaderboardEntry,
}

/// Records finished games.
#[async_trait]
pub trait StatsRecorder: Send + Sync {
    /// Credit a win and return the points awarded
    async fn record_win(&self, display_name: &str, game: GameKind) -> u32;

    /// One page of players ranked by points in `game`, or overall when `None`
    async fn page(&self, game: Option<GameKind>, limit: usize, offset: usize)
    -> Vec<LeaderboardEntry>;

    /// Players whose name contains `term`, ignoring case, best first
    async fn search(&self, term: &str, game: Option<GameKind>, limit: usize)
    -> Vec<LeaderboardEntry>;

    /// Where `display_name` stands, if they have ever won
    async fn standing(&self, display_name: &str, game: Option<GameKind>) -> Option<Standing>;

    /// Best `limit` players
    async fn top(&self, game: Option<GameKind>, limit: usize) -> Vec<LeaderboardEntry> {
        self.page(game, limit, 0).await
    }
}

/// Leaderboard held in memory for the life of the process
#[derive(Clone, Default)]
pub struct InMemoryStats {
    entries: Arc<RwLock<HashMap<String, LeaderboardEntry>>>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Highest points first, names breaking ties.
fn rank_entries<'a>(
    entries: impl Iterator<Item = &'a LeaderboardEntry>,
    game: Option<GameKind>,
) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<LeaderboardEntry> = entries.cloned().collect();
    ranked.sort_by(|a, b| {
        b.points(game)
            .cmp(&a.points(game))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    ranked
}

#[async_trait]
impl StatsRecorder for InMemoryStats {
    async fn record_win(&self, display_name: &str, game: GameKind) -> u32 {
        let points = rand::rng().random_range(WIN_POINTS);

        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(display_name.to_string())
            .or_insert_with(|| LeaderboardEntry::new(display_name));
        match game {
            GameKind::WildCard => {
                entry.wildcard_wins += 1;
                entry.wildcard_points += points;
            }
            GameKind::AwfulAnswers => {
                entry.awful_answers_wins += 1;
                entry.awful_answers_points += points;
            }
        }
        entry.total_wins += 1;
        entry.total_points += points;
        entry.last_updated = Utc::now();

        log::info!("{display_name} won {game} for {points} points");
        points
    }

    async fn page(
        &self,
        game: Option<GameKind>,
        limit: usize,
        offset: usize,
    ) -> Vec<LeaderboardEntry> {
        let entries = self.entries.read().await;
        let ranked = rank_entries(entries.values().filter(|e| e.points(game) > 0), game);
        ranked.into_iter().skip(offset).take(limit).collect()
    }

    async fn search(
        &self,
        term: &str,
        game: Option<GameKind>,
        limit: usize,
    ) -> Vec<LeaderboardEntry> {
        let needle = term.trim().to_lowercase();
        let entries = self.entries.read().await;
        let matching = entries
            .values()
            .filter(|e| e.points(game) > 0)
            .filter(|e| e.display_name.to_lowercase().contains(&needle));
        let mut ranked = rank_entries(matching, game);
        ranked.truncate(limit);
        ranked
    }

    async fn standing(&self, display_name: &str, game: Option<GameKind>) -> Option<Standing> {
        let entries = self.entries.read().await;
        let entry = entries.get(display_name)?.clone();
        let mine = entry.points(game);
        let ahead = entries.values().filter(|e| e.points(game) > mine).count();
        Some(Standing {
            rank: ahead + 1,
            entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_win_awards_points_in_range() {
        let stats = InMemoryStats::new();
        for _ in 0..20 {
            let points = stats.record_win("alice", GameKind::WildCard).await;
            assert!(WIN_POINTS.contains(&points));
        }
        let top = stats.top(Some(GameKind::WildCard), 10).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].wildcard_wins, 20);
        assert_eq!(top[0].total_wins, 20);
        assert_eq!(top[0].total_points, top[0].wildcard_points);
    }

    #[tokio::test]
    async fn test_top_filters_by_game() {
        let stats = InMemoryStats::new();
        stats.record_win("alice", GameKind::WildCard).await;
        stats.record_win("bob", GameKind::AwfulAnswers).await;

        let wildcard = stats.top(Some(GameKind::WildCard), 10).await;
        assert_eq!(wildcard.len(), 1);
        assert_eq!(wildcard[0].display_name, "alice");

        let overall = stats.top(None, 10).await;
        assert_eq!(overall.len(), 2);
    }

    #[tokio::test]
    async fn test_top_sorted_and_limited() {
        let stats = InMemoryStats::new();
        for _ in 0..3 {
            stats.record_win("carol", GameKind::AwfulAnswers).await;
        }
        stats.record_win("dave", GameKind::AwfulAnswers).await;
        stats.record_win("erin", GameKind::AwfulAnswers).await;

        let top = stats.top(None, 2).await;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].display_name, "carol");
        assert!(top[0].total_points >= top[1].total_points);
    }

    #[tokio::test]
    async fn test_page_with_offset() {
        let stats = InMemoryStats::new();
        for (name, wins) in [("amy", 8), ("ben", 3), ("cat", 1)] {
            for _ in 0..wins {
                stats.record_win(name, GameKind::WildCard).await;
            }
        }

        // 8 wins always outscore 3, which always outscore 1.
        let second = stats.page(None, 1, 1).await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].display_name, "ben");
        assert!(stats.page(None, 10, 3).await.is_empty());
        assert!(stats.page(Some(GameKind::AwfulAnswers), 10, 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_ignores_case() {
        let stats = InMemoryStats::new();
        stats.record_win("CardShark", GameKind::WildCard).await;
        stats.record_win("sharky", GameKind::AwfulAnswers).await;
        stats.record_win("dolphin", GameKind::WildCard).await;

        let found = stats.search("SHARK", None, 10).await;
        let mut names: Vec<&str> = found.iter().map(|e| e.display_name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["CardShark", "sharky"]);
        assert_eq!(stats.search("shark", None, 1).await.len(), 1);

        let awful = stats.search("shark", Some(GameKind::AwfulAnswers), 10).await;
        assert_eq!(awful.len(), 1);
        assert_eq!(awful[0].display_name, "sharky");
    }

    #[tokio::test]
    async fn test_standing() {
        let stats = InMemoryStats::new();
        for _ in 0..6 {
            stats.record_win("amy", GameKind::WildCard).await;
        }
        stats.record_win("ben", GameKind::WildCard).await;
        stats.record_win("ben", GameKind::AwfulAnswers).await;

        let ben = stats.standing("ben", None).await.unwrap();
        assert_eq!(ben.rank, 2);
        assert_eq!(ben.entry.wins(None), 2);
        let ben_awful = stats.standing("ben", Some(GameKind::AwfulAnswers)).await.unwrap();
        assert_eq!(ben_awful.rank, 1);
        assert!(stats.standing("nobody", None).await.is_none());
    }

    #[tokio::test]
    async fn test_win_updates_timestamp() {
        let stats = InMemoryStats::new();
        let before = Utc::now();
        stats.record_win("amy", GameKind::WildCard).await;
        let entry = stats.standing("amy", None).await.unwrap().entry;
        assert!(entry.last_updated >= before);
    }
}
