//! Shared game constants.

use std::time::Duration;

/// Smallest room a host may create.
pub const MIN_CAPACITY: usize = 2;
/// Largest room a host may create.
pub const MAX_CAPACITY: usize = 10;
/// Capacity used when a create request doesn't name one.
pub const DEFAULT_CAPACITY: usize = 10;

/// Longest display name kept after sanitizing.
pub const MAX_NAME_LENGTH: usize = 24;

/// Room codes are alphanumeric and between these lengths.
pub const MIN_ROOM_CODE_LENGTH: usize = 4;
pub const MAX_ROOM_CODE_LENGTH: usize = 6;
/// Collisions tolerated at one code length before generating longer codes.
pub const ROOM_CODE_ATTEMPTS_PER_LENGTH: usize = 16;

// WildCard

pub const WILDCARD_HAND_SIZE: usize = 7;
pub const WILDCARD_MIN_PLAYERS: usize = 2;
/// Cards drawn when a player is caught at one card without calling.
pub const SHORT_HAND_PENALTY: usize = 2;
pub const DRAW_TWO_PENALTY: usize = 2;
pub const DRAW_FOUR_PENALTY: usize = 4;
/// 4 colors x (one 0 + two each of 1-9, Skip, Reverse, DrawTwo) + 8 wilds.
pub const WILDCARD_DECK_SIZE: usize = 108;

// Awful Answers

pub const AWFUL_HAND_SIZE: usize = 10;
pub const AWFUL_MIN_PLAYERS: usize = 4;
/// An in-progress game drops back to the lobby below this many players.
pub const AWFUL_MIN_TO_CONTINUE: usize = 3;
pub const AWFUL_WIN_SCORE: u32 = 7;
/// Delay between a decisive Awful Answers win and the room being torn down.
pub const TEARDOWN_DELAY: Duration = Duration::from_secs(10);

/// Bound on each member's outbound queue.
pub const OUTBOUND_QUEUE_SIZE: usize = 64;
/// Bound on each room actor's inbox.
pub const ROOM_INBOX_SIZE: usize = 100;
