//! Authentication and the other collaborators the hub consults.
//!
//! This module implements:
//! - Password login against Argon2id hashes, seedable from a JSON accounts file
//! - The capability policy table checked before every command
//! - An in-memory leaderboard awarding points per win
//! - Display name screening and guest name generation
//!
//! Each collaborator is an async trait so the hub can be wired to other
//! backends without touching game code.
//!
//! ## Example
//!
//! ```no_run
//! use party_hub::auth::{Authenticator, InMemoryAccounts};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let accounts = InMemoryAccounts::new();
//!     accounts.register("player1", "SecurePass123").await?;
//!
//!     let user = accounts.authenticate("player1", "SecurePass123").await?;
//!     println!("Logged in as {} ({})", user.username, user.capability);
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod errors;
pub mod models;
pub mod names;
pub mod policy;
pub mod stats;

pub use accounts::{Authenticator, InMemoryAccounts, hash_password};
pub use errors::{AuthError, AuthResult};
pub use models::{Account, AuthenticatedUser, Capability};
pub use names::{BlacklistFilter, NameFilter, generate_guest_name};
pub use policy::{is_permitted, required_capability};
pub use stats::{InMemoryStats, LeaderboardEntry, Standing, StatsRecorder, WIN_POINTS};
