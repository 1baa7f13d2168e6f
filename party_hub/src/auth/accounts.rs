//! Account store and password login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, path::Path, sync::Arc};
use tokio::sync::RwLock;

use super::{
    errors::{AuthError, AuthResult},
    models::{Account, AuthenticatedUser},
};

const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 4;

/// Verifies credentials for `login` commands and creates accounts for
/// `register` commands.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check a username/password pair
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<AuthenticatedUser>;

    /// Create a plain player account
    async fn register(&self, username: &str, password: &str) -> AuthResult<()>;
}

/// Accounts held in memory, keyed by username
#[derive(Clone, Default)]
pub struct InMemoryAccounts {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load accounts from a JSON array of account records
    ///
    /// # Arguments
    ///
    /// * `path` - File holding `[{"username", "passwordHash", "isAdmin"?, "isModerator"?}]`
    ///
    /// # Returns
    ///
    /// * `AuthResult<InMemoryAccounts>` - Store seeded with every account in the file
    pub fn from_file(path: impl AsRef<Path>) -> AuthResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(json: &str) -> AuthResult<Self> {
        let records: Vec<Account> = serde_json::from_str(json)?;
        let accounts = records
            .into_iter()
            .map(|account| (account.username.to_lowercase(), account))
            .collect();
        Ok(Self {
            accounts: Arc::new(RwLock::new(accounts)),
        })
    }

    /// Create an account with the given privileges
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidUsername` - Username too short
    /// * `AuthError::WeakPassword` - Password too short
    /// * `AuthError::UsernameTaken` - Username already exists
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
        is_moderator: bool,
    ) -> AuthResult<()> {
        let username = username.trim();
        if username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(AuthError::InvalidUsername(format!(
                "must be at least {MIN_USERNAME_LENGTH} characters"
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
        }

        let key = username.to_lowercase();
        if self.accounts.read().await.contains_key(&key) {
            return Err(AuthError::UsernameTaken);
        }
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::UsernameTaken);
        }
        accounts.insert(
            key,
            Account {
                username: username.to_string(),
                password_hash,
                is_admin,
                is_moderator,
                created_at: Utc::now(),
            },
        );
        log::info!("Account created for {username}");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl Authenticator for InMemoryAccounts {
    async fn authenticate(&self, username: &str, password: &str) -> AuthResult<AuthenticatedUser> {
        let account = {
            let accounts = self.accounts.read().await;
            accounts
                .get(&username.trim().to_lowercase())
                .cloned()
                .ok_or(AuthError::UserNotFound)?
        };
        verify_password(password, &account.password_hash)?;
        Ok(AuthenticatedUser {
            capability: account.capability(),
            username: account.username,
        })
    }

    async fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        self.create_account(username, password, false, false).await
    }
}

/// Hash password using Argon2id
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::HashingFailed)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Capability;

    #[tokio::test]
    async fn test_register_and_login() {
        let accounts = InMemoryAccounts::new();
        accounts.create_account("sam", "pass1234", false, false).await.unwrap();

        let user = accounts.authenticate("sam", "pass1234").await.unwrap();
        assert_eq!(user.username, "sam");
        assert_eq!(user.capability, Capability::Player);
    }

    #[tokio::test]
    async fn test_username_is_case_insensitive() {
        let accounts = InMemoryAccounts::new();
        accounts.create_account("Sam", "pass1234", false, true).await.unwrap();

        let user = accounts.authenticate("SAM", "pass1234").await.unwrap();
        assert_eq!(user.username, "Sam");
        assert_eq!(user.capability, Capability::Moderator);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let accounts = InMemoryAccounts::new();
        accounts.create_account("sam", "pass1234", false, false).await.unwrap();

        assert!(matches!(
            accounts.authenticate("sam", "nope").await,
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            accounts.authenticate("nobody", "pass1234").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let accounts = InMemoryAccounts::new();
        assert!(matches!(
            accounts.register("ab", "pass1234").await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            accounts.register("abc", "123").await,
            Err(AuthError::WeakPassword(4))
        ));
        accounts.register("abc", "1234").await.unwrap();
        assert!(matches!(
            accounts.register("ABC", "1234").await,
            Err(AuthError::UsernameTaken)
        ));
        assert_eq!(accounts.len().await, 1);
    }

    #[tokio::test]
    async fn test_registered_account_is_a_player() {
        let accounts = InMemoryAccounts::new();
        accounts.register("newbie", "letmein").await.unwrap();

        let user = accounts.authenticate("NEWBIE", "letmein").await.unwrap();
        assert_eq!(user.capability, Capability::Player);
    }

    #[tokio::test]
    async fn test_load_from_json() {
        let hash = hash_password("admin").unwrap();
        let json = format!(r#"[{{"username":"admin","passwordHash":"{hash}","isAdmin":true}}]"#);
        let accounts = InMemoryAccounts::from_json(&json).unwrap();

        let user = accounts.authenticate("admin", "admin").await.unwrap();
        assert_eq!(user.capability, Capability::Admin);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            InMemoryAccounts::from_json("{not json"),
            Err(AuthError::Malformed(_))
        ));
    }
}
