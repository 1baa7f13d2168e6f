//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// Password too short to register
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Invalid username format
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Name rejected by the name filter
    #[error("This username is not allowed")]
    DisallowedName,

    /// Accounts file couldn't be read
    #[error("Accounts file error: {0}")]
    Io(#[from] std::io::Error),

    /// Accounts file couldn't be parsed
    #[error("Accounts file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Unknown users and wrong passwords read the same so usernames can't be
    /// enumerated, and file errors never reach a client.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::UserNotFound | AuthError::InvalidPassword => {
                "Invalid username or password".to_string()
            }
            AuthError::Io(_) | AuthError::Malformed(_) | AuthError::HashingFailed => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
