//! User directory: credential verification and user attribute lookup.

mod json;

pub use json::JsonUserDirectory;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid user directory: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid password hash for user {login_id}: {reason}")]
    PasswordHash { login_id: String, reason: String },
    #[error("duplicate {field} in user directory: {value}")]
    Duplicate { field: &'static str, value: String },
    #[error("password verification task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A user known to the directory.
#[derive(Clone, Debug, PartialEq)]
pub struct UserIdentity {
    pub subject: String,
    pub login_id: String,
    /// Claim values keyed by claim name; localized variants use `name#locale`.
    pub claims: Map<String, Value>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Verify a login id and password. Wrong credentials are `Ok(None)`.
    async fn authenticate(
        &self,
        login_id: &str,
        password: &SecretString,
    ) -> Result<Option<UserIdentity>, DirectoryError>;

    async fn find_by_subject(&self, subject: &str) -> Result<Option<UserIdentity>, DirectoryError>;
}
