use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{DirectoryError, UserDirectory, UserIdentity};

#[derive(Debug, Deserialize)]
struct UserEntry {
    subject: String,
    login_id: String,
    /// Argon2 PHC string.
    password_hash: String,
    #[serde(default)]
    claims: Map<String, Value>,
}

impl UserEntry {
    fn identity(&self) -> UserIdentity {
        UserIdentity {
            subject: self.subject.clone(),
            login_id: self.login_id.clone(),
            claims: self.claims.clone(),
        }
    }
}

/// Directory loaded once from a JSON array of users.
///
/// ```json
/// [{"subject": "1001", "login_id": "john", "password_hash": "$argon2id$...",
///   "claims": {"name": "John Smith", "name#ja": "ジョン・スミス"}}]
/// ```
#[derive(Debug, Default)]
pub struct JsonUserDirectory {
    users: Vec<Arc<UserEntry>>,
}

impl JsonUserDirectory {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid directory.
    pub fn from_path(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// # Errors
    /// Returns an error on malformed JSON, unparsable password hashes or
    /// duplicate subjects / login ids.
    pub fn from_json(raw: &str) -> Result<Self, DirectoryError> {
        let entries: Vec<UserEntry> = serde_json::from_str(raw)?;

        let mut subjects = HashSet::new();
        let mut login_ids = HashSet::new();
        for entry in &entries {
            PasswordHash::new(&entry.password_hash).map_err(|err| {
                DirectoryError::PasswordHash {
                    login_id: entry.login_id.clone(),
                    reason: err.to_string(),
                }
            })?;
            if !subjects.insert(entry.subject.as_str()) {
                return Err(DirectoryError::Duplicate {
                    field: "subject",
                    value: entry.subject.clone(),
                });
            }
            if !login_ids.insert(entry.login_id.as_str()) {
                return Err(DirectoryError::Duplicate {
                    field: "login_id",
                    value: entry.login_id.clone(),
                });
            }
        }

        Ok(Self {
            users: entries.into_iter().map(Arc::new).collect(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for JsonUserDirectory {
    #[instrument(skip(self, password))]
    async fn authenticate(
        &self,
        login_id: &str,
        password: &SecretString,
    ) -> Result<Option<UserIdentity>, DirectoryError> {
        let Some(entry) = self
            .users
            .iter()
            .find(|entry| entry.login_id == login_id)
            .cloned()
        else {
            debug!("unknown login id");
            return Ok(None);
        };

        // Argon2 is CPU bound; keep it off the async workers.
        let password = password.clone();
        let verified_entry = entry.clone();
        let verified = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&verified_entry.password_hash).is_ok_and(|hash| {
                Argon2::default()
                    .verify_password(password.expose_secret().as_bytes(), &hash)
                    .is_ok()
            })
        })
        .await?;

        if verified {
            Ok(Some(entry.identity()))
        } else {
            debug!("password mismatch");
            Ok(None)
        }
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Option<UserIdentity>, DirectoryError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.subject == subject)
            .map(|entry| entry.identity()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use argon2::password_hash::{SaltString, rand_core::OsRng};
    use serde_json::json;

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn directory() -> JsonUserDirectory {
        let raw = json!([
            {
                "subject": "1001",
                "login_id": "john",
                "password_hash": hash("john-password"),
                "claims": {"name": "John Smith", "email": "john@example.com"}
            },
            {
                "subject": "1002",
                "login_id": "inga",
                "password_hash": hash("inga-password")
            }
        ]);
        JsonUserDirectory::from_json(&raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn authenticate_accepts_valid_credentials() {
        let directory = directory();
        let user = directory
            .authenticate("john", &SecretString::from("john-password".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.subject, "1001");
        assert_eq!(user.claims.get("email"), Some(&json!("john@example.com")));
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_and_unknown_user() {
        let directory = directory();
        let wrong = directory
            .authenticate("john", &SecretString::from("inga-password".to_string()))
            .await
            .unwrap();
        assert!(wrong.is_none());

        let unknown = directory
            .authenticate("nobody", &SecretString::from("x".to_string()))
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn find_by_subject() {
        let directory = directory();
        let user = directory.find_by_subject("1002").await.unwrap().unwrap();
        assert_eq!(user.login_id, "inga");
        assert!(user.claims.is_empty());
        assert!(directory.find_by_subject("9999").await.unwrap().is_none());
    }

    #[test]
    fn rejects_plaintext_passwords() {
        let raw = json!([{"subject": "1", "login_id": "a", "password_hash": "plain"}]);
        let err = JsonUserDirectory::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(err, DirectoryError::PasswordHash { .. }));
    }

    #[test]
    fn rejects_duplicate_login_ids() {
        let raw = json!([
            {"subject": "1", "login_id": "a", "password_hash": hash("x")},
            {"subject": "2", "login_id": "a", "password_hash": hash("y")}
        ]);
        let err = JsonUserDirectory::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Duplicate {
                field: "login_id",
                ..
            }
        ));
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = json!([{"subject": "1", "login_id": "a", "password_hash": hash("x")}]);
        std::io::Write::write_all(&mut file, raw.to_string().as_bytes()).unwrap();
        let directory = JsonUserDirectory::from_path(file.path()).unwrap();
        assert_eq!(directory.len(), 1);
    }
}
