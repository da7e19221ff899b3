//! HTTP Basic credentials (`Authorization: Basic ...`).

use base64ct::{Base64, Encoding};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

#[derive(Clone)]
pub struct BasicCredentials {
    pub user_id: String,
    pub password: SecretString,
}

impl BasicCredentials {
    #[must_use]
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Parse an `Authorization` header value. Returns `None` for any other
    /// scheme or malformed input.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let trimmed = header.trim();
        let encoded = trimmed
            .strip_prefix("Basic ")
            .or_else(|| trimmed.strip_prefix("basic "))?
            .trim();
        let decoded = Base64::decode_vec(encoded).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user_id, password) = decoded.split_once(':')?;
        if user_id.is_empty() {
            return None;
        }
        Some(Self::new(user_id, password))
    }

    /// Parse a `user:secret` pair as given on the command line.
    #[must_use]
    pub fn from_pair(pair: &str) -> Option<Self> {
        let (user_id, password) = pair.trim().split_once(':')?;
        if user_id.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self::new(user_id, password))
    }

    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.user_id == other.user_id
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_header() {
        // "client:s3cr:et"
        let credentials = BasicCredentials::parse("Basic Y2xpZW50OnMzY3I6ZXQ=");
        let credentials = credentials.map(|c| (c.user_id, c.password.expose_secret().to_string()));
        assert_eq!(
            credentials,
            Some(("client".to_string(), "s3cr:et".to_string()))
        );
    }

    #[test]
    fn parse_rejects_other_schemes() {
        assert!(BasicCredentials::parse("Bearer abc").is_none());
        assert!(BasicCredentials::parse("Basic not-base64!").is_none());
        // ":secret"
        assert!(BasicCredentials::parse("Basic OnNlY3JldA==").is_none());
    }

    #[test]
    fn from_pair_requires_both_parts() {
        assert!(BasicCredentials::from_pair("rs:secret").is_some());
        assert!(BasicCredentials::from_pair("rs:").is_none());
        assert!(BasicCredentials::from_pair("rs").is_none());
    }

    #[test]
    fn debug_hides_password() {
        let credentials = BasicCredentials::new("rs", "secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("secret"));
    }
}
