//! Per-browser authorization session state.
//!
//! A session holds at most one staged authorization request (the ticket and
//! the claims it asked for) and at most one authenticated identity. The
//! identity and its authentication time travel together in
//! [`AuthenticatedIdentity`], so one can never be present without the other.

mod policy;
mod store;

pub use policy::{InvalidationReason, Reauthentication, evaluate};
pub use store::{MemorySessionStore, SessionStore};

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use std::fmt;
use thiserror::Error;

const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("A session does not exist.")]
    NoSession,
}

/// Opaque session identifier carried in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier from 32 random bytes (base64url, unpadded).
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Base64UrlUnpadded::encode_string(&bytes))
    }

    /// Accept an identifier presented by a client. Empty values are rejected.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Session identifiers are bearer secrets; keep them out of logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(***)")
    }
}

/// The part of an authorization request kept between the consent page and the
/// decision form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagedRequest {
    pub ticket: String,
    pub claim_names: Vec<String>,
    pub claim_locales: Vec<String>,
}

/// Reference to a user authenticated in this browser session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub subject: String,
    pub authenticated_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub staged: Option<StagedRequest>,
    pub identity: Option<AuthenticatedIdentity>,
}
