use thiserror::Error;

use super::service::ServiceError;
use super::types::ProtocolResponse;
use crate::directory::DirectoryError;
use crate::session::{SessionError, SessionId};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The decision form arrived without a pending authorization request
    /// (double submit, expired session or no prior request).
    #[error("No authorization request is pending for this session.")]
    StaleDecision,
    /// Request parameters are relayed verbatim, so they must already be text.
    #[error("Request parameters are not valid UTF-8.")]
    MalformedParameters(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// What the authorization endpoint answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Rendered consent page; never cached.
    Page(String),
    /// Relayed unchanged from the Authorization Service.
    Protocol(ProtocolResponse),
    /// 500 plain text.
    Failure(String),
}

#[derive(Clone, Debug)]
pub struct FlowOutcome {
    /// Session to (re)issue as a cookie; `None` when no session was touched.
    pub session: Option<SessionId>,
    pub reply: Reply,
}
