//! Boundary to the external Authorization Service.

use async_trait::async_trait;
use thiserror::Error;

use super::credentials::BasicCredentials;
use super::types::{ProtocolResponse, ResumeRequest, TokenOutcome, Validation};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authorization service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("authorization service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("authorization service returned an unexpected action: {0}")]
    UnexpectedAction(String),
    #[error("invalid authorization service url: {0}")]
    Url(#[from] url::ParseError),
}

/// The OAuth 2.0 / OpenID Connect protocol engine.
///
/// Errors are never retried or translated by callers; protocol failures come
/// back as [`ProtocolResponse`] values, transport failures as
/// [`ServiceError`].
#[async_trait]
pub trait AuthorizationService: Send + Sync {
    /// Validate raw authorization request parameters (query string or form body).
    async fn validate(&self, parameters: &str) -> Result<Validation, ServiceError>;

    /// Resume a staged authorization request with the resource owner's decision.
    async fn resume_with_identity(
        &self,
        request: ResumeRequest,
    ) -> Result<ProtocolResponse, ServiceError>;

    async fn token(
        &self,
        parameters: &str,
        client: Option<&BasicCredentials>,
    ) -> Result<TokenOutcome, ServiceError>;

    /// Finish a password grant; `subject` is `None` when the resource owner
    /// credentials were rejected.
    async fn resume_password_grant(
        &self,
        ticket: &str,
        subject: Option<&str>,
    ) -> Result<ProtocolResponse, ServiceError>;

    async fn introspect(&self, parameters: &str) -> Result<ProtocolResponse, ServiceError>;

    async fn revoke(
        &self,
        parameters: &str,
        client: Option<&BasicCredentials>,
    ) -> Result<ProtocolResponse, ServiceError>;

    /// OpenID Provider metadata document.
    async fn configuration(&self) -> Result<ProtocolResponse, ServiceError>;

    async fn jwks(&self) -> Result<ProtocolResponse, ServiceError>;
}
