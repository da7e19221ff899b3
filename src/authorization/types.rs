//! Values exchanged with the Authorization Service.

use axum::http::StatusCode;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Interaction hint requested by the client (`prompt` parameter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Prompt {
    #[serde(rename = "NONE", alias = "none")]
    None,
    #[serde(rename = "LOGIN", alias = "login")]
    Login,
    #[serde(rename = "CONSENT", alias = "consent")]
    Consent,
    #[serde(rename = "SELECT_ACCOUNT", alias = "select_account")]
    SelectAccount,
}

/// Display data for the client asking for authorization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_id: String,
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub logo_uri: Option<String>,
    pub client_uri: Option<String>,
    pub policy_uri: Option<String>,
    pub tos_uri: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeInfo {
    pub name: String,
    pub description: Option<String>,
}

/// A validated authorization request awaiting the resource owner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationRequestInfo {
    /// Correlation token issued by the Authorization Service.
    pub ticket: String,
    pub claim_names: Vec<String>,
    pub claim_locales: Vec<String>,
    pub prompts: BTreeSet<Prompt>,
    /// Requested `max_age` in seconds; `Some(0)` carries no constraint.
    pub max_age: Option<u64>,
    pub client: ClientInfo,
    pub scopes: Vec<ScopeInfo>,
    pub login_hint: Option<String>,
}

impl AuthorizationRequestInfo {
    #[must_use]
    pub fn requests_prompt(&self, prompt: Prompt) -> bool {
        self.prompts.contains(&prompt)
    }

    /// The `max_age` in effect, if any.
    #[must_use]
    pub fn max_age_constraint(&self) -> Option<u64> {
        self.max_age.filter(|max_age| *max_age > 0)
    }
}

/// Result of handing raw authorization request parameters to the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    /// The resource owner must be asked.
    Interaction(AuthorizationRequestInfo),
    /// The service allows resuming without user interaction (`prompt=none`).
    NoInteraction(AuthorizationRequestInfo),
    /// The request ended at the protocol level (error or redirect).
    Respond(ProtocolResponse),
}

/// Everything the service needs to finish a staged authorization request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResumeRequest {
    pub ticket: String,
    pub claim_names: Vec<String>,
    pub claim_locales: Vec<String>,
    pub subject: Option<String>,
    /// Seconds since the Unix epoch at which `subject` authenticated.
    pub auth_time: Option<i64>,
    /// Whether the resource owner pressed "authorize".
    pub authorized: bool,
    pub claims: Map<String, Value>,
}

/// Outcome of a token request.
#[derive(Debug)]
pub enum TokenOutcome {
    Respond(ProtocolResponse),
    /// Resource owner password grant; the credentials must be checked locally.
    Password {
        ticket: String,
        username: String,
        password: SecretString,
    },
}

/// A protocol-level response produced by the Authorization Service. It is
/// relayed to the user agent unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolResponse {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: String,
    pub location: Option<String>,
    pub www_authenticate: Option<String>,
}

pub const JSON_UTF8: &str = "application/json;charset=UTF-8";
pub const HTML_UTF8: &str = "text/html;charset=UTF-8";

impl ProtocolResponse {
    #[must_use]
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(JSON_UTF8),
            body: body.into(),
            location: None,
            www_authenticate: None,
        }
    }

    #[must_use]
    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            content_type: Some(HTML_UTF8),
            ..Self::json(status, body)
        }
    }

    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FOUND,
            content_type: None,
            body: String::new(),
            location: Some(location.into()),
            www_authenticate: None,
        }
    }

    #[must_use]
    pub fn with_www_authenticate(mut self, challenge: impl Into<String>) -> Self {
        self.www_authenticate = Some(challenge.into());
        self
    }
}
