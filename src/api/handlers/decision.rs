use axum::{
    extract::{Extension, Form},
    http::HeaderMap,
};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::cookie;
use crate::authorization::{self, AuthorizationState, Decision, FlowError, ProtocolResponse};

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct DecisionForm {
    #[serde(rename = "loginId", default)]
    login_id: Option<String>,
    #[serde(default)]
    #[schema(format = Password)]
    password: Option<String>,
    /// Present when the "authorize" button was pressed.
    #[serde(default)]
    authorized: Option<String>,
    /// Present when the "deny" button was pressed.
    #[serde(default)]
    denied: Option<String>,
}

impl DecisionForm {
    fn into_decision(self) -> Decision {
        Decision {
            login_id: self.login_id,
            password: self.password.map(SecretString::from),
            authorized: self.authorized.is_some() && self.denied.is_none(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/authorization/decision",
    request_body(content = DecisionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Protocol redirect back to the client"),
        (status = 400, description = "No session or no pending authorization request", body = String),
        (status = 500, description = "Directory or Authorization Service failure", body = String)
    ),
    tag = "authorization"
)]
pub async fn decision(
    headers: HeaderMap,
    state: Extension<Arc<AuthorizationState>>,
    Form(form): Form<DecisionForm>,
) -> Result<ProtocolResponse, FlowError> {
    authorization::handle_decision(&state.0, cookie::session_id(&headers), form.into_decision())
        .await
}
