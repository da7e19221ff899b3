use axum::{
    extract::{Extension, RawForm},
    http::{HeaderMap, header::AUTHORIZATION},
};
use std::sync::Arc;

use crate::authorization::{
    self, AuthorizationState, BasicCredentials, FlowError, ProtocolResponse,
};

/// Client credentials from the `Authorization: Basic` header, if present.
pub(super) fn basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BasicCredentials::parse)
}

#[utoipa::path(
    post,
    path = "/api/token",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token response", body = String, content_type = "application/json"),
        (status = 400, description = "Invalid token request", body = String, content_type = "application/json"),
        (status = 401, description = "Client authentication failed", body = String, content_type = "application/json"),
        (status = 500, description = "Directory or Authorization Service failure", body = String)
    ),
    tag = "protocol"
)]
pub async fn token(
    headers: HeaderMap,
    state: Extension<Arc<AuthorizationState>>,
    RawForm(form): RawForm,
) -> Result<ProtocolResponse, FlowError> {
    let parameters = std::str::from_utf8(&form)?;
    let client = basic_credentials(&headers);
    authorization::handle_token(&state.0, parameters, client.as_ref()).await
}
