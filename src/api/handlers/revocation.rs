use axum::{
    extract::{Extension, RawForm},
    http::HeaderMap,
};
use std::sync::Arc;

use super::token::basic_credentials;
use crate::authorization::{self, AuthorizationState, FlowError, ProtocolResponse};

#[utoipa::path(
    post,
    path = "/api/revocation",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token revoked (RFC 7009)"),
        (status = 400, description = "Invalid revocation request", body = String, content_type = "application/json"),
        (status = 401, description = "Client authentication failed", body = String, content_type = "application/json"),
        (status = 500, description = "Authorization Service failure", body = String)
    ),
    tag = "protocol"
)]
pub async fn revocation(
    headers: HeaderMap,
    state: Extension<Arc<AuthorizationState>>,
    RawForm(form): RawForm,
) -> Result<ProtocolResponse, FlowError> {
    let parameters = std::str::from_utf8(&form)?;
    let client = basic_credentials(&headers);
    authorization::handle_revocation(&state.0, parameters, client.as_ref()).await
}
