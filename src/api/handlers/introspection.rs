use axum::{
    extract::{Extension, RawForm},
    http::HeaderMap,
};
use std::sync::Arc;

use super::token::basic_credentials;
use crate::authorization::{self, AuthorizationState, FlowError, ProtocolResponse};

#[utoipa::path(
    post,
    path = "/api/introspection",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token introspection (RFC 7662)", body = String, content_type = "application/json"),
        (status = 400, description = "Request body is not valid UTF-8", body = String),
        (status = 401, description = "Caller is not an allowed introspection client", body = String, content_type = "application/json"),
        (status = 500, description = "Authorization Service failure", body = String)
    ),
    tag = "protocol"
)]
pub async fn introspection(
    headers: HeaderMap,
    state: Extension<Arc<AuthorizationState>>,
    RawForm(form): RawForm,
) -> Result<ProtocolResponse, FlowError> {
    let parameters = std::str::from_utf8(&form)?;
    let caller = basic_credentials(&headers);
    authorization::handle_introspection(&state.0, parameters, caller.as_ref()).await
}
