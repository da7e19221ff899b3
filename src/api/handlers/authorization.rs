use axum::{
    extract::{Extension, RawForm, RawQuery},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::{cookie, response::outcome_response};
use crate::authorization::{self, AuthorizationState, FlowError};

#[utoipa::path(
    get,
    path = "/api/authorization",
    params(
        ("response_type" = String, Query, description = "OAuth 2.0 response type"),
        ("client_id" = String, Query, description = "Client identifier"),
        ("redirect_uri" = Option<String>, Query, description = "Redirection endpoint"),
        ("scope" = Option<String>, Query, description = "Requested scopes"),
        ("prompt" = Option<String>, Query, description = "none, login, consent or select_account"),
        ("max_age" = Option<u64>, Query, description = "Maximum authentication age in seconds"),
    ),
    responses(
        (status = 200, description = "Consent page", body = String, content_type = "text/html"),
        (status = 302, description = "Protocol redirect back to the client"),
        (status = 400, description = "Invalid authorization request"),
        (status = 500, description = "Page or Authorization Service failure", body = String)
    ),
    tag = "authorization"
)]
pub async fn authorization_get(
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    state: Extension<Arc<AuthorizationState>>,
) -> Response {
    dispatch(&state.0, &headers, query.as_deref().unwrap_or_default()).await
}

#[utoipa::path(
    post,
    path = "/api/authorization",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Consent page", body = String, content_type = "text/html"),
        (status = 302, description = "Protocol redirect back to the client"),
        (status = 400, description = "Invalid authorization request or non UTF-8 body"),
        (status = 500, description = "Page or Authorization Service failure", body = String)
    ),
    tag = "authorization"
)]
pub async fn authorization_post(
    headers: HeaderMap,
    state: Extension<Arc<AuthorizationState>>,
    RawForm(form): RawForm,
) -> Response {
    match std::str::from_utf8(&form) {
        Ok(parameters) => dispatch(&state.0, &headers, parameters).await,
        Err(err) => FlowError::from(err).into_response(),
    }
}

async fn dispatch(state: &AuthorizationState, headers: &HeaderMap, parameters: &str) -> Response {
    match authorization::handle(state, cookie::session_id(headers), parameters).await {
        Ok(outcome) => outcome_response(state.config(), outcome),
        Err(err) => err.into_response(),
    }
}
