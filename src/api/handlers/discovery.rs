use axum::extract::Extension;
use std::sync::Arc;
use tracing::instrument;

use crate::authorization::{AuthorizationState, FlowError, ProtocolResponse};

#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration",
    responses(
        (status = 200, description = "OpenID Provider metadata", body = String, content_type = "application/json"),
        (status = 500, description = "Authorization Service failure", body = String)
    ),
    tag = "discovery"
)]
#[instrument(skip_all)]
pub async fn configuration(
    state: Extension<Arc<AuthorizationState>>,
) -> Result<ProtocolResponse, FlowError> {
    Ok(state.0.service().configuration().await?)
}

#[utoipa::path(
    get,
    path = "/api/jwks",
    responses(
        (status = 200, description = "JSON Web Key Set", body = String, content_type = "application/json"),
        (status = 500, description = "Authorization Service failure", body = String)
    ),
    tag = "discovery"
)]
#[instrument(skip_all)]
pub async fn jwks(state: Extension<Arc<AuthorizationState>>) -> Result<ProtocolResponse, FlowError> {
    Ok(state.0.service().jwks().await?)
}
