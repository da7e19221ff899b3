//! Token, introspection and revocation endpoints. These relay to the
//! Authorization Service; only the password grant and the introspection
//! caller check happen locally.

use axum::http::StatusCode;
use tracing::{debug, info, instrument, warn};

use super::credentials::BasicCredentials;
use super::error::FlowError;
use super::state::AuthorizationState;
use super::types::{ProtocolResponse, TokenOutcome};

const INTROSPECTION_CHALLENGE: &str = "Basic realm=\"introspection\"";

/// # Errors
/// Directory and Authorization Service failures.
#[instrument(skip_all)]
pub async fn handle_token(
    state: &AuthorizationState,
    parameters: &str,
    client: Option<&BasicCredentials>,
) -> Result<ProtocolResponse, FlowError> {
    match state.service().token(parameters, client).await? {
        TokenOutcome::Respond(response) => Ok(response),
        TokenOutcome::Password {
            ticket,
            username,
            password,
        } => {
            let subject = state
                .directory()
                .authenticate(&username, &password)
                .await?
                .map(|user| user.subject);
            if subject.is_none() {
                info!("Password grant rejected: invalid resource owner credentials");
            }
            Ok(state
                .service()
                .resume_password_grant(&ticket, subject.as_deref())
                .await?)
        }
    }
}

/// Only callers listed in the configuration may introspect; with none
/// configured every call is refused.
///
/// # Errors
/// Authorization Service failures.
#[instrument(skip_all)]
pub async fn handle_introspection(
    state: &AuthorizationState,
    parameters: &str,
    caller: Option<&BasicCredentials>,
) -> Result<ProtocolResponse, FlowError> {
    let allowed = caller.is_some_and(|caller| {
        state
            .config()
            .introspection_clients()
            .iter()
            .any(|client| client.matches(caller))
    });
    if !allowed {
        warn!(
            caller = caller.map(|caller| caller.user_id.as_str()),
            "Introspection caller rejected"
        );
        return Ok(ProtocolResponse::json(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid_client","error_description":"Introspection requires valid client credentials."}"#,
        )
        .with_www_authenticate(INTROSPECTION_CHALLENGE));
    }

    debug!("Introspection caller accepted");
    Ok(state.service().introspect(parameters).await?)
}

/// # Errors
/// Authorization Service failures.
#[instrument(skip_all)]
pub async fn handle_revocation(
    state: &AuthorizationState,
    parameters: &str,
    client: Option<&BasicCredentials>,
) -> Result<ProtocolResponse, FlowError> {
    Ok(state.service().revoke(parameters, client).await?)
}
