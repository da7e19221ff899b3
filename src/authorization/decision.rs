//! Correlates a submitted decision form with the staged authorization request.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::error::FlowError;
use super::state::AuthorizationState;
use super::types::{ProtocolResponse, ResumeRequest};
use crate::directory::UserDirectory;
use crate::session::{AuthenticatedIdentity, SessionError, SessionId, StagedRequest};

/// The resource owner's answer on the consent page.
#[derive(Debug, Default)]
pub struct Decision {
    pub login_id: Option<String>,
    pub password: Option<SecretString>,
    /// `true` when the "authorize" button was pressed.
    pub authorized: bool,
}

/// Finish the staged authorization request of `session`.
///
/// The staged request is taken before anything else happens, so a replayed
/// form fails without reaching the directory or the Authorization Service.
///
/// # Errors
/// [`FlowError::Session`] without a live session, [`FlowError::StaleDecision`]
/// when nothing is staged, and collaborator failures as they occur.
#[instrument(skip_all, fields(authorized = decision.authorized))]
pub async fn handle_decision(
    state: &AuthorizationState,
    session: Option<SessionId>,
    decision: Decision,
) -> Result<ProtocolResponse, FlowError> {
    let id = session.ok_or(SessionError::NoSession)?;
    let sessions = state.sessions();

    let staged = sessions
        .take_staged(&id)
        .await?
        .ok_or(FlowError::StaleDecision)?;

    let identity = match sessions.get(&id).await?.identity {
        Some(identity) => {
            debug!("Reusing session identity");
            Some(identity)
        }
        None => authenticate(state, &id, &decision).await?,
    };

    resume(state, staged, identity.as_ref(), decision.authorized).await
}

/// Check the submitted credentials and remember the identity on success.
/// Bad or missing credentials resolve to no identity.
async fn authenticate(
    state: &AuthorizationState,
    id: &SessionId,
    decision: &Decision,
) -> Result<Option<AuthenticatedIdentity>, FlowError> {
    let (Some(login_id), Some(password)) = (decision.login_id.as_deref(), &decision.password)
    else {
        debug!("No credentials submitted");
        return Ok(None);
    };
    if login_id.is_empty() || password.expose_secret().is_empty() {
        debug!("No credentials submitted");
        return Ok(None);
    }

    let Some(user) = state.directory().authenticate(login_id, password).await? else {
        info!("Resource owner authentication failed");
        return Ok(None);
    };

    let identity = AuthenticatedIdentity {
        subject: user.subject,
        authenticated_at: state.clock().now_unix(),
    };
    state
        .sessions()
        .remember_identity(id, identity.clone())
        .await?;
    info!("Resource owner authenticated");

    Ok(Some(identity))
}

/// Hand the staged request and the acting identity back to the service.
pub(super) async fn resume(
    state: &AuthorizationState,
    staged: StagedRequest,
    identity: Option<&AuthenticatedIdentity>,
    authorized: bool,
) -> Result<ProtocolResponse, FlowError> {
    let claims = match identity {
        Some(identity) => {
            collect_claims(
                state.directory(),
                &identity.subject,
                &staged.claim_names,
                &staged.claim_locales,
            )
            .await?
        }
        None => Map::new(),
    };

    let request = ResumeRequest {
        ticket: staged.ticket,
        claim_names: staged.claim_names,
        claim_locales: staged.claim_locales,
        subject: identity.map(|identity| identity.subject.clone()),
        auth_time: identity.map(|identity| identity.authenticated_at),
        authorized,
        claims,
    };

    Ok(state.service().resume_with_identity(request).await?)
}

async fn collect_claims(
    directory: &dyn UserDirectory,
    subject: &str,
    claim_names: &[String],
    claim_locales: &[String],
) -> Result<Map<String, Value>, FlowError> {
    if claim_names.is_empty() {
        return Ok(Map::new());
    }
    let Some(user) = directory.find_by_subject(subject).await? else {
        debug!("Subject not found while collecting claims");
        return Ok(Map::new());
    };
    Ok(select_claims(&user.claims, claim_names, claim_locales))
}

/// For each claim, prefer `name#locale` in the requested locale order, then
/// fall back to `name`. Localized values keep their `name#locale` key.
pub(crate) fn select_claims(
    attributes: &Map<String, Value>,
    claim_names: &[String],
    claim_locales: &[String],
) -> Map<String, Value> {
    let mut claims = Map::new();
    for name in claim_names {
        let localized = claim_locales.iter().find_map(|locale| {
            let key = format!("{name}#{locale}");
            attributes.get(&key).map(|value| (key, value))
        });
        match localized {
            Some((key, value)) => {
                claims.insert(key, value.clone());
            }
            None => {
                if let Some(value) = attributes.get(name) {
                    claims.insert(name.clone(), value.clone());
                }
            }
        }
    }
    claims
}
