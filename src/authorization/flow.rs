//! Authorization endpoint: validate, apply the re-authentication policy, then
//! either resume right away or stage the request and render the consent page.

use tracing::{debug, error, info, instrument};

use super::decision::resume;
use super::error::{FlowError, FlowOutcome, Reply};
use super::state::AuthorizationState;
use super::types::{AuthorizationRequestInfo, Validation};
use crate::render::{AUTHORIZATION_TEMPLATE, AuthorizationPage};
use crate::session::{Reauthentication, SessionId, StagedRequest};

/// Handle an authorization request given as raw query string or form body.
///
/// # Errors
/// Session store and Authorization Service failures. Render failures are not
/// errors; they become a [`Reply::Failure`].
#[instrument(skip_all)]
pub async fn handle(
    state: &AuthorizationState,
    session: Option<SessionId>,
    parameters: &str,
) -> Result<FlowOutcome, FlowError> {
    let (info, interaction_required) = match state.service().validate(parameters).await? {
        Validation::Respond(response) => {
            debug!(status = %response.status, "Authorization request answered by the service");
            return Ok(FlowOutcome {
                session: None,
                reply: Reply::Protocol(response),
            });
        }
        Validation::Interaction(info) => (info, true),
        Validation::NoInteraction(info) => (info, false),
    };

    let sessions = state.sessions();
    let id = sessions.create_if_absent(session.as_ref()).await;
    let (outcome, identity) = sessions
        .reauthenticate(&id, &info, state.clock().now_unix())
        .await?;
    if let Reauthentication::Invalidate(reason) = outcome {
        info!(?reason, "Cleared session identity");
    }

    if !interaction_required && state.config().non_interactive_resume() {
        debug!(
            authenticated = identity.is_some(),
            "Resuming without interaction"
        );
        let response = resume(state, staged_request(&info), identity.as_ref(), true).await?;
        return Ok(FlowOutcome {
            session: Some(id),
            reply: Reply::Protocol(response),
        });
    }

    sessions.stage(&id, staged_request(&info)).await?;

    let page = AuthorizationPage::new(info, identity.map(|identity| identity.subject));
    let reply = match state.renderer().render(AUTHORIZATION_TEMPLATE, &page) {
        Ok(html) => Reply::Page(html),
        Err(err) => {
            error!("Failed to build the authorization page: {err}");
            Reply::Failure(format!("Failed to build the authorization page: {err}"))
        }
    };

    Ok(FlowOutcome {
        session: Some(id),
        reply,
    })
}

fn staged_request(info: &AuthorizationRequestInfo) -> StagedRequest {
    StagedRequest {
        ticket: info.ticket.clone(),
        claim_names: info.claim_names.clone(),
        claim_locales: info.claim_locales.clone(),
    }
}
