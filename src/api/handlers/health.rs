use crate::GIT_COMMIT_HASH;
use crate::authorization::AuthorizationState;
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tracing::{Instrument, debug, error, info_span};
use utoipa::ToSchema;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    authorization_service: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Authorization Service is reachable", body = [Health]),
        (status = 503, description = "Authorization Service is unreachable", body = [Health])
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(
    method: Method,
    state: Extension<Arc<AuthorizationState>>,
) -> impl IntoResponse {
    let probe_span = info_span!("authorization_service.probe");
    let probe = tokio::time::timeout(PROBE_TIMEOUT, state.0.service().configuration())
        .instrument(probe_span)
        .await;

    let is_healthy = match probe {
        Ok(Ok(response)) if response.status.is_success() => true,
        Ok(Ok(response)) => {
            error!("Authorization service answered {}", response.status);
            false
        }
        Ok(Err(err)) => {
            error!("Failed to reach authorization service: {}", err);
            false
        }
        Err(_) => {
            error!("Authorization service probe timed out");
            false
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        authorization_service: if is_healthy {
            "ok".to_string()
        } else {
            "error".to_string()
        },
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .unwrap_or_else(|err| {
            error!("Failed to parse X-App header: {}", err);
            HeaderMap::new()
        });

    if is_healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}
