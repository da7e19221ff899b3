//! HTTP mapping of flow results.

use axum::{
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION, PRAGMA, SET_COOKIE, WWW_AUTHENTICATE},
    },
    response::{IntoResponse, Response},
};
use tracing::error;

use super::cookie::session_cookie;
use crate::authorization::{
    AuthorizationConfig, FlowError, FlowOutcome, HTML_UTF8, ProtocolResponse, Reply,
};
use crate::session::SessionError;

const TEXT_UTF8: &str = "text/plain;charset=UTF-8";

fn no_store(headers: &mut HeaderMap) {
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
}

impl IntoResponse for ProtocolResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        no_store(&mut headers);
        if let Some(content_type) = self.content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    headers.insert(LOCATION, value);
                }
                Err(err) => error!("Invalid Location from authorization service: {err}"),
            }
        }
        if let Some(challenge) = self.www_authenticate {
            match HeaderValue::from_str(&challenge) {
                Ok(value) => {
                    headers.insert(WWW_AUTHENTICATE, value);
                }
                Err(err) => error!("Invalid WWW-Authenticate from authorization service: {err}"),
            }
        }
        (self.status, headers, self.body).into_response()
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Session(SessionError::NoSession)
            | Self::StaleDecision
            | Self::MalformedParameters(_) => StatusCode::BAD_REQUEST,
            Self::Service(_) | Self::Directory(_) => {
                error!("Authorization flow failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, [(CONTENT_TYPE, TEXT_UTF8)], self.to_string()).into_response()
    }
}

/// Turn the authorization endpoint outcome into a response, (re)issuing the
/// session cookie when a session was used.
pub(crate) fn outcome_response(config: &AuthorizationConfig, outcome: FlowOutcome) -> Response {
    let mut response = match outcome.reply {
        Reply::Page(html) => {
            let mut headers = HeaderMap::new();
            no_store(&mut headers);
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_UTF8));
            (StatusCode::OK, headers, html).into_response()
        }
        Reply::Protocol(protocol) => protocol.into_response(),
        Reply::Failure(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, TEXT_UTF8)],
            message,
        )
            .into_response(),
    };

    if let Some(id) = outcome.session {
        match session_cookie(config, &id) {
            Ok(cookie) => {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build session cookie: {err}"),
        }
    }

    response
}
