//! The `consenso_session` cookie.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};

use crate::authorization::AuthorizationConfig;
use crate::session::SessionId;

pub const SESSION_COOKIE_NAME: &str = "consenso_session";

/// Session identifier presented by the browser, if any.
pub(crate) fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME {
                return SessionId::parse(val);
            }
        }
    }
    None
}

/// Build an `HttpOnly` cookie carrying the session identifier.
pub(crate) fn session_cookie(
    config: &AuthorizationConfig,
    id: &SessionId,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}",
        id.as_str()
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; consenso_session=abc123; lang=en"),
        );
        assert_eq!(
            session_id(&headers).map(|id| id.as_str().to_string()),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn session_id_absent_without_cookie() {
        let mut headers = HeaderMap::new();
        assert!(session_id(&headers).is_none());
        headers.insert(COOKIE, HeaderValue::from_static("consenso_session="));
        assert!(session_id(&headers).is_none());
    }

    #[test]
    fn cookie_attributes_follow_config() {
        let id = SessionId::parse("abc123").unwrap();

        let plain = session_cookie(&AuthorizationConfig::default().with_session_ttl_seconds(60), &id)
            .unwrap();
        assert_eq!(
            plain.to_str().unwrap(),
            "consenso_session=abc123; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let secure = session_cookie(
            &AuthorizationConfig::new("https://id.example.com".to_string()),
            &id,
        )
        .unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }
}
