//! Shared state for the authorization endpoints.

use std::sync::Arc;

use super::credentials::BasicCredentials;
use super::service::AuthorizationService;
use crate::clock::Clock;
use crate::directory::UserDirectory;
use crate::render::PageRenderer;
use crate::session::SessionStore;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 60;
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct AuthorizationConfig {
    public_url: String,
    non_interactive_resume: bool,
    introspection_clients: Vec<BasicCredentials>,
    session_ttl_seconds: i64,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_URL.to_string())
    }
}

impl AuthorizationConfig {
    #[must_use]
    pub fn new(public_url: String) -> Self {
        Self {
            public_url,
            non_interactive_resume: false,
            introspection_clients: Vec::new(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_non_interactive_resume(mut self, enabled: bool) -> Self {
        self.non_interactive_resume = enabled;
        self
    }

    #[must_use]
    pub fn with_introspection_clients(mut self, clients: Vec<BasicCredentials>) -> Self {
        self.introspection_clients = clients;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    #[must_use]
    pub fn non_interactive_resume(&self) -> bool {
        self.non_interactive_resume
    }

    #[must_use]
    pub fn introspection_clients(&self) -> &[BasicCredentials] {
        &self.introspection_clients
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark the session cookie secure when served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

/// Collaborators and configuration shared by every request.
pub struct AuthorizationState {
    config: AuthorizationConfig,
    service: Arc<dyn AuthorizationService>,
    directory: Arc<dyn UserDirectory>,
    renderer: Arc<dyn PageRenderer>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationState {
    #[must_use]
    pub fn new(
        config: AuthorizationConfig,
        service: Arc<dyn AuthorizationService>,
        directory: Arc<dyn UserDirectory>,
        renderer: Arc<dyn PageRenderer>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            service,
            directory,
            renderer,
            sessions,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &dyn AuthorizationService {
        self.service.as_ref()
    }

    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    #[must_use]
    pub fn renderer(&self) -> &dyn PageRenderer {
        self.renderer.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_is_secure_only_over_https() {
        assert!(!AuthorizationConfig::default().session_cookie_secure());
        assert!(AuthorizationConfig::new("https://id.example.com".to_string()).session_cookie_secure());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = AuthorizationConfig::default()
            .with_non_interactive_resume(true)
            .with_session_ttl_seconds(60)
            .with_introspection_clients(vec![BasicCredentials::new("rs", "secret")]);
        assert!(config.non_interactive_resume());
        assert_eq!(config.session_ttl_seconds(), 60);
        assert_eq!(config.introspection_clients().len(), 1);
        assert_eq!(config.public_url(), "http://localhost:8080");
    }
}
