//! Consent / login page rendering.

mod template;

pub use template::TemplateRenderer;

use crate::authorization::AuthorizationRequestInfo;
use thiserror::Error;

/// Template used for the authorization endpoint.
pub const AUTHORIZATION_TEMPLATE: &str = "authorization";

/// Where the consent form posts the resource owner's decision.
pub const DECISION_PATH: &str = "/api/authorization/decision";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("unknown placeholder in template: {0}")]
    UnknownPlaceholder(String),
    #[error("invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Model handed to the renderer.
#[derive(Clone, Debug)]
pub struct AuthorizationPage {
    pub info: AuthorizationRequestInfo,
    /// Subject already authenticated in this session; the page then skips the
    /// login form.
    pub subject: Option<String>,
    pub decision_path: String,
}

impl AuthorizationPage {
    #[must_use]
    pub fn new(info: AuthorizationRequestInfo, subject: Option<String>) -> Self {
        Self {
            info,
            subject,
            decision_path: DECISION_PATH.to_string(),
        }
    }
}

pub trait PageRenderer: Send + Sync {
    /// Render `template` into an HTML document.
    ///
    /// # Errors
    /// Returns [`RenderError`] if the template cannot be loaded or references
    /// values the page does not provide.
    fn render(&self, template: &str, page: &AuthorizationPage) -> Result<String, RenderError>;
}
