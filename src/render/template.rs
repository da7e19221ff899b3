use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

use super::{AUTHORIZATION_TEMPLATE, AuthorizationPage, PageRenderer, RenderError};

const DEFAULT_AUTHORIZATION_TEMPLATE: &str = include_str!("authorization.html");

/// Renders `{{ name }}` placeholders. Values are HTML escaped; list-like
/// values (`scopes`, `links`, `login`, `logo`) are inserted as ready-made
/// fragments built from escaped data.
#[derive(Clone, Debug, Default)]
pub struct TemplateRenderer {
    templates_dir: Option<PathBuf>,
}

impl TemplateRenderer {
    /// Without a directory only the embedded `authorization` template exists.
    #[must_use]
    pub fn new(templates_dir: Option<PathBuf>) -> Self {
        Self { templates_dir }
    }

    fn load(&self, template: &str) -> Result<String, RenderError> {
        if template.is_empty()
            || !template
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(RenderError::UnknownTemplate(template.to_string()));
        }

        match &self.templates_dir {
            Some(dir) => {
                let path = dir.join(format!("{template}.html"));
                debug!("Loading template {}", path.display());
                Ok(std::fs::read_to_string(path)?)
            }
            None if template == AUTHORIZATION_TEMPLATE => {
                Ok(DEFAULT_AUTHORIZATION_TEMPLATE.to_string())
            }
            None => Err(RenderError::UnknownTemplate(template.to_string())),
        }
    }
}

impl PageRenderer for TemplateRenderer {
    fn render(&self, template: &str, page: &AuthorizationPage) -> Result<String, RenderError> {
        let source = self.load(template)?;
        substitute(&source, &page_values(page))
    }
}

fn substitute(source: &str, values: &HashMap<&'static str, String>) -> Result<String, RenderError> {
    let pattern = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")?;

    let mut output = String::with_capacity(source.len());
    let mut last = 0;
    for captures in pattern.captures_iter(source) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = values
            .get(name.as_str())
            .ok_or_else(|| RenderError::UnknownPlaceholder(name.as_str().to_string()))?;
        output.push_str(&source[last..whole.start()]);
        output.push_str(value);
        last = whole.end();
    }
    output.push_str(&source[last..]);

    Ok(output)
}

fn page_values(page: &AuthorizationPage) -> HashMap<&'static str, String> {
    let client = &page.info.client;
    let client_name = client.client_name.as_deref().unwrap_or(&client.client_id);

    let mut values = HashMap::new();
    values.insert("client_id", escape(&client.client_id));
    values.insert("client_name", escape(client_name));
    values.insert(
        "description",
        escape(client.description.as_deref().unwrap_or_default()),
    );
    values.insert(
        "login_hint",
        escape(page.info.login_hint.as_deref().unwrap_or_default()),
    );
    values.insert("decision_path", escape(&page.decision_path));
    values.insert(
        "logo",
        web_uri(client.logo_uri.as_deref()).map_or_else(String::new, |uri| {
            format!(r#"<img class="logo" src="{}" alt="">"#, escape(uri.as_str()))
        }),
    );
    values.insert("scopes", scopes_fragment(page));
    values.insert("login", login_fragment(page));
    values.insert("links", links_fragment(page));
    values
}

fn scopes_fragment(page: &AuthorizationPage) -> String {
    if page.info.scopes.is_empty() {
        return String::new();
    }
    let mut fragment = String::from(r#"<ul class="scopes">"#);
    for scope in &page.info.scopes {
        let _ = write!(fragment, "<li><strong>{}</strong>", escape(&scope.name));
        if let Some(description) = &scope.description {
            let _ = write!(fragment, " {}", escape(description));
        }
        fragment.push_str("</li>");
    }
    fragment.push_str("</ul>");
    fragment
}

fn login_fragment(page: &AuthorizationPage) -> String {
    match &page.subject {
        Some(subject) => format!(
            r#"<p class="signed-in">Signed in as <strong>{}</strong>.</p>"#,
            escape(subject)
        ),
        None => format!(
            concat!(
                r#"<fieldset class="login">"#,
                r#"<label for="loginId">Login ID</label>"#,
                r#"<input type="text" id="loginId" name="loginId" value="{}" autocomplete="username">"#,
                r#"<label for="password">Password</label>"#,
                r#"<input type="password" id="password" name="password" autocomplete="current-password">"#,
                "</fieldset>"
            ),
            escape(page.info.login_hint.as_deref().unwrap_or_default())
        ),
    }
}

fn links_fragment(page: &AuthorizationPage) -> String {
    let client = &page.info.client;
    [
        ("Homepage", client.client_uri.as_deref()),
        ("Privacy policy", client.policy_uri.as_deref()),
        ("Terms of service", client.tos_uri.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, uri)| {
        web_uri(uri).map(|uri| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{label}</a>"#,
                escape(uri.as_str())
            )
        })
    })
    .collect::<Vec<_>>()
    .join("")
}

/// Client metadata URIs are only linked when they are absolute http(s) URLs.
fn web_uri(uri: Option<&str>) -> Option<Url> {
    let parsed = Url::parse(uri?.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed),
        scheme => {
            debug!("Ignoring client URI with scheme {scheme}");
            None
        }
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::authorization::{AuthorizationRequestInfo, ClientInfo, ScopeInfo};

    fn page(subject: Option<&str>) -> AuthorizationPage {
        let info = AuthorizationRequestInfo {
            ticket: "ticket-1".to_string(),
            client: ClientInfo {
                client_id: "57297408867".to_string(),
                client_name: Some("Demo <App>".to_string()),
                policy_uri: Some("https://client.test/policy".to_string()),
                ..ClientInfo::default()
            },
            scopes: vec![ScopeInfo {
                name: "openid".to_string(),
                description: Some("Sign you in".to_string()),
            }],
            login_hint: Some("john".to_string()),
            ..AuthorizationRequestInfo::default()
        };
        AuthorizationPage::new(info, subject.map(str::to_string))
    }

    #[test]
    fn default_template_renders_login_form() {
        let html = TemplateRenderer::new(None)
            .render(AUTHORIZATION_TEMPLATE, &page(None))
            .unwrap();
        assert!(html.contains("Demo &lt;App&gt;"));
        assert!(html.contains(r#"name="loginId" value="john""#));
        assert!(html.contains(r#"action="/api/authorization/decision""#));
        assert!(html.contains("<li><strong>openid</strong> Sign you in</li>"));
        assert!(html.contains("https://client.test/policy"));
        assert!(!html.contains("{{"));
        assert!(!html.contains("ticket-1"));
    }

    #[test]
    fn signed_in_subject_skips_login_form() {
        let html = TemplateRenderer::new(None)
            .render(AUTHORIZATION_TEMPLATE, &page(Some("1001")))
            .unwrap();
        assert!(html.contains("Signed in as <strong>1001</strong>"));
        assert!(!html.contains(r#"name="password""#));
    }

    #[test]
    fn templates_dir_overrides_embedded_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("authorization.html"),
            "<p>{{client_name}} / {{ client_id }}</p>",
        )
        .unwrap();
        let html = TemplateRenderer::new(Some(dir.path().to_path_buf()))
            .render(AUTHORIZATION_TEMPLATE, &page(None))
            .unwrap();
        assert_eq!(html, "<p>Demo &lt;App&gt; / 57297408867</p>");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("authorization.html"), "{{ ticket }}").unwrap();
        let err = TemplateRenderer::new(Some(dir.path().to_path_buf()))
            .render(AUTHORIZATION_TEMPLATE, &page(None))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownPlaceholder(name) if name == "ticket"));
    }

    #[test]
    fn missing_template_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateRenderer::new(Some(dir.path().to_path_buf()))
            .render(AUTHORIZATION_TEMPLATE, &page(None))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }

    #[test]
    fn template_names_cannot_escape_the_directory() {
        let err = TemplateRenderer::new(None)
            .render("../secrets", &page(None))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate(_)));
    }

    #[test]
    fn client_uris_must_be_http() {
        let mut page = page(None);
        page.info.client.logo_uri = Some("javascript:alert(1)".to_string());
        page.info.client.client_uri = Some("JavaScript:alert(document.cookie)".to_string());
        page.info.client.tos_uri = Some("data:text/html,<script>1</script>".to_string());
        page.info.client.policy_uri = Some("https://client.test/policy".to_string());

        let html = TemplateRenderer::new(None)
            .render(AUTHORIZATION_TEMPLATE, &page)
            .unwrap();
        let lowered = html.to_ascii_lowercase();
        assert!(!lowered.contains("javascript:"));
        assert!(!lowered.contains("data:text/html"));
        assert!(!html.contains(r#"class="logo""#));
        assert!(!html.contains("Homepage"));
        assert!(!html.contains("Terms of service"));
        assert!(html.contains(r#"href="https://client.test/policy""#));
    }

    #[test]
    fn relative_client_uris_are_dropped() {
        assert!(web_uri(Some("/logo.png")).is_none());
        assert!(web_uri(None).is_none());
        assert_eq!(
            web_uri(Some(" https://client.test/logo.png ")).map(String::from),
            Some("https://client.test/logo.png".to_string())
        );
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }
}
