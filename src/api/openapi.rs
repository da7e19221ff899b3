use super::handlers::{
    authorization, decision, discovery, health, introspection, revocation, token,
};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Routes registered here are both served and documented; `OPTIONS /health`
/// and the Swagger UI are added outside and stay undocumented.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(
            authorization::authorization_get,
            authorization::authorization_post
        ))
        .routes(routes!(decision::decision))
        .routes(routes!(token::token))
        .routes(routes!(introspection::introspection))
        .routes(routes!(revocation::revocation))
        .routes(routes!(discovery::jwks))
        .routes(routes!(discovery::configuration))
}

fn tag(name: &str, description: &str) -> Tag {
    let mut tag = Tag::new(name);
    tag.description = Some(description.to_string());
    tag
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![
            tag("authorization", "Consent page and resource owner decision"),
            tag("protocol", "Token, introspection and revocation endpoints"),
            tag("discovery", "OpenID Provider metadata and signing keys"),
            tag("health", "Liveness and Authorization Service reachability"),
        ]))
        .build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let primary = env!("CARGO_PKG_AUTHORS").split(';').next().map(str::trim)?;
    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    match author.split_once('<') {
        Some((name, email)) => (
            optional_str(name),
            optional_str(email.trim_end_matches('>')),
        ),
        None => (optional_str(author), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Consenso"));
            assert_eq!(contact.email.as_deref(), Some("team@consenso.dev"));
        }

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.identifier.as_deref(), Some("BSD-3-Clause"));
        }
    }

    #[test]
    fn openapi_documents_endpoints() {
        let spec = openapi();
        for path in [
            "/health",
            "/api/authorization",
            "/api/authorization/decision",
            "/api/token",
            "/api/introspection",
            "/api/revocation",
            "/api/jwks",
            "/.well-known/openid-configuration",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
        let tags = spec.tags.unwrap_or_default();
        for name in ["authorization", "protocol", "discovery", "health"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {name}");
        }
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Jane <jane@example.com>"),
            (Some("Jane"), Some("jane@example.com"))
        );
        assert_eq!(parse_author("Jane"), (Some("Jane"), None));
        assert_eq!(parse_author("<a@b.c>"), (None, Some("a@b.c")));
    }
}
