//! # Consenso (OAuth 2.0 / OpenID Connect authorization front end)
//!
//! `consenso` is the browser-facing half of an authorization server. The
//! protocol engine (request validation, token issuance, introspection,
//! revocation, discovery) lives in an external **Authorization Service**;
//! this crate decides whether the resource owner is already authenticated
//! with sufficient freshness and, when not, drives the login/consent page
//! before handing the decision back to the service.
//!
//! ## Authorization session
//!
//! Each browser carries an opaque `consenso_session` cookie that keys a
//! [`session::SessionRecord`]:
//!
//! - **Staged ticket:** written when the consent page is rendered, taken and
//!   cleared atomically when the decision form is submitted. A ticket is
//!   resumed at most once; a replayed form finds nothing and is rejected.
//! - **Identity:** the subject and the time it authenticated. Reused by later
//!   requests until `prompt=login` or an exceeded `max_age` invalidates it.
//!
//! ## Collaborators
//!
//! The Authorization Service, the user directory and the page renderer are
//! traits ([`authorization::AuthorizationService`],
//! [`directory::UserDirectory`], [`render::PageRenderer`]) so the flow can
//! be exercised without a network.

pub mod api;
pub mod authorization;
pub mod cli;
pub mod clock;
pub mod directory;
pub mod render;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
