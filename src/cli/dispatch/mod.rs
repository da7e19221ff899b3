//! Map validated CLI arguments to an action.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, authorization, service};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let service_opts = service::Options::parse(matches)?;
    let authorization_opts = authorization::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        service_url: service_opts.url,
        service_api_key: service_opts.api_key,
        service_api_secret: service_opts.api_secret,
        service_timeout_seconds: service_opts.timeout_seconds,
        users_file: authorization_opts.users_file,
        templates_dir: authorization_opts.templates_dir,
        session_ttl_seconds: authorization_opts.session_ttl_seconds,
        public_url: authorization_opts.public_url,
        non_interactive_resume: authorization_opts.non_interactive_resume,
        introspection_clients: authorization_opts.introspection_clients,
    }))
}
