//! Session, page and endpoint arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::BoolishValueParser};
use std::path::PathBuf;

use crate::authorization::BasicCredentials;

pub const ARG_USERS_FILE: &str = "users-file";
pub const ARG_TEMPLATES_DIR: &str = "templates-dir";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_PUBLIC_URL: &str = "public-url";
pub const ARG_NON_INTERACTIVE_RESUME: &str = "non-interactive-resume";
pub const ARG_INTROSPECTION_CLIENT: &str = "introspection-client";

#[derive(Debug)]
pub struct Options {
    pub users_file: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub session_ttl_seconds: i64,
    pub public_url: String,
    pub non_interactive_resume: bool,
    pub introspection_clients: Vec<BasicCredentials>,
}

impl Options {
    /// Parse authorization arguments from matches.
    ///
    /// # Errors
    /// Returns an error on a malformed introspection client or a
    /// non-positive session TTL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(1800);
        if session_ttl_seconds <= 0 {
            anyhow::bail!("--{ARG_SESSION_TTL_SECONDS} must be positive");
        }

        let introspection_clients = matches
            .get_many::<String>(ARG_INTROSPECTION_CLIENT)
            .unwrap_or_default()
            .filter(|pair| !pair.trim().is_empty())
            .map(|pair| {
                BasicCredentials::from_pair(pair).with_context(|| {
                    format!("invalid --{ARG_INTROSPECTION_CLIENT}: expected id:secret")
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            users_file: matches.get_one::<PathBuf>(ARG_USERS_FILE).cloned(),
            templates_dir: matches.get_one::<PathBuf>(ARG_TEMPLATES_DIR).cloned(),
            session_ttl_seconds,
            public_url: matches
                .get_one::<String>(ARG_PUBLIC_URL)
                .cloned()
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            non_interactive_resume: matches.get_flag(ARG_NON_INTERACTIVE_RESUME),
            introspection_clients,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_USERS_FILE)
                .long(ARG_USERS_FILE)
                .help("JSON user directory (subject, login_id, argon2 password_hash, claims)")
                .env("CONSENSO_USERS_FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_TEMPLATES_DIR)
                .long(ARG_TEMPLATES_DIR)
                .help("Directory holding authorization.html; defaults to the embedded page")
                .env("CONSENSO_TEMPLATES_DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Idle lifetime of a browser session in seconds")
                .env("CONSENSO_SESSION_TTL_SECONDS")
                .default_value("1800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Externally visible base URL; https marks the session cookie Secure")
                .env("CONSENSO_PUBLIC_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_NON_INTERACTIVE_RESUME)
                .long(ARG_NON_INTERACTIVE_RESUME)
                .help("Resume requests the service marks as non-interactive (prompt=none)")
                .env("CONSENSO_NON_INTERACTIVE_RESUME")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_INTROSPECTION_CLIENT)
                .long(ARG_INTROSPECTION_CLIENT)
                .help("id:secret allowed to call the introspection endpoint (repeatable)")
                .env("CONSENSO_INTROSPECTION_CLIENTS")
                .hide_env_values(true)
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
}
