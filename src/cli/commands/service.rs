//! Authorization Service connection arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_SERVICE_URL: &str = "service-url";
pub const ARG_SERVICE_API_KEY: &str = "service-api-key";
pub const ARG_SERVICE_API_SECRET: &str = "service-api-secret";
pub const ARG_SERVICE_TIMEOUT_SECONDS: &str = "service-timeout-seconds";

#[derive(Debug)]
pub struct Options {
    pub url: Url,
    pub api_key: String,
    pub api_secret: SecretString,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse Authorization Service arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing or the URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let required = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .with_context(|| format!("missing required argument: --{id}"))
        };

        let raw_url = required(ARG_SERVICE_URL)?;
        // A trailing slash keeps relative endpoint joins under the base path.
        let url = Url::parse(&format!("{}/", raw_url.trim_end_matches('/')))
            .with_context(|| format!("invalid --{ARG_SERVICE_URL}: {raw_url}"))?;

        Ok(Self {
            url,
            api_key: required(ARG_SERVICE_API_KEY)?,
            api_secret: SecretString::from(required(ARG_SERVICE_API_SECRET)?),
            timeout_seconds: matches
                .get_one::<u64>(ARG_SERVICE_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SERVICE_URL)
                .long(ARG_SERVICE_URL)
                .help("Base URL of the Authorization Service API")
                .env("CONSENSO_SERVICE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SERVICE_API_KEY)
                .long(ARG_SERVICE_API_KEY)
                .help("API key used to authenticate against the Authorization Service")
                .env("CONSENSO_SERVICE_API_KEY")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SERVICE_API_SECRET)
                .long(ARG_SERVICE_API_SECRET)
                .help("API secret used to authenticate against the Authorization Service")
                .env("CONSENSO_SERVICE_API_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SERVICE_TIMEOUT_SECONDS)
                .long(ARG_SERVICE_TIMEOUT_SECONDS)
                .help("Timeout for each Authorization Service call")
                .env("CONSENSO_SERVICE_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}
