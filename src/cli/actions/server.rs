use crate::{
    api,
    authorization::{
        AuthorizationConfig, AuthorizationState, BasicCredentials, RemoteAuthorizationService,
    },
    cli::telemetry,
    clock::SystemClock,
    directory::JsonUserDirectory,
    render::TemplateRenderer,
    session::MemorySessionStore,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub service_url: Url,
    pub service_api_key: String,
    pub service_api_secret: SecretString,
    pub service_timeout_seconds: u64,
    pub users_file: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub session_ttl_seconds: i64,
    pub public_url: String,
    pub non_interactive_resume: bool,
    pub introspection_clients: Vec<BasicCredentials>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the user directory cannot be loaded, the service
/// client cannot be built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let directory = match &args.users_file {
        Some(path) => JsonUserDirectory::from_path(path)
            .with_context(|| format!("Failed to load user directory: {}", path.display()))?,
        None => {
            info!("No users file configured; every login will fail");
            JsonUserDirectory::empty()
        }
    };
    debug!("Loaded {} users", directory.len());

    let service = RemoteAuthorizationService::new(
        args.service_url,
        args.service_api_key,
        args.service_api_secret,
        Duration::from_secs(args.service_timeout_seconds),
    )
    .context("Failed to build Authorization Service client")?;

    let clock = Arc::new(SystemClock);
    let sessions = MemorySessionStore::new(args.session_ttl_seconds, clock.clone());

    let config = AuthorizationConfig::new(args.public_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_non_interactive_resume(args.non_interactive_resume)
        .with_introspection_clients(args.introspection_clients);

    let state = Arc::new(AuthorizationState::new(
        config,
        Arc::new(service),
        Arc::new(directory),
        Arc::new(TemplateRenderer::new(args.templates_dir)),
        Arc::new(sessions),
        clock,
    ));

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}
