//! JSON-over-HTTPS client for the Authorization Service API.
//!
//! Every call authenticates with the service API key and secret (HTTP Basic)
//! and receives an `action` plus a `responseContent`. The action decides how
//! the content is relayed to the user agent.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

use super::credentials::BasicCredentials;
use super::service::{AuthorizationService, ServiceError};
use super::types::{
    AuthorizationRequestInfo, ClientInfo, Prompt, ProtocolResponse, ResumeRequest, ScopeInfo,
    TokenOutcome, Validation,
};
use axum::http::StatusCode;

const TOKEN_REALM_CHALLENGE: &str = "Basic realm=\"token\"";

pub struct RemoteAuthorizationService {
    client: Client,
    base_url: Url,
    api_key: String,
    api_secret: SecretString,
}

impl RemoteAuthorizationService {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: Url,
        api_key: String,
        api_secret: SecretString,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            api_secret,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let span = info_span!("authorization_service.call", http.method = "POST", url = %url);
        let response = self
            .client
            .post(url)
            .basic_auth(&self.api_key, Some(self.api_secret.expose_secret()))
            .json(body)
            .send()
            .instrument(span)
            .await?;
        decode(response).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ServiceError> {
        let url = self.endpoint(path)?;
        let span = info_span!("authorization_service.call", http.method = "GET", url = %url);
        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(self.api_secret.expose_secret()))
            .send()
            .instrument(span)
            .await?;
        decode(response).await
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

#[derive(Serialize)]
struct ParametersBody<'a> {
    parameters: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientParametersBody<'a> {
    parameters: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
}

impl<'a> ClientParametersBody<'a> {
    fn new(parameters: &'a str, client: Option<&'a BasicCredentials>) -> Self {
        Self {
            parameters,
            client_id: client.map(|c| c.user_id.as_str()),
            client_secret: client.map(|c| c.password.expose_secret()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueBody<'a> {
    ticket: &'a str,
    subject: &'a str,
    auth_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    claims: Option<String>,
}

#[derive(Serialize)]
struct FailBody<'a> {
    ticket: &'a str,
    reason: &'static str,
}

#[derive(Serialize)]
struct TokenIssueBody<'a> {
    ticket: &'a str,
    subject: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ActionResponse {
    action: String,
    response_content: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireClient {
    client_id: Option<String>,
    client_name: Option<String>,
    description: Option<String>,
    logo_uri: Option<String>,
    client_uri: Option<String>,
    policy_uri: Option<String>,
    tos_uri: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireScope {
    name: String,
    description: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AuthorizationResponse {
    action: String,
    response_content: Option<String>,
    ticket: Option<String>,
    claims: Option<Vec<String>>,
    claims_locales: Option<Vec<String>>,
    prompts: Option<Vec<Prompt>>,
    max_age: Option<u64>,
    client: Option<WireClient>,
    scopes: Option<Vec<WireScope>>,
    login_hint: Option<String>,
}

impl AuthorizationResponse {
    fn into_info(self) -> AuthorizationRequestInfo {
        let client = self.client.unwrap_or_default();
        AuthorizationRequestInfo {
            ticket: self.ticket.unwrap_or_default(),
            claim_names: self.claims.unwrap_or_default(),
            claim_locales: self.claims_locales.unwrap_or_default(),
            prompts: self
                .prompts
                .unwrap_or_default()
                .into_iter()
                .collect::<BTreeSet<_>>(),
            max_age: self.max_age,
            client: ClientInfo {
                client_id: client.client_id.unwrap_or_default(),
                client_name: client.client_name,
                description: client.description,
                logo_uri: client.logo_uri,
                client_uri: client.client_uri,
                policy_uri: client.policy_uri,
                tos_uri: client.tos_uri,
            },
            scopes: self
                .scopes
                .unwrap_or_default()
                .into_iter()
                .map(|scope| ScopeInfo {
                    name: scope.name,
                    description: scope.description,
                })
                .collect(),
            login_hint: self.login_hint,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TokenResponse {
    action: String,
    response_content: Option<String>,
    ticket: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Map a service action to the response relayed to the user agent.
fn relay(action: &str, content: Option<String>) -> Result<ProtocolResponse, ServiceError> {
    let content = content.unwrap_or_default();
    let response = match action {
        "OK" => ProtocolResponse::json(StatusCode::OK, content),
        "BAD_REQUEST" => ProtocolResponse::json(StatusCode::BAD_REQUEST, content),
        "INVALID_CLIENT" => ProtocolResponse::json(StatusCode::UNAUTHORIZED, content)
            .with_www_authenticate(TOKEN_REALM_CHALLENGE),
        "INTERNAL_SERVER_ERROR" => {
            ProtocolResponse::json(StatusCode::INTERNAL_SERVER_ERROR, content)
        }
        "LOCATION" => ProtocolResponse::redirect(content),
        "FORM" => ProtocolResponse::html(StatusCode::OK, content),
        other => return Err(ServiceError::UnexpectedAction(other.to_string())),
    };
    Ok(response)
}

#[async_trait]
impl AuthorizationService for RemoteAuthorizationService {
    #[instrument(skip_all)]
    async fn validate(&self, parameters: &str) -> Result<Validation, ServiceError> {
        let response: AuthorizationResponse = self
            .post("/api/auth/authorization", &ParametersBody { parameters })
            .await?;
        debug!(action = %response.action, "authorization request validated");

        match response.action.as_str() {
            "INTERACTION" => Ok(Validation::Interaction(response.into_info())),
            "NO_INTERACTION" => Ok(Validation::NoInteraction(response.into_info())),
            action => relay(action, response.response_content).map(Validation::Respond),
        }
    }

    #[instrument(skip_all, fields(authorized = request.authorized, subject = request.subject.is_some()))]
    async fn resume_with_identity(
        &self,
        request: ResumeRequest,
    ) -> Result<ProtocolResponse, ServiceError> {
        let response: ActionResponse = match (request.subject.as_deref(), request.authorized) {
            (Some(subject), true) => {
                let claims = if request.claims.is_empty() {
                    None
                } else {
                    Some(Value::Object(request.claims.clone()).to_string())
                };
                let body = IssueBody {
                    ticket: &request.ticket,
                    subject,
                    auth_time: request.auth_time.unwrap_or(0),
                    claims,
                };
                self.post("/api/auth/authorization/issue", &body).await?
            }
            (_, authorized) => {
                let reason = if authorized {
                    "NOT_AUTHENTICATED"
                } else {
                    "DENIED"
                };
                let body = FailBody {
                    ticket: &request.ticket,
                    reason,
                };
                self.post("/api/auth/authorization/fail", &body).await?
            }
        };
        relay(&response.action, response.response_content)
    }

    #[instrument(skip_all)]
    async fn token(
        &self,
        parameters: &str,
        client: Option<&BasicCredentials>,
    ) -> Result<TokenOutcome, ServiceError> {
        let response: TokenResponse = self
            .post(
                "/api/auth/token",
                &ClientParametersBody::new(parameters, client),
            )
            .await?;

        if response.action == "PASSWORD" {
            return Ok(TokenOutcome::Password {
                ticket: response.ticket.unwrap_or_default(),
                username: response.username.unwrap_or_default(),
                password: SecretString::from(response.password.unwrap_or_default()),
            });
        }
        relay(&response.action, response.response_content).map(TokenOutcome::Respond)
    }

    #[instrument(skip_all, fields(authenticated = subject.is_some()))]
    async fn resume_password_grant(
        &self,
        ticket: &str,
        subject: Option<&str>,
    ) -> Result<ProtocolResponse, ServiceError> {
        let response: ActionResponse = match subject {
            Some(subject) => {
                self.post("/api/auth/token/issue", &TokenIssueBody { ticket, subject })
                    .await?
            }
            None => {
                let body = FailBody {
                    ticket,
                    reason: "INVALID_RESOURCE_OWNER_CREDENTIALS",
                };
                self.post("/api/auth/token/fail", &body).await?
            }
        };
        relay(&response.action, response.response_content)
    }

    #[instrument(skip_all)]
    async fn introspect(&self, parameters: &str) -> Result<ProtocolResponse, ServiceError> {
        let response: ActionResponse = self
            .post(
                "/api/auth/introspection/standard",
                &ParametersBody { parameters },
            )
            .await?;
        relay(&response.action, response.response_content)
    }

    #[instrument(skip_all)]
    async fn revoke(
        &self,
        parameters: &str,
        client: Option<&BasicCredentials>,
    ) -> Result<ProtocolResponse, ServiceError> {
        let response: ActionResponse = self
            .post(
                "/api/auth/revocation",
                &ClientParametersBody::new(parameters, client),
            )
            .await?;
        relay(&response.action, response.response_content)
    }

    #[instrument(skip_all)]
    async fn configuration(&self) -> Result<ProtocolResponse, ServiceError> {
        let document: Map<String, Value> = self.get("/api/service/configuration").await?;
        Ok(ProtocolResponse::json(
            StatusCode::OK,
            Value::Object(document).to_string(),
        ))
    }

    #[instrument(skip_all)]
    async fn jwks(&self) -> Result<ProtocolResponse, ServiceError> {
        let document: Map<String, Value> = self.get("/api/service/jwks/get").await?;
        Ok(ProtocolResponse::json(
            StatusCode::OK,
            Value::Object(document).to_string(),
        ))
    }
}
