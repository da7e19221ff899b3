//! Authorization flow: the consent page, the decision form and the protocol
//! endpoints relayed to the Authorization Service.

mod credentials;
mod decision;
mod error;
mod flow;
mod protocol;
mod remote;
mod service;
mod state;
mod types;

pub use credentials::BasicCredentials;
pub use decision::{Decision, handle_decision};
pub use error::{FlowError, FlowOutcome, Reply};
pub use flow::handle;
pub use protocol::{handle_introspection, handle_revocation, handle_token};
pub use remote::RemoteAuthorizationService;
pub use service::{AuthorizationService, ServiceError};
pub use state::{AuthorizationConfig, AuthorizationState};
pub use types::{
    AuthorizationRequestInfo, ClientInfo, HTML_UTF8, JSON_UTF8, Prompt, ProtocolResponse,
    ResumeRequest, ScopeInfo, TokenOutcome, Validation,
};
