//! # OpenID for Verifiable Credential Issuance
//!
//! The pre-authorized code flow: offer, token, and credential endpoints,
//! plus issuer metadata and a verification entry point. Requests are routed
//! to the appropriate handler for processing, returning a response that can
//! be serialized to a JSON object or directly to HTTP.

pub mod agent;
mod handlers;
pub mod types;

use std::fmt::Debug;

use tracing::instrument;

pub use self::agent::{Agent, AgentConfig, TokenPolicy};
use crate::api::{Body, Handler, Headers, Request, Response};
use crate::error::Error;
use crate::provider::Provider;
use crate::Result;

/// Handle incoming requests.
///
/// # Errors
///
/// This method can fail for a number of reasons related to the incoming
/// request's viability. Expected failures include an invalid or expired
/// grant, a missing or reused access token, and invalid request content.
///
/// Implementers should look to the [`Error`] type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(agent))]
pub async fn handle<B, H, P, U>(
    issuer: &str, request: impl Into<Request<B, H>> + Debug, agent: &Agent<P>,
) -> Result<Response<U>>
where
    B: Body,
    H: Headers,
    P: Provider,
    Request<B, H>: Handler<Agent<P>, Provider = Agent<P>, Response = U, Error = Error>,
{
    let request: Request<B, H> = request.into();
    Ok(request.handle(issuer, agent).await?.into())
}
