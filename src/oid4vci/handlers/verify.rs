//! # Verify Endpoint
//!
//! Verifies a credential in either proof format. Unverifiable input yields
//! `verified: false` with a reason, never an error.

use crate::api::{Body, Handler, Request, Response};
use crate::oid4vci::Agent;
use crate::oid4vci::types::{VerifyRequest, VerifyResponse};
use crate::provider::Provider;
use crate::{Error, Result};

async fn verify<P: Provider>(
    _issuer: &str, agent: &Agent<P>, request: VerifyRequest,
) -> Result<VerifyResponse> {
    tracing::debug!("verify");

    let result = agent.verifier.verify(&request.credential);
    Ok(VerifyResponse {
        verified: result.verified,
        error: result.reason,
    })
}

impl<P: Provider> Handler<Agent<P>> for Request<VerifyRequest> {
    type Error = Error;
    type Provider = Agent<P>;
    type Response = VerifyResponse;

    async fn handle(
        self, issuer: &str, agent: &Self::Provider,
    ) -> Result<impl Into<Response<Self::Response>>, Self::Error> {
        verify(issuer, agent, self.body).await
    }
}

impl Body for VerifyRequest {}
