//! # Metadata Endpoint
//!
//! Serves the issuer's `.well-known/openid-credential-issuer` metadata
//! document from the provider.

use crate::api::{Body, Handler, Request, Response};
use crate::oid4vci::Agent;
use crate::oid4vci::types::{IssuerMetadata, MetadataRequest};
use crate::provider::{Metadata, Provider};
use crate::{Error, Result};

async fn metadata<P: Provider>(
    issuer: &str, agent: &Agent<P>, _request: MetadataRequest,
) -> Result<IssuerMetadata> {
    tracing::debug!("metadata");

    let Ok(metadata) = Metadata::issuer(&agent.provider, issuer).await else {
        return Err(Error::NotFound("unknown credential issuer".to_string()));
    };
    Ok(metadata)
}

impl<P: Provider> Handler<Agent<P>> for Request<MetadataRequest> {
    type Error = Error;
    type Provider = Agent<P>;
    type Response = IssuerMetadata;

    async fn handle(
        self, issuer: &str, agent: &Self::Provider,
    ) -> Result<impl Into<Response<Self::Response>>, Self::Error> {
        metadata(issuer, agent, self.body).await
    }
}

impl Body for MetadataRequest {}
