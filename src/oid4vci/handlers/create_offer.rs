//! # Create Offer Endpoint
//!
//! Creates a credential offer carrying a single-redemption pre-authorized
//! code. The grant state is durable before the offer is returned.

use anyhow::Context as _;
use chrono::Utc;

use crate::api::{Body, Handler, Request, Response};
use crate::error::invalid;
use crate::generate;
use crate::oid4vci::Agent;
use crate::oid4vci::types::{
    CreateOfferRequest, CredentialOffer, Grants, IssuerMetadata, PreAuthorizedCodeGrant,
};
use crate::provider::{Metadata, Provider, StateStore};
use crate::state::{Expire, Offered, State};
use crate::{Error, Result};

async fn create_offer<P: Provider>(
    issuer: &str, agent: &Agent<P>, request: CreateOfferRequest,
) -> Result<CredentialOffer> {
    let Ok(metadata) = Metadata::issuer(&agent.provider, issuer).await else {
        return Err(Error::NotFound("unknown credential issuer".to_string()));
    };
    request.verify(&metadata)?;

    let mut credential_types = request.credential_types;
    if credential_types.is_empty() {
        for config in &metadata.credentials_supported {
            for type_ in &config.types {
                if type_ != "VerifiableCredential" && !credential_types.contains(type_) {
                    credential_types.push(type_.clone());
                }
            }
        }
    }
    if credential_types.is_empty() {
        return Err(invalid!("no credential types on offer"));
    }

    let pre_authorized_code = generate::code();
    let state = State {
        body: Offered {
            subject_id: request.subject_id,
            credential_types: credential_types.clone(),
        },
        expires_at: Utc::now() + Expire::Grant.duration(),
    };
    StateStore::put(&agent.provider, &pre_authorized_code, &state)
        .await
        .context("saving offer state")?;

    Ok(CredentialOffer {
        credential_issuer: issuer.to_string(),
        credentials: credential_types,
        grants: Grants {
            pre_authorized_code: PreAuthorizedCodeGrant {
                pre_authorized_code,
                user_pin_required: false,
            },
        },
    })
}

impl<P: Provider> Handler<Agent<P>> for Request<CreateOfferRequest> {
    type Error = Error;
    type Provider = Agent<P>;
    type Response = CredentialOffer;

    async fn handle(
        self, issuer: &str, agent: &Self::Provider,
    ) -> Result<impl Into<Response<Self::Response>>, Self::Error> {
        create_offer(issuer, agent, self.body).await
    }
}

impl Body for CreateOfferRequest {}

impl CreateOfferRequest {
    // Verify the create offer request.
    fn verify(&self, metadata: &IssuerMetadata) -> Result<()> {
        tracing::debug!("create_offer::verify");

        for requested in &self.credential_types {
            if !metadata.credentials_supported.iter().any(|c| c.types.contains(requested)) {
                return Err(invalid!("credential type {requested} is not supported"));
            }
        }
        Ok(())
    }
}
