//! # Credential Endpoint
//!
//! Delivers the credential a valid access token grants: the issuer's
//! identifier is seeded on first use, caller-supplied subject claims are
//! merged over the issuer's defaults, and the token's redemption state is
//! durable before the credential is returned.

use anyhow::Context as _;
use serde_json::Value;

use crate::api::{AuthorizationHeader, Body, Handler, Request, Response};
use crate::error::invalid;
use crate::key::KeyType;
use crate::oid4vci::Agent;
use crate::oid4vci::agent::TokenPolicy;
use crate::oid4vci::types::{CredentialRequest, CredentialResponse};
use crate::provider::{Provider, StateStore, Subject};
use crate::state::Issued;
use crate::w3c_vc::issue::ProofFormat;
use crate::w3c_vc::vc::CredentialSubject;
use crate::{Error, Result};

const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

async fn credential<P: Provider>(
    _issuer: &str, agent: &Agent<P>, request: CredentialRequest, authorization: &str,
) -> Result<CredentialResponse> {
    tracing::debug!("credential");

    let token = bearer_token(authorization)?;

    let Some(mut state) =
        StateStore::take::<Issued>(&agent.provider, token).await.context("taking token state")?
    else {
        return Err(Error::AccessDenied("invalid access token".to_string()));
    };
    if state.is_expired() {
        return Err(Error::AccessDenied("access token expired".to_string()));
    }
    if state.body.consumed && agent.config.token_policy == TokenPolicy::SingleUse {
        // keep the marker so repeated reuse keeps reporting as such
        StateStore::put(&agent.provider, token, &state)
            .await
            .context("restoring token state")?;
        return Err(Error::AccessDenied("access token already used".to_string()));
    }

    // validate the request before the token is consumed: a rejected request
    // must leave the token redeemable
    let (format, credential_types) = match request.verify(&state.body.credential_types) {
        Ok(validated) => validated,
        Err(e) => {
            StateStore::put(&agent.provider, token, &state)
                .await
                .context("restoring token state")?;
            return Err(e);
        }
    };
    let Some(primary_type) = credential_types.iter().find(|t| *t != VERIFIABLE_CREDENTIAL).cloned()
    else {
        StateStore::put(&agent.provider, token, &state).await.context("restoring token state")?;
        return Err(invalid!("no credential type requested"));
    };

    // mark the token before issuing so a concurrent request cannot redeem it
    // a second time
    state.body.consumed = agent.config.token_policy == TokenPolicy::SingleUse;
    StateStore::put(&agent.provider, token, &state).await.context("saving token state")?;

    match issue(agent, &request, &state.body, format, credential_types, &primary_type).await {
        Ok(response) => Ok(response),
        Err(e) => {
            // the token is only consumed by a successful delivery
            state.body.consumed = false;
            StateStore::put(&agent.provider, token, &state)
                .await
                .context("restoring token state")?;
            Err(e)
        }
    }
}

async fn issue<P: Provider>(
    agent: &Agent<P>, request: &CredentialRequest, issued: &Issued, format: ProofFormat,
    credential_types: Vec<String>, primary_type: &str,
) -> Result<CredentialResponse> {
    // the issuing identifier is created on first use
    let (identifier, _existed) = agent
        .dids
        .seed(&agent.config.issuer_alias, &agent.config.did_provider, KeyType::Ed25519)
        .await?;

    // caller-supplied claims override the issuer's defaults
    let mut claims =
        Subject::dataset(&agent.provider, primary_type).await.context("fetching dataset")?;
    let mut subject_id = issued.subject_id.clone();
    if let Some(overrides) = &request.credential_subject {
        for (key, value) in overrides {
            if key == "id" {
                if let Value::String(id) = value {
                    subject_id = Some(id.clone());
                }
                continue;
            }
            claims.insert(key.clone(), value.clone());
        }
    }
    let subject = CredentialSubject {
        id: Some(subject_id.unwrap_or_else(|| identifier.did.clone())),
        claims,
    };

    let credential = agent.issuer.issue(credential_types, subject, &identifier, format).await?;

    Ok(CredentialResponse {
        format: format.as_str().to_string(),
        credential,
    })
}

fn bearer_token(authorization: &str) -> Result<&str> {
    if authorization.is_empty() {
        return Err(Error::Unauthorized("missing authorization".to_string()));
    }
    let Some(token) = authorization.strip_prefix("Bearer ") else {
        return Err(Error::Unauthorized("authorization is not a bearer token".to_string()));
    };
    if token.is_empty() {
        return Err(Error::Unauthorized("empty bearer token".to_string()));
    }
    Ok(token)
}

impl<P: Provider> Handler<Agent<P>> for Request<CredentialRequest, AuthorizationHeader> {
    type Error = Error;
    type Provider = Agent<P>;
    type Response = CredentialResponse;

    async fn handle(
        self, issuer: &str, agent: &Self::Provider,
    ) -> Result<impl Into<Response<Self::Response>>, Self::Error> {
        credential(issuer, agent, self.body, &self.headers.authorization).await
    }
}

impl Body for CredentialRequest {}

impl CredentialRequest {
    // Verify the credential request against the types the token grants,
    // returning the proof format and credential types to issue.
    fn verify(&self, granted_types: &[String]) -> Result<(ProofFormat, Vec<String>)> {
        tracing::debug!("credential::verify");

        let format: ProofFormat = match &self.format {
            Some(format) => format.parse()?,
            None => ProofFormat::default(),
        };

        let credential_types = if self.types.is_empty() {
            granted_types.to_vec()
        } else {
            for type_ in &self.types {
                if type_ != VERIFIABLE_CREDENTIAL && !granted_types.contains(type_) {
                    return Err(Error::AccessDenied(format!(
                        "credential type {type_} was not authorized"
                    )));
                }
            }
            self.types.clone()
        };

        Ok((format, credential_types))
    }
}
