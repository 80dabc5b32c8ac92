//! # Token Endpoint
//!
//! Exchanges a pre-authorized code for an access token and `c_nonce`. The
//! grant is consumed atomically, so at most one token is ever minted per
//! code, even under concurrent redemption.

use anyhow::Context as _;
use chrono::Utc;

use crate::api::{Body, Handler, Request, Response};
use crate::error::invalid;
use crate::generate;
use crate::oid4vci::Agent;
use crate::oid4vci::types::{PRE_AUTHORIZED_CODE, TokenRequest, TokenResponse};
use crate::provider::{Provider, StateStore};
use crate::state::{Expire, Issued, Offered, State};
use crate::{Error, Result};

async fn token<P: Provider>(
    _issuer: &str, agent: &Agent<P>, request: TokenRequest,
) -> Result<TokenResponse> {
    request.verify()?;

    let Some(code) = &request.pre_authorized_code else {
        return Err(invalid!("`pre-authorized_code` is missing"));
    };

    // consuming the grant and reading it is one atomic operation
    let Some(state) =
        StateStore::take::<Offered>(&agent.provider, code).await.context("taking grant state")?
    else {
        return Err(Error::InvalidGrant("invalid pre-authorized code".to_string()));
    };
    if state.is_expired() {
        return Err(Error::InvalidGrant("pre-authorized code expired".to_string()));
    }

    let state = State {
        body: Issued {
            access_token: generate::token(),
            c_nonce: generate::nonce(),
            grant_code: code.clone(),
            subject_id: state.body.subject_id,
            credential_types: state.body.credential_types,
            consumed: false,
        },
        expires_at: Utc::now() + Expire::Access.duration(),
    };
    StateStore::put(&agent.provider, &state.body.access_token, &state)
        .await
        .context("saving token state")?;

    Ok(TokenResponse {
        access_token: state.body.access_token,
        token_type: "bearer".to_string(),
        expires_in: Expire::Access.duration().num_seconds(),
        c_nonce: state.body.c_nonce,
        c_nonce_expires_in: Expire::CNonce.duration().num_seconds(),
    })
}

impl<P: Provider> Handler<Agent<P>> for Request<TokenRequest> {
    type Error = Error;
    type Provider = Agent<P>;
    type Response = TokenResponse;

    async fn handle(
        self, issuer: &str, agent: &Self::Provider,
    ) -> Result<impl Into<Response<Self::Response>>, Self::Error> {
        token(issuer, agent, self.body).await
    }
}

impl Body for TokenRequest {}

impl TokenRequest {
    // Verify the token request.
    fn verify(&self) -> Result<()> {
        tracing::debug!("token::verify");

        if self.grant_type != PRE_AUTHORIZED_CODE {
            return Err(Error::UnsupportedGrantType(format!(
                "unsupported grant type {}",
                self.grant_type
            )));
        }
        Ok(())
    }
}
