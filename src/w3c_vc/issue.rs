//! # Credential Issuance
//!
//! Builds and signs credentials in either proof format. The format is an
//! explicit tagged union dispatched here, so a new proof suite is a new
//! variant rather than a new issuer.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::integrity;
use super::jose::{self, Algorithm, Header, VcClaims};
use super::vc::{CredentialSubject, Issuer, Kind, VerifiableCredential};
use crate::did::{Identifier, Resolver};
use crate::key::KeyManager;
use crate::provider::KeyStore;
use crate::{Error, Result};

const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// Proof formats a credential can be issued in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ProofFormat {
    /// An embedded `DataIntegrityProof`.
    #[default]
    #[serde(rename = "ldp_vc")]
    DataIntegrity,

    /// An enveloping VC-JWT proof. The issued artifact is a compact JWS.
    #[serde(rename = "jwt_vc_json")]
    Jwt,
}

impl ProofFormat {
    /// The format's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataIntegrity => "ldp_vc",
            Self::Jwt => "jwt_vc_json",
        }
    }
}

impl FromStr for ProofFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ldp_vc" => Ok(Self::DataIntegrity),
            "jwt_vc_json" => Ok(Self::Jwt),
            other => {
                Err(Error::UnsupportedProofFormat(format!("unsupported credential format {other}")))
            }
        }
    }
}

/// Issues credentials signed by a managed identifier.
#[derive(Clone)]
pub struct CredentialIssuer<P> {
    keys: KeyManager<P>,
    resolver: Resolver,
}

impl<P: KeyStore + Clone + Send + Sync> CredentialIssuer<P> {
    /// Create an issuer signing through the given key manager.
    pub fn new(keys: KeyManager<P>, resolver: Resolver) -> Self {
        Self { keys, resolver }
    }

    /// Issue a credential over the subject's claims, signed by the issuing
    /// identifier's controlling key.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationFailed` for undefined terms (Data-Integrity),
    /// and `NotFound`/`SigningFailed` when the controlling key is missing or
    /// the backend fails.
    pub async fn issue(
        &self, types: Vec<String>, subject: CredentialSubject, issuer: &Identifier,
        format: ProofFormat,
    ) -> Result<Kind<VerifiableCredential>> {
        let mut type_ = vec![VERIFIABLE_CREDENTIAL.to_string()];
        type_.extend(types.into_iter().filter(|t| t != VERIFIABLE_CREDENTIAL));

        let vc = VerifiableCredential {
            context: vec![
                integrity::CREDENTIALS_V1.to_string(),
                integrity::VDL_V1.to_string(),
            ],
            id: Some(format!("urn:uuid:{}", Uuid::new_v4())),
            type_,
            issuer: Kind::Object(Issuer { id: issuer.did.clone(), name: None }),
            issuance_date: Utc::now(),
            credential_subject: subject,
            proof: None,
        };

        // proofs reference the verification method the issuer's resolved
        // document publishes for assertion
        let document = self.resolver.resolve(&issuer.did)?;
        let Some(verification_method) = document.assertion_method.first().cloned() else {
            return Err(Error::NotFound(format!(
                "{} has no assertion verification method",
                issuer.did
            )));
        };

        match format {
            ProofFormat::DataIntegrity => {
                let proof = integrity::create(
                    &vc,
                    &verification_method,
                    &issuer.controller_key_id,
                    &self.keys,
                )
                .await?;
                Ok(Kind::Object(VerifiableCredential { proof: Some(proof), ..vc }))
            }
            ProofFormat::Jwt => {
                let header = Header {
                    alg: Algorithm::EdDSA,
                    typ: Some("JWT".to_string()),
                    kid: verification_method,
                };
                let claims = VcClaims::from(vc);
                let input = jose::signing_input(&claims, &header)?;
                let signature =
                    self.keys.sign(&issuer.controller_key_id, input.as_bytes()).await?;
                Ok(Kind::String(jose::encode(&input, &signature)))
            }
        }
    }
}
