//! # Credential Verification
//!
//! Verifies credentials in either proof format. Verification fails closed:
//! any unverifiable input yields a negative result with a specific reason
//! rather than an error, so malformed-but-parseable credentials never take
//! the verifier down.

use serde::{Deserialize, Serialize};

use super::integrity::{self, ASSERTION_METHOD, DATA_INTEGRITY_PROOF, EDDSA_JCS_2022};
use super::jose::{self, Jws, VcClaims};
use super::vc::{Kind, VerifiableCredential};
use crate::did::{Resolver, did_jwk};

/// The outcome of verifying a credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerifyResult {
    /// Whether the credential verified.
    pub verified: bool,

    /// Why verification failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerifyResult {
    fn ok() -> Self {
        Self { verified: true, reason: None }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self { verified: false, reason: Some(reason.into()) }
    }
}

/// Verifies credentials against their issuer's resolved key material.
#[derive(Clone)]
pub struct CredentialVerifier {
    resolver: Resolver,
}

impl CredentialVerifier {
    /// Create a verifier resolving issuers through the given resolver.
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Verify a credential in either proof format.
    #[must_use]
    pub fn verify(&self, credential: &Kind<VerifiableCredential>) -> VerifyResult {
        match credential {
            Kind::String(token) => self.verify_jwt(token),
            Kind::Object(vc) => self.verify_integrity(vc),
        }
    }

    fn verify_jwt(&self, token: &str) -> VerifyResult {
        let jws: Jws<VcClaims> = match jose::decode(token) {
            Ok(jws) => jws,
            Err(e) => return VerifyResult::failed(format!("malformed credential: {e}")),
        };

        // the signing key must belong to the claimed issuer
        if method_did(&jws.header.kid) != jws.claims.iss {
            return VerifyResult::failed("issuer mismatch");
        }

        let jwk = match did_jwk(&jws.header.kid, &self.resolver) {
            Ok(jwk) => jwk,
            Err(e) => {
                tracing::debug!("issuer resolution failed: {e}");
                return VerifyResult::failed("issuer unresolvable");
            }
        };

        match jose::verify(&jwk, jws.message.as_bytes(), &jws.signature) {
            Ok(()) => VerifyResult::ok(),
            Err(e) => {
                tracing::debug!("signature verification failed: {e}");
                VerifyResult::failed("signature invalid")
            }
        }
    }

    fn verify_integrity(&self, vc: &VerifiableCredential) -> VerifyResult {
        let Some(proof) = &vc.proof else {
            return VerifyResult::failed("credential has no proof");
        };
        if proof.type_ != DATA_INTEGRITY_PROOF || proof.cryptosuite != EDDSA_JCS_2022 {
            return VerifyResult::failed("unsupported proof type");
        }
        if proof.proof_purpose != ASSERTION_METHOD {
            return VerifyResult::failed("proof purpose mismatch");
        }

        // the signing key must belong to the claimed issuer
        if method_did(&proof.verification_method) != vc.issuer_id() {
            return VerifyResult::failed("issuer mismatch");
        }

        let jwk = match did_jwk(&proof.verification_method, &self.resolver) {
            Ok(jwk) => jwk,
            Err(e) => {
                tracing::debug!("issuer resolution failed: {e}");
                return VerifyResult::failed("issuer unresolvable");
            }
        };

        match integrity::verify(vc, &jwk) {
            Ok(()) => VerifyResult::ok(),
            Err(e) => {
                tracing::debug!("proof verification failed: {e}");
                VerifyResult::failed("signature invalid")
            }
        }
    }
}

// The DID portion of a verification method DID URL.
fn method_did(did_url: &str) -> &str {
    did_url.split('#').next().unwrap_or(did_url)
}
