//! # Data-Integrity Proofs
//!
//! The `eddsa-jcs-2022` cryptosuite: JCS canonicalization (RFC 8785) of the
//! proofless document and the proof options, SHA-256 digests, an EdDSA
//! signature, and a multibase-encoded `proofValue`.
//!
//! Canonicalization fails closed: a credential whose terms are not defined
//! by a supplied `@context` entry is rejected before anything is signed.

use chrono::{DateTime, Utc};
use multibase::Base;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::jose;
use super::vc::VerifiableCredential;
use crate::did::document::PublicKeyJwk;
use crate::key::KeyManager;
use crate::provider::KeyStore;
use crate::{Error, Result};

/// The proof type for embedded proofs.
pub const DATA_INTEGRITY_PROOF: &str = "DataIntegrityProof";

/// The cryptosuite implemented by this module.
pub const EDDSA_JCS_2022: &str = "eddsa-jcs-2022";

/// The proof purpose credentials are issued under.
pub const ASSERTION_METHOD: &str = "assertionMethod";

/// The W3C Verifiable Credentials core context.
pub const CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// The vocabulary context for driving licence credentials.
pub const VDL_V1: &str = "https://w3id.org/vdl/v1";

/// An embedded Data-Integrity proof.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// The proof type. Always "DataIntegrityProof" here.
    #[serde(rename = "type")]
    pub type_: String,

    /// The cryptosuite securing the proof.
    pub cryptosuite: String,

    /// When the proof was created.
    pub created: DateTime<Utc>,

    /// The DID URL of the key that can verify the proof.
    pub verification_method: String,

    /// The purpose the proof may be used for.
    pub proof_purpose: String,

    /// The multibase-encoded signature. Empty while the proof options are
    /// being canonicalized.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proof_value: String,
}

// Term definitions for the contexts the engine knows. Resolution is local:
// context documents are never fetched from the network.
fn defined_terms(context: &str) -> Option<&'static [&'static str]> {
    match context {
        CREDENTIALS_V1 => Some(&[
            "VerifiableCredential",
            "id",
            "type",
            "issuer",
            "issuanceDate",
            "expirationDate",
            "credentialSubject",
            "credentialStatus",
            "proof",
        ]),
        VDL_V1 => Some(&[
            "MobileDrivingLicence",
            "givenName",
            "familyName",
            "birthDate",
            "drivingClass",
            "expiryDate",
            "issuingAuthority",
            "documentNumber",
        ]),
        _ => None,
    }
}

/// Check every credential term is defined by a supplied `@context` entry.
/// Fails closed: unknown context entries and undefined terms are both
/// rejected.
///
/// # Errors
///
/// Returns `CanonicalizationFailed` naming the offending entry or term.
pub fn check_terms(vc: &VerifiableCredential) -> Result<()> {
    let mut terms: Vec<&str> = vec![];
    for context in &vc.context {
        let Some(defined) = defined_terms(context) else {
            return Err(Error::CanonicalizationFailed(format!(
                "unknown @context entry {context}"
            )));
        };
        terms.extend(defined);
    }

    for type_ in &vc.type_ {
        if !terms.contains(&type_.as_str()) {
            return Err(Error::CanonicalizationFailed(format!(
                "type {type_} is not defined by any @context entry"
            )));
        }
    }
    for claim in vc.credential_subject.claims.keys() {
        if !terms.contains(&claim.as_str()) {
            return Err(Error::CanonicalizationFailed(format!(
                "term {claim} is not defined by any @context entry"
            )));
        }
    }

    Ok(())
}

/// Canonicalize a document per JCS (RFC 8785). Object members serialize in
/// lexicographic key order, so two documents with the same data but
/// different member order canonicalize identically.
///
/// # Errors
///
/// Returns `CanonicalizationFailed` if the document cannot be serialized.
pub fn canonicalize<T: Serialize>(document: &T) -> Result<String> {
    // serde_json's Map orders members by key, making serialization canonical
    let value: Value = serde_json::to_value(document)
        .map_err(|e| Error::CanonicalizationFailed(e.to_string()))?;
    serde_json::to_string(&value).map_err(|e| Error::CanonicalizationFailed(e.to_string()))
}

// The eddsa-jcs-2022 hash data: SHA-256 of the canonical proof options
// followed by SHA-256 of the canonical proofless document.
fn hash_data(unsigned: &VerifiableCredential, options: &Proof) -> Result<Vec<u8>> {
    let config = canonicalize(options)?;
    let document = canonicalize(unsigned)?;

    let mut hash = Sha256::digest(config.as_bytes()).to_vec();
    hash.extend(Sha256::digest(document.as_bytes()));
    Ok(hash)
}

/// Create an `eddsa-jcs-2022` proof over the credential, signed by the
/// managed key `kid` and verifiable through `verification_method`.
///
/// # Errors
///
/// Returns `CanonicalizationFailed` for undefined terms, and the key
/// manager's errors when signing fails.
pub async fn create<P: KeyStore + Clone + Send + Sync>(
    vc: &VerifiableCredential, verification_method: &str, kid: &str, keys: &KeyManager<P>,
) -> Result<Proof> {
    check_terms(vc)?;

    let mut unsigned = vc.clone();
    unsigned.proof = None;

    let mut proof = Proof {
        type_: DATA_INTEGRITY_PROOF.to_string(),
        cryptosuite: EDDSA_JCS_2022.to_string(),
        created: Utc::now(),
        verification_method: verification_method.to_string(),
        proof_purpose: ASSERTION_METHOD.to_string(),
        proof_value: String::new(),
    };

    let digest = hash_data(&unsigned, &proof)?;
    let signature = keys.sign(kid, &digest).await?;
    proof.proof_value = multibase::encode(Base::Base58Btc, &signature);

    Ok(proof)
}

/// Verify a credential's embedded proof against the given public key.
///
/// # Errors
///
/// Returns `SignatureInvalid` when the proof is missing, malformed, or does
/// not verify.
pub fn verify(vc: &VerifiableCredential, jwk: &PublicKeyJwk) -> Result<()> {
    let Some(proof) = &vc.proof else {
        return Err(Error::SignatureInvalid("credential has no proof".to_string()));
    };

    let mut unsigned = vc.clone();
    unsigned.proof = None;
    let mut options = proof.clone();
    options.proof_value = String::new();

    let digest = hash_data(&unsigned, &options)?;
    let (_, signature) = multibase::decode(&proof.proof_value)
        .map_err(|e| Error::SignatureInvalid(format!("invalid proofValue: {e}")))?;

    jose::verify(jwk, &digest, &signature)
        .map_err(|e| Error::SignatureInvalid(format!("proof does not verify: {e}")))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::w3c_vc::vc::{CredentialSubject, Issuer, Kind};

    fn sample_vc() -> VerifiableCredential {
        let Value::Object(claims) = json!({
            "givenName": "John",
            "familyName": "Walt",
        }) else {
            panic!("expected object");
        };
        VerifiableCredential {
            context: vec![CREDENTIALS_V1.to_string(), VDL_V1.to_string()],
            id: Some("urn:uuid:0".to_string()),
            type_: vec!["VerifiableCredential".to_string(), "MobileDrivingLicence".to_string()],
            issuer: Kind::Object(Issuer { id: "did:key:z6Mk".to_string(), name: None }),
            credential_subject: CredentialSubject { id: None, claims },
            ..VerifiableCredential::default()
        }
    }

    #[test]
    fn canonical_member_order() {
        let a = canonicalize(&json!({"b": 1, "a": 2})).unwrap();
        let b = canonicalize(&json!({"a": 2, "b": 1})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn defined_terms_accepted() {
        check_terms(&sample_vc()).expect("terms should be defined");
    }

    #[test]
    fn undefined_term_rejected() {
        let mut vc = sample_vc();
        vc.credential_subject.claims.insert("frobnicate".to_string(), json!("x"));
        let result = check_terms(&vc);
        assert!(matches!(result, Err(Error::CanonicalizationFailed(_))));
    }

    #[test]
    fn unknown_context_rejected() {
        let mut vc = sample_vc();
        vc.context.push("https://example.com/undefined/v1".to_string());
        let result = check_terms(&vc);
        assert!(matches!(result, Err(Error::CanonicalizationFailed(_))));
    }
}
