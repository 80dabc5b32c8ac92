//! # JOSE
//!
//! Compact JWS encoding and verification for credentials secured with an
//! enveloping VC-JWT proof.

use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use ed25519_dalek::Verifier as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::vc::VerifiableCredential;
use crate::did::document::{Curve, PublicKeyJwk};

/// Signing algorithms used by the credential proof suites.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// Ed25519 EdDSA.
    #[default]
    EdDSA,

    /// secp256k1 ECDSA.
    ES256K,
}

/// JWS protected header.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Header {
    /// The signing algorithm.
    pub alg: Algorithm,

    /// Token type, e.g. "JWT".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// The signing key identifier, a DID URL.
    pub kid: String,
}

/// Claims for a credential secured as a VC-JWT.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VcClaims {
    /// The issuer DID.
    pub iss: String,

    /// The credential subject identifier.
    pub sub: String,

    /// The credential identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Not valid before the credential's issuance date.
    #[serde(with = "ts_seconds")]
    pub nbf: DateTime<Utc>,

    /// Issued at.
    #[serde(with = "ts_seconds")]
    pub iat: DateTime<Utc>,

    /// The enveloped credential.
    pub vc: VerifiableCredential,
}

impl From<VerifiableCredential> for VcClaims {
    fn from(vc: VerifiableCredential) -> Self {
        Self {
            iss: vc.issuer_id().to_string(),
            sub: vc.credential_subject.id.clone().unwrap_or_default(),
            jti: vc.id.clone(),
            nbf: vc.issuance_date,
            iat: vc.issuance_date,
            vc,
        }
    }
}

/// Build the signing input (`header.claims`) for a compact JWS.
///
/// # Errors
///
/// Returns an error if the header or claims cannot be serialized.
pub fn signing_input<T: Serialize>(claims: &T, header: &Header) -> Result<String> {
    let header = Base64UrlUnpadded::encode_string(&serde_json::to_vec(header)?);
    let claims = Base64UrlUnpadded::encode_string(&serde_json::to_vec(claims)?);
    Ok(format!("{header}.{claims}"))
}

/// Assemble a compact JWS from its signing input and signature.
#[must_use]
pub fn encode(signing_input: &str, signature: &[u8]) -> String {
    format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(signature))
}

/// A decoded (not yet verified) compact JWS.
#[derive(Clone, Debug)]
pub struct Jws<T> {
    /// The protected header.
    pub header: Header,

    /// The deserialized claims.
    pub claims: T,

    /// The raw signature bytes.
    pub signature: Vec<u8>,

    /// The signed message, `header.claims`.
    pub message: String,
}

/// Decode a compact JWS without verifying its signature.
///
/// # Errors
///
/// Returns an error if the token is not a three-part compact JWS or a part
/// cannot be decoded.
pub fn decode<T: DeserializeOwned>(token: &str) -> Result<Jws<T>> {
    let parts = token.split('.').collect::<Vec<&str>>();
    if parts.len() != 3 {
        bail!("invalid compact JWS format");
    }

    let decoded = Base64UrlUnpadded::decode_vec(parts[0])
        .map_err(|e| anyhow!("issue decoding header: {e}"))?;
    let header: Header =
        serde_json::from_slice(&decoded).map_err(|e| anyhow!("issue deserializing header: {e}"))?;

    let decoded = Base64UrlUnpadded::decode_vec(parts[1])
        .map_err(|e| anyhow!("issue decoding claims: {e}"))?;
    let claims =
        serde_json::from_slice(&decoded).map_err(|e| anyhow!("issue deserializing claims: {e}"))?;

    let signature = Base64UrlUnpadded::decode_vec(parts[2])
        .map_err(|e| anyhow!("issue decoding signature: {e}"))?;

    Ok(Jws {
        header,
        claims,
        signature,
        message: format!("{}.{}", parts[0], parts[1]),
    })
}

/// Verify a signature over the message using the JWK.
///
/// # Errors
///
/// Returns an error if the signature is invalid or the JWK is malformed.
pub fn verify(jwk: &PublicKeyJwk, message: &[u8], signature: &[u8]) -> Result<()> {
    match jwk.crv {
        Curve::Ed25519 => verify_eddsa(jwk, message, signature),
        Curve::Secp256k1 => verify_es256k(jwk, message, signature),
    }
}

// Verify an EdDSA signature.
fn verify_eddsa(jwk: &PublicKeyJwk, message: &[u8], signature: &[u8]) -> Result<()> {
    let x_bytes = Base64UrlUnpadded::decode_vec(&jwk.x)
        .map_err(|e| anyhow!("unable to base64 decode JWK 'x': {e}"))?;
    let bytes = &x_bytes.try_into().map_err(|_| anyhow!("invalid public key length"))?;
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(bytes)
        .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
    let signature = ed25519_dalek::Signature::from_slice(signature)
        .map_err(|e| anyhow!("unable to build signature: {e}"))?;

    verifying_key.verify(message, &signature).map_err(|e| anyhow!("unable to verify: {e}"))
}

// Verify an ES256K signature.
fn verify_es256k(jwk: &PublicKeyJwk, message: &[u8], signature: &[u8]) -> Result<()> {
    let y = jwk.y.as_ref().ok_or_else(|| anyhow!("JWK 'y' is missing"))?;
    let mut sec1 = vec![0x04]; // uncompressed format
    sec1.append(&mut Base64UrlUnpadded::decode_vec(&jwk.x)?);
    sec1.append(&mut Base64UrlUnpadded::decode_vec(y)?);

    let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)?;
    let signature = k256::ecdsa::Signature::from_slice(signature)?;
    let normalised = signature.normalize_s().unwrap_or(signature);

    verifying_key.verify(message, &normalised).map_err(|e| anyhow!("unable to verify: {e}"))
}

#[cfg(test)]
mod test {
    use ed25519_dalek::Signer as _;
    use serde_json::json;

    use super::*;
    use crate::did::document::Kty;

    #[test]
    fn jws_roundtrip() {
        let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);

        let header = Header {
            alg: Algorithm::EdDSA,
            typ: Some("JWT".to_string()),
            kid: "did:key:z6Mk#0".to_string(),
        };
        let claims = json!({"iss": "did:key:z6Mk", "sub": "holder"});

        let input = signing_input(&claims, &header).expect("should encode");
        let signature = signing_key.sign(input.as_bytes());
        let token = encode(&input, &signature.to_bytes());

        let jws: Jws<serde_json::Value> = decode(&token).expect("should decode");
        assert_eq!(jws.header, header);
        assert_eq!(jws.claims, claims);

        let jwk = PublicKeyJwk {
            kty: Kty::Okp,
            crv: Curve::Ed25519,
            x: Base64UrlUnpadded::encode_string(signing_key.verifying_key().as_bytes()),
            y: None,
        };
        verify(&jwk, jws.message.as_bytes(), &jws.signature).expect("should verify");
    }

    #[test]
    fn malformed_token() {
        assert!(decode::<serde_json::Value>("not-a-jws").is_err());
        assert!(decode::<serde_json::Value>("a.b").is_err());
    }
}
