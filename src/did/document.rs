//! DID document types returned by resolution.

use serde::{Deserialize, Serialize};

/// A resolved DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    /// The JSON-LD context of the document.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID the document describes.
    pub id: String,

    /// Cryptographic material usable to authenticate as the DID subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    /// Verification method references usable for authentication.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,

    /// Verification method references usable for assertion (issuing).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,

    /// Service endpoints associated with the DID.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,
}

/// A single verification method entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// The verification method identifier (DID URL).
    pub id: String,

    /// The verification method type, e.g. "Multikey".
    #[serde(rename = "type")]
    pub type_: String,

    /// The DID controlling the key.
    pub controller: String,

    /// The public key material.
    #[serde(flatten)]
    pub public_key: PublicKey,
}

/// Public key material in one of the formats a method may publish.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PublicKey {
    /// A multibase-encoded public key.
    PublicKeyMultibase(String),

    /// A JWK format public key.
    PublicKeyJwk(PublicKeyJwk),
}

/// A public key in JWK form.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type.
    pub kty: Kty,

    /// The curve the key is on.
    pub crv: Curve,

    /// Base64url-encoded x-coordinate (or Ed25519 public key bytes).
    pub x: String,

    /// Base64url-encoded y-coordinate, for EC keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// JWK key types.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Kty {
    /// Octet key pair (Ed25519).
    #[default]
    #[serde(rename = "OKP")]
    Okp,

    /// Elliptic curve key.
    #[serde(rename = "EC")]
    Ec,
}

/// JWK curves.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Curve {
    /// Ed25519 curve.
    #[default]
    Ed25519,

    /// secp256k1 curve.
    #[serde(rename = "secp256k1")]
    Secp256k1,
}

/// A DID document service endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// The service identifier.
    pub id: String,

    /// The service type.
    #[serde(rename = "type")]
    pub type_: String,

    /// The service endpoint URL.
    pub service_endpoint: String,
}
