//! Verifiable Credential data model.
//!
//! See [Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::integrity::Proof;

/// `Kind` allows a value to be either a plain string (such as a URI or a
/// compact JWS) or a full object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// A string value.
    String(String),

    /// An object value.
    Object(T),
}

impl<T> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T> Kind<T> {
    /// The string form, if the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    /// The object form, if the value is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&T> {
        match self {
            Self::String(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

/// The credential issuer, as referenced from a credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Issuer {
    /// The issuer DID.
    pub id: String,

    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The subject the credential's claims are about.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialSubject {
    /// The subject identifier, usually a DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The claims made about the subject.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// A W3C Verifiable Credential. A signed credential is immutable: issuance
/// returns a new value rather than mutating its input.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// JSON-LD contexts defining the credential's terms.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The credential identifier, e.g. a `urn:uuid:` URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential types. Always includes "VerifiableCredential".
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// The credential issuer.
    pub issuer: Kind<Issuer>,

    /// When the credential was issued.
    pub issuance_date: DateTime<Utc>,

    /// The subject and the claims made about it.
    pub credential_subject: CredentialSubject,

    /// The embedded proof, when secured with Data-Integrity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// The issuer DID, whichever form the issuer is expressed in.
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        match &self.issuer {
            Kind::String(s) => s,
            Kind::Object(issuer) => &issuer.id,
        }
    }
}
