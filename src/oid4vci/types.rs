//! Wire types for the pre-authorized issuance flow and verification entry
//! point.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::w3c_vc::vc::{Kind, VerifiableCredential};

/// Grant type URN for the pre-authorized code flow.
pub const PRE_AUTHORIZED_CODE: &str = "urn:ietf:params:oauth:grant-type:pre-authorized_code";

/// Request to create a credential offer.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CreateOfferRequest {
    /// Credential types on offer. Defaults to every type the issuer's
    /// metadata supports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credential_types: Vec<String>,

    /// Identifies the previously authenticated holder, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

/// A credential offer, returned to the wallet by value.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialOffer {
    /// The credential issuer URL.
    pub credential_issuer: String,

    /// Credential types the offer covers.
    pub credentials: Vec<String>,

    /// Grants the wallet may redeem the offer with.
    pub grants: Grants,
}

/// Grants carried on a credential offer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Grants {
    /// The pre-authorized code grant.
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    pub pre_authorized_code: PreAuthorizedCodeGrant,
}

/// The pre-authorized code grant.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PreAuthorizedCodeGrant {
    /// The single-redemption code to present at the token endpoint.
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: String,

    /// Whether the holder must also present a user PIN. Always `false`.
    pub user_pin_required: bool,
}

/// Token request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TokenRequest {
    /// The grant type. Must be the pre-authorized code URN.
    pub grant_type: String,

    /// The pre-authorized code being redeemed.
    #[serde(rename = "pre-authorized_code", skip_serializing_if = "Option::is_none")]
    pub pre_authorized_code: Option<String>,
}

/// Token response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// The minted access token.
    pub access_token: String,

    /// Token type. Always "bearer".
    pub token_type: String,

    /// Seconds until the access token expires.
    pub expires_in: i64,

    /// Nonce to bind into the credential request.
    pub c_nonce: String,

    /// Seconds until the nonce expires.
    pub c_nonce_expires_in: i64,
}

/// Credential request.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CredentialRequest {
    /// Requested proof format. Defaults to `ldp_vc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Requested credential types. Defaults to the types the token grants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// Caller-supplied subject claims, merged over the issuer's defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<Map<String, Value>>,
}

/// Credential response.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CredentialResponse {
    /// The proof format the credential was issued in.
    pub format: String,

    /// The issued credential: an object for `ldp_vc`, a compact JWS string
    /// for `jwt_vc_json`.
    pub credential: Kind<VerifiableCredential>,
}

/// Issuer metadata request (`.well-known/openid-credential-issuer`).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MetadataRequest;

/// Credential issuer metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerMetadata {
    /// The credential issuer URL.
    pub credential_issuer: String,

    /// The credential endpoint URL.
    pub credential_endpoint: String,

    /// The token endpoint URL.
    pub token_endpoint: String,

    /// Credential configurations the issuer supports.
    pub credentials_supported: Vec<CredentialConfiguration>,
}

/// A supported credential configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialConfiguration {
    /// Identifies the configuration within the issuer's metadata.
    pub id: String,

    /// The proof format.
    pub format: String,

    /// The credential types issued in this configuration.
    pub types: Vec<String>,

    /// How the issued credential may be bound to the holder.
    pub cryptographic_binding_methods_supported: Vec<String>,

    /// Signature suites the issuer can sign with.
    pub cryptographic_suites_supported: Vec<String>,
}

/// Verification request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VerifyRequest {
    /// The credential to verify, in either proof format.
    pub credential: Kind<VerifiableCredential>,
}

/// Verification response.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct VerifyResponse {
    /// Whether the credential verified.
    pub verified: bool,

    /// Why verification failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
