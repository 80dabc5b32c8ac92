//! # Errors
//!
//! Error types for credential issuance, verification, and the identity
//! registry. Errors serialize to OAuth-style
//! `{"error": ..., "error_description": ...}` objects so they can be returned
//! to wallets unchanged.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes returned by the engine's endpoints and managers.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, repeats a parameter, or is otherwise malformed.
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidRequest(String),

    /// The authorization grant type is not supported.
    #[error(r#"{{"error": "unsupported_grant_type", "error_description": "{0}"}}"#)]
    UnsupportedGrantType(String),

    /// The provided pre-authorized code is invalid, expired, or has already
    /// been redeemed.
    #[error(r#"{{"error": "invalid_grant", "error_description": "{0}"}}"#)]
    InvalidGrant(String),

    /// The request carries no usable credentials, e.g. a missing or malformed
    /// bearer token.
    #[error(r#"{{"error": "unauthorized", "error_description": "{0}"}}"#)]
    Unauthorized(String),

    /// The presented access token is unknown, expired, or already used.
    #[error(r#"{{"error": "access_denied", "error_description": "{0}"}}"#)]
    AccessDenied(String),

    /// A referenced entity (key, identifier, issuer metadata) does not exist.
    #[error(r#"{{"error": "not_found", "error_description": "{0}"}}"#)]
    NotFound(String),

    /// An identifier alias is already in use for the same method.
    #[error(r#"{{"error": "conflict", "error_description": "{0}"}}"#)]
    Conflict(String),

    /// The requested credential proof format is not supported.
    #[error(r#"{{"error": "unsupported_proof_format", "error_description": "{0}"}}"#)]
    UnsupportedProofFormat(String),

    /// The key type is not supported by the DID method or proof suite in use.
    #[error(r#"{{"error": "unsupported_key_type", "error_description": "{0}"}}"#)]
    UnsupportedKeyType(String),

    /// The credential could not be canonicalized, most often because a term
    /// is not defined by any supplied `@context` entry.
    #[error(r#"{{"error": "canonicalization_failed", "error_description": "{0}"}}"#)]
    CanonicalizationFailed(String),

    /// The signing backend failed or timed out.
    #[error(r#"{{"error": "signing_failed", "error_description": "{0}"}}"#)]
    SigningFailed(String),

    /// A proof signature did not verify.
    #[error(r#"{{"error": "signature_invalid", "error_description": "{0}"}}"#)]
    SignatureInvalid(String),

    /// The server encountered an unexpected condition that prevented it from
    /// fulfilling the request.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),
}

impl Error {
    /// The HTTP status code associated with the error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::UnsupportedGrantType(_)
            | Self::InvalidGrant(_)
            | Self::UnsupportedProofFormat(_)
            | Self::UnsupportedKeyType(_)
            | Self::CanonicalizationFailed(_)
            | Self::SignatureInvalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::SigningFailed(_) | Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Self>() {
            Some(Self::InvalidRequest(e)) => Self::InvalidRequest(format!("{err}: {e}")),
            Some(Self::UnsupportedGrantType(e)) => {
                Self::UnsupportedGrantType(format!("{err}: {e}"))
            }
            Some(Self::InvalidGrant(e)) => Self::InvalidGrant(format!("{err}: {e}")),
            Some(Self::Unauthorized(e)) => Self::Unauthorized(format!("{err}: {e}")),
            Some(Self::AccessDenied(e)) => Self::AccessDenied(format!("{err}: {e}")),
            Some(Self::NotFound(e)) => Self::NotFound(format!("{err}: {e}")),
            Some(Self::Conflict(e)) => Self::Conflict(format!("{err}: {e}")),
            Some(Self::UnsupportedProofFormat(e)) => {
                Self::UnsupportedProofFormat(format!("{err}: {e}"))
            }
            Some(Self::UnsupportedKeyType(e)) => Self::UnsupportedKeyType(format!("{err}: {e}")),
            Some(Self::CanonicalizationFailed(e)) => {
                Self::CanonicalizationFailed(format!("{err}: {e}"))
            }
            Some(Self::SigningFailed(e)) => Self::SigningFailed(format!("{err}: {e}")),
            Some(Self::SignatureInvalid(e)) => Self::SignatureInvalid(format!("{err}: {e}")),
            Some(Self::ServerError(e)) => Self::ServerError(format!("{err}: {e}")),
            None => {
                let source = err.source().map_or_else(String::new, ToString::to_string);
                Self::ServerError(format!("{err}: {source}"))
            }
        }
    }
}

/// Construct an `Error::InvalidRequest` error from a string or existing error
/// value.
macro_rules! invalid {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidRequest(format!($err))
    };
}
pub(crate) use invalid;

/// Construct an `Error::ServerError` error from a string or existing error
/// value.
macro_rules! server {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::ServerError(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::ServerError(format!($err))
    };
}
pub(crate) use server;

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    // Test that error details serialize to an OAuth error object.
    #[test]
    fn json() {
        let err = invalid!("bad request");
        let ser = serde_json::to_value(&err).unwrap();
        assert_eq!(ser, json!({"error":"invalid_request", "error_description": "bad request"}));
    }

    // Test that errors carry the expected HTTP status codes.
    #[test]
    fn status() {
        assert_eq!(Error::Unauthorized(String::new()).status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(Error::AccessDenied(String::new()).status(), http::StatusCode::FORBIDDEN);
        assert_eq!(Error::Conflict(String::new()).status(), http::StatusCode::CONFLICT);
        assert_eq!(
            Error::SigningFailed(String::new()).status(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
