//! # State
//!
//! State is used to persist request information between steps in the
//! issuance flow. Expiry is checked lazily, at the point state is used.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// State is used to persist request information between issuance steps in
/// the credential issuance process.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct State<T> {
    /// Body holds data relevant to the current state.
    pub body: T,

    /// Time state should expire.
    pub expires_at: DateTime<Utc>,
}

impl<T> State<T> {
    /// Determines whether state has expired or not.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.signed_duration_since(Utc::now()).num_seconds() < 0
    }
}

/// Pre-authorization state from the `create_offer` endpoint, keyed by the
/// pre-authorized code.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Offered {
    /// Identifies the (previously authenticated) holder, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    /// Credential types the holder is authorized to request.
    pub credential_types: Vec<String>,
}

/// Access token state from the `token` endpoint, keyed by the access token.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Issued {
    /// The access token.
    pub access_token: String,

    /// Nonce to be bound into credential requests.
    pub c_nonce: String,

    /// The pre-authorized code the token was minted from.
    pub grant_code: String,

    /// Identifies the (previously authenticated) holder, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,

    /// Credential types the token is good for.
    pub credential_types: Vec<String>,

    /// Set once the token has been redeemed for a credential.
    pub consumed: bool,
}

/// Expire enum.
pub enum Expire {
    /// Pre-authorized grant expiration.
    Grant,
    /// Access token expiration.
    Access,
    /// Nonce expiration.
    CNonce,
}

impl Expire {
    /// Duration of the state.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        match self {
            Self::Grant | Self::CNonce => TimeDelta::try_minutes(10).unwrap_or_default(),
            Self::Access => TimeDelta::try_minutes(15).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expiry() {
        let live = State {
            body: Offered::default(),
            expires_at: Utc::now() + Expire::Grant.duration(),
        };
        assert!(!live.is_expired());

        let dead = State {
            body: Offered::default(),
            expires_at: Utc::now() - TimeDelta::try_minutes(1).unwrap_or_default(),
        };
        assert!(dead.is_expired());
    }
}
