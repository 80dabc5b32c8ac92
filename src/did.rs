//! # Decentralized Identifiers
//!
//! Identifier lifecycle (create, find, seed) and resolution. DID methods
//! plug in through the [`DidOperator`] registry rather than by subclassing a
//! base provider, so adding a method never touches the manager.

pub mod document;
mod key;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context as _;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

pub use self::key::DidKey;
use self::document::{Curve, Document, Kty, PublicKey, PublicKeyJwk, Service};
use crate::error::server;
use crate::key::{KeyManager, KeyType};
use crate::provider::{DidStore, KeyStore};
use crate::{Error, Result};

/// A managed decentralized identifier.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Identifier {
    /// The DID.
    pub did: String,

    /// Optional human-readable alias, unique per method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// The DID method used to create the identifier, e.g. "key".
    pub provider: String,

    /// The managed key controlling the identifier.
    pub controller_key_id: String,

    /// Service endpoints published for the identifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

/// A DID method implementation.
pub trait DidOperator: Send + Sync {
    /// The method name, e.g. "key" for did:key.
    fn method(&self) -> &'static str;

    /// Create a DID for the given public key.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKeyType` when the method cannot express the key.
    fn create(&self, public_key: &[u8], key_type: KeyType) -> Result<String>;

    /// Resolve a DID to its document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the DID cannot be resolved.
    fn resolve(&self, did: &str) -> Result<Document>;
}

/// Resolves DIDs through registered method operators.
#[derive(Clone)]
pub struct Resolver {
    operators: Arc<HashMap<&'static str, Arc<dyn DidOperator>>>,
}

impl Resolver {
    /// Create a resolver over the given method operators.
    #[must_use]
    pub fn new(operators: Vec<Arc<dyn DidOperator>>) -> Self {
        Self {
            operators: Arc::new(operators.into_iter().map(|op| (op.method(), op)).collect()),
        }
    }

    /// The registered method names.
    #[must_use]
    pub fn methods(&self) -> Vec<&'static str> {
        self.operators.keys().copied().collect()
    }

    pub(crate) fn operator(&self, method: &str) -> Option<Arc<dyn DidOperator>> {
        self.operators.get(method).cloned()
    }

    /// Resolve a DID to its document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a malformed DID and `NotFound` when no
    /// operator is registered for the method or resolution fails.
    pub fn resolve(&self, did: &str) -> Result<Document> {
        let mut parts = did.split(':');
        if parts.next() != Some("did") {
            return Err(Error::InvalidRequest(format!("{did} is not a DID")));
        }
        let Some(method) = parts.next() else {
            return Err(Error::InvalidRequest(format!("{did} has no method")));
        };
        let Some(operator) = self.operators.get(method) else {
            return Err(Error::NotFound(format!("no resolver registered for did:{method}")));
        };
        operator.resolve(did)
    }
}

/// Dereference a DID URL to the public key JWK of the identified
/// verification method. A fragment must name a method the resolved document
/// actually carries; without a fragment the first method is used.
///
/// # Errors
///
/// Returns `NotFound` when resolution fails or the document carries no
/// matching verification method.
pub fn did_jwk(did_url: &str, resolver: &Resolver) -> Result<PublicKeyJwk> {
    let did = did_url.split('#').next().unwrap_or(did_url);
    let document = resolver.resolve(did)?;

    let method = if did_url.contains('#') {
        document.verification_method.iter().find(|m| m.id == did_url)
    } else {
        document.verification_method.first()
    };
    let Some(method) = method else {
        return Err(Error::NotFound(format!(
            "{did_url} does not identify a verification method"
        )));
    };

    match &method.public_key {
        PublicKey::PublicKeyJwk(jwk) => Ok(jwk.clone()),
        PublicKey::PublicKeyMultibase(multikey) => {
            let (_, key_bytes) = multibase::decode(multikey)
                .map_err(|e| Error::NotFound(format!("invalid multikey: {e}")))?;
            if key_bytes.len() != 34 {
                return Err(Error::NotFound("invalid multikey length".to_string()));
            }
            Ok(PublicKeyJwk {
                kty: Kty::Okp,
                crv: Curve::Ed25519,
                x: Base64UrlUnpadded::encode_string(&key_bytes[2..]),
                y: None,
            })
        }
    }
}

/// Creates and looks up managed identifiers.
#[derive(Clone)]
pub struct DidManager<P> {
    provider: P,
    keys: KeyManager<P>,
    resolver: Resolver,
}

impl<P: DidStore + KeyStore + Clone + Send + Sync> DidManager<P> {
    /// Create a manager over the given store, key manager, and resolver.
    pub fn new(provider: P, keys: KeyManager<P>, resolver: Resolver) -> Self {
        Self { provider, keys, resolver }
    }

    /// Create a new identifier, generating its controlling key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unregistered method, `UnsupportedKeyType`
    /// when the method cannot express the key, and `Conflict` when the alias
    /// is already in use for the method.
    pub async fn create(
        &self, method: &str, key_type: KeyType, alias: Option<&str>,
    ) -> Result<Identifier> {
        let Some(operator) = self.resolver.operator(method) else {
            return Err(Error::NotFound(format!("no operator registered for did:{method}")));
        };

        let key = self.keys.create(key_type).await?;
        let public_key =
            Base64UrlUnpadded::decode_vec(&key.public_key).context("decoding public key")?;
        let did = operator.create(&public_key, key_type)?;

        let identifier = Identifier {
            did,
            alias: alias.map(ToString::to_string),
            provider: method.to_string(),
            controller_key_id: key.kid,
            services: vec![],
        };

        let inserted =
            DidStore::insert(&self.provider, &identifier).await.context("saving identifier")?;
        if !inserted {
            return Err(Error::Conflict(format!(
                "alias {} is already in use for did:{method}",
                alias.unwrap_or_default()
            )));
        }

        Ok(identifier)
    }

    /// Look up an identifier by alias and method.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no identifier matches, signalling
    /// create-on-first-use to callers.
    pub async fn find_by_alias(&self, alias: &str, method: &str) -> Result<Identifier> {
        let found = DidStore::find_by_alias(&self.provider, alias, method)
            .await
            .context("querying identifiers")?;
        found.ok_or_else(|| Error::NotFound(format!("no identifier with alias {alias}")))
    }

    /// List managed identifiers.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store is unavailable.
    pub async fn list(&self) -> Result<Vec<Identifier>> {
        DidStore::list(&self.provider).await.context("listing identifiers").map_err(Into::into)
    }

    /// The DID methods available to `create`.
    #[must_use]
    pub fn providers(&self) -> Vec<&'static str> {
        self.resolver.methods()
    }

    /// Find-or-create an identifier by alias. Idempotent: concurrent seeds of
    /// the same alias converge on a single identifier. Returns the identifier
    /// and whether it already existed.
    ///
    /// # Errors
    ///
    /// Returns the errors of `create`, except `Conflict`, which is resolved
    /// by re-reading the winner.
    pub async fn seed(
        &self, alias: &str, method: &str, key_type: KeyType,
    ) -> Result<(Identifier, bool)> {
        if let Some(existing) = DidStore::find_by_alias(&self.provider, alias, method)
            .await
            .context("querying identifiers")?
        {
            return Ok((existing, true));
        }

        match self.create(method, key_type, Some(alias)).await {
            Ok(identifier) => Ok((identifier, false)),
            Err(Error::Conflict(_)) => {
                // lost the race, the winner's identifier is authoritative
                let Some(existing) = DidStore::find_by_alias(&self.provider, alias, method)
                    .await
                    .context("querying identifiers")?
                else {
                    return Err(server!("identifier missing after alias conflict"));
                };
                Ok((existing, true))
            }
            Err(e) => Err(e),
        }
    }
}
