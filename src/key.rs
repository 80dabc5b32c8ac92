//! # Keys
//!
//! Managed signing keys. Key records are durable before they are returned,
//! and private material only exists unwrapped inside the KMS.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::server;
use crate::kms::Kms;
use crate::provider::KeyStore;
use crate::{Error, Result};

/// Signing operations are bounded so a wedged backend cannot hold a request
/// open indefinitely.
const SIGNING_TIMEOUT: Duration = Duration::from_secs(5);

/// Supported key types.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum KeyType {
    /// Ed25519 EdDSA signing key.
    #[default]
    Ed25519,
    /// secp256k1 ECDSA signing key.
    Secp256k1,
}

/// A managed signing key.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeyRecord {
    /// Key identifier, unique within the key store.
    pub kid: String,

    /// The type of key.
    pub key_type: KeyType,

    /// Base64url-encoded public key bytes.
    pub public_key: String,

    /// The wrapped private key blob. Opaque outside the KMS that sealed it.
    pub wrapped_private_key: String,

    /// The KMS holding the private key.
    pub kms: String,
}

/// Creates and uses signing keys through a KMS.
#[derive(Clone)]
pub struct KeyManager<P> {
    provider: P,
    kms: Arc<dyn Kms>,
}

impl<P: KeyStore + Clone> KeyManager<P> {
    /// Create a key manager over the given store and KMS.
    pub fn new(provider: P, kms: Arc<dyn Kms>) -> Self {
        Self { provider, kms }
    }

    /// Generate a new key pair, persisting the record before returning it.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` when the KMS backend is unavailable, or a
    /// storage error if the record cannot be persisted.
    pub async fn create(&self, key_type: KeyType) -> Result<KeyRecord> {
        let generated =
            self.kms.generate(key_type).map_err(|e| server!("key backend unavailable: {e}"))?;

        let record = KeyRecord {
            kid: Uuid::new_v4().to_string(),
            key_type,
            public_key: generated.public_key,
            wrapped_private_key: generated.wrapped_private_key,
            kms: self.kms.name().to_string(),
        };
        KeyStore::put(&self.provider, &record).await.context("saving key record")?;

        Ok(record)
    }

    /// Sign the payload with the key identified by `kid`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown `kid` and `SigningFailed` when the
    /// backend errors or exceeds the signing timeout.
    pub async fn sign(&self, kid: &str, payload: &[u8]) -> Result<Vec<u8>> {
        let Some(record) = KeyStore::get(&self.provider, kid).await.context("fetching key")?
        else {
            return Err(Error::NotFound(format!("key {kid} not found")));
        };

        let kms = Arc::clone(&self.kms);
        let payload = payload.to_vec();
        let signing = tokio::task::spawn_blocking(move || kms.sign(&record, &payload));

        match tokio::time::timeout(SIGNING_TIMEOUT, signing).await {
            Ok(Ok(signature)) => signature.map_err(|e| Error::SigningFailed(e.to_string())),
            Ok(Err(e)) => Err(Error::SigningFailed(e.to_string())),
            Err(_) => Err(Error::SigningFailed("signing operation timed out".to_string())),
        }
    }

    /// List managed keys. Wrapped private material in the records is opaque.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the key store is unavailable.
    pub async fn list(&self) -> Result<Vec<KeyRecord>> {
        KeyStore::list(&self.provider).await.context("listing keys").map_err(Into::into)
    }
}
