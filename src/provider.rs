//! # Provider
//!
//! Narrow storage and metadata traits implemented by the host application.
//! The engine never talks to a persistence layer directly, only through
//! these traits.

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::did::Identifier;
use crate::key::KeyRecord;
use crate::oid4vci::types::IssuerMetadata;
use crate::state::State;

/// Issuer provider trait.
pub trait Provider:
    Metadata + Subject + KeyStore + DidStore + StateStore + Clone + Send + Sync
{
}

impl<T> Provider for T where
    T: Metadata + Subject + KeyStore + DidStore + StateStore + Clone + Send + Sync
{
}

/// The `Metadata` trait is used by implementers to provide credential issuer
/// metadata to the library.
pub trait Metadata: Send + Sync {
    /// Credential issuer metadata for the specified issuer.
    fn issuer(&self, credential_issuer: &str)
    -> impl Future<Output = Result<IssuerMetadata>> + Send;
}

/// The `Subject` trait specifies how the library expects default subject
/// (holder) claim data to be provided by implementers.
pub trait Subject: Send + Sync {
    /// Returns the default claims dataset for the given credential type.
    fn dataset(
        &self, credential_type: &str,
    ) -> impl Future<Output = Result<Map<String, Value>>> + Send;
}

/// `KeyStore` persists managed key records. Private key material in a record
/// is wrapped and opaque to the store.
pub trait KeyStore: Send + Sync {
    /// Persist a key record. The write must be durable before returning.
    fn put(&self, record: &KeyRecord) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve a key record by its `kid`.
    fn get(&self, kid: &str) -> impl Future<Output = Result<Option<KeyRecord>>> + Send;

    /// List all key records.
    fn list(&self) -> impl Future<Output = Result<Vec<KeyRecord>>> + Send;
}

/// `DidStore` persists managed identifiers.
pub trait DidStore: Send + Sync {
    /// Insert an identifier, returning `false` without writing when the alias
    /// is already in use for the same method. The uniqueness check and the
    /// write are a single atomic operation.
    fn insert(&self, identifier: &Identifier) -> impl Future<Output = Result<bool>> + Send;

    /// Retrieve an identifier by its DID.
    fn get(&self, did: &str) -> impl Future<Output = Result<Option<Identifier>>> + Send;

    /// Retrieve an identifier by alias and method.
    fn find_by_alias(
        &self, alias: &str, method: &str,
    ) -> impl Future<Output = Result<Option<Identifier>>> + Send;

    /// List all identifiers.
    fn list(&self) -> impl Future<Output = Result<Vec<Identifier>>> + Send;
}

/// `StateStore` is used to store and retrieve server state between requests.
pub trait StateStore: Send + Sync {
    /// Store state using the provided key.
    fn put<T: Serialize + Send + Sync>(
        &self, key: &str, state: &State<T>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Retrieve state using the provided key.
    fn get<T: DeserializeOwned>(
        &self, key: &str,
    ) -> impl Future<Output = Result<Option<State<T>>>> + Send;

    /// Retrieve and remove state in a single atomic operation. Used to
    /// enforce at-most-once redemption of codes and tokens.
    fn take<T: DeserializeOwned>(
        &self, key: &str,
    ) -> impl Future<Output = Result<Option<State<T>>>> + Send;

    /// Remove state using the key provided.
    fn purge(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
