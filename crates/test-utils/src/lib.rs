//! In-memory providers for integration tests.
//!
//! Stores are per-instance rather than process-global so tests stay
//! isolated from one another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use veridian::did::Identifier;
use veridian::key::KeyRecord;
use veridian::oid4vci::types::{CredentialConfiguration, IssuerMetadata};
use veridian::provider::{DidStore, KeyStore, Metadata, StateStore, Subject};
use veridian::state::State;

/// KMS master secret used by tests.
pub const MASTER_SECRET: &str = "0jS5lEnJt4-O7p1PJebmSBpUp2qnTsrEWqBEfzyxdE0";

/// The credential issuer under test.
pub const ISSUER: &str = "http://localhost:8080";

const MDL: &str = "MobileDrivingLicence";

/// An in-memory issuer provider, seeded with metadata and a default subject
/// dataset.
#[derive(Clone)]
pub struct Issuer {
    keys: Arc<Mutex<HashMap<String, KeyRecord>>>,
    dids: Arc<Mutex<Vec<Identifier>>>,
    state: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    metadata: IssuerMetadata,
    datasets: HashMap<String, Map<String, Value>>,
}

impl Issuer {
    /// Create a provider seeded for the given issuer URL.
    #[must_use]
    pub fn new(issuer: &str) -> Self {
        let metadata = IssuerMetadata {
            credential_issuer: issuer.to_string(),
            credential_endpoint: format!("{issuer}/credential"),
            token_endpoint: format!("{issuer}/token"),
            credentials_supported: vec![
                CredentialConfiguration {
                    id: MDL.to_string(),
                    format: "ldp_vc".to_string(),
                    types: vec!["VerifiableCredential".to_string(), MDL.to_string()],
                    cryptographic_binding_methods_supported: vec!["did".to_string()],
                    cryptographic_suites_supported: vec!["Ed25519Signature2018".to_string()],
                },
                CredentialConfiguration {
                    id: format!("{MDL}-JWT"),
                    format: "jwt_vc_json".to_string(),
                    types: vec!["VerifiableCredential".to_string(), MDL.to_string()],
                    cryptographic_binding_methods_supported: vec!["did".to_string()],
                    cryptographic_suites_supported: vec!["Ed25519Signature2018".to_string()],
                },
            ],
        };

        let Value::Object(mdl_dataset) = json!({
            "givenName": "John",
            "familyName": "Walt",
            "birthDate": "2000-01-01",
            "drivingClass": "Motocycle, Private Car",
            "expiryDate": "2030-12-31",
        }) else {
            unreachable!("dataset is an object");
        };
        let datasets = HashMap::from([(MDL.to_string(), mdl_dataset)]);

        Self {
            keys: Arc::new(Mutex::new(HashMap::new())),
            dids: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(HashMap::new())),
            metadata,
            datasets,
        }
    }
}

impl Metadata for Issuer {
    async fn issuer(&self, credential_issuer: &str) -> Result<IssuerMetadata> {
        if credential_issuer != self.metadata.credential_issuer {
            return Err(anyhow!("could not find issuer"));
        }
        Ok(self.metadata.clone())
    }
}

impl Subject for Issuer {
    async fn dataset(&self, credential_type: &str) -> Result<Map<String, Value>> {
        Ok(self.datasets.get(credential_type).cloned().unwrap_or_default())
    }
}

impl KeyStore for Issuer {
    async fn put(&self, record: &KeyRecord) -> Result<()> {
        let mut keys = self.keys.lock().map_err(|_| anyhow!("lock poisoned"))?;
        keys.insert(record.kid.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, kid: &str) -> Result<Option<KeyRecord>> {
        let keys = self.keys.lock().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(keys.get(kid).cloned())
    }

    async fn list(&self) -> Result<Vec<KeyRecord>> {
        let keys = self.keys.lock().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(keys.values().cloned().collect())
    }
}

impl DidStore for Issuer {
    async fn insert(&self, identifier: &Identifier) -> Result<bool> {
        let mut dids = self.dids.lock().map_err(|_| anyhow!("lock poisoned"))?;
        if let Some(alias) = &identifier.alias {
            let conflict = dids
                .iter()
                .any(|d| d.alias.as_deref() == Some(alias) && d.provider == identifier.provider);
            if conflict {
                return Ok(false);
            }
        }
        dids.push(identifier.clone());
        Ok(true)
    }

    async fn get(&self, did: &str) -> Result<Option<Identifier>> {
        let dids = self.dids.lock().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(dids.iter().find(|d| d.did == did).cloned())
    }

    async fn find_by_alias(&self, alias: &str, method: &str) -> Result<Option<Identifier>> {
        let dids = self.dids.lock().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(dids
            .iter()
            .find(|d| d.alias.as_deref() == Some(alias) && d.provider == method)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Identifier>> {
        let dids = self.dids.lock().map_err(|_| anyhow!("lock poisoned"))?;
        Ok(dids.clone())
    }
}

impl StateStore for Issuer {
    async fn put<T: Serialize + Send + Sync>(&self, key: &str, state: &State<T>) -> Result<()> {
        let data = serde_json::to_vec(state)?;
        let mut store = self.state.lock().map_err(|_| anyhow!("lock poisoned"))?;
        store.insert(key.to_string(), data);
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<State<T>>> {
        let store = self.state.lock().map_err(|_| anyhow!("lock poisoned"))?;
        store.get(key).map(|data| serde_json::from_slice(data).map_err(Into::into)).transpose()
    }

    async fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<State<T>>> {
        let mut store = self.state.lock().map_err(|_| anyhow!("lock poisoned"))?;
        store.remove(key).map(|data| serde_json::from_slice(&data).map_err(Into::into)).transpose()
    }

    async fn purge(&self, key: &str) -> Result<()> {
        let mut store = self.state.lock().map_err(|_| anyhow!("lock poisoned"))?;
        store.remove(key);
        Ok(())
    }
}
