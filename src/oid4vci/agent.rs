//! # Agent
//!
//! The agent wires the engine's services together over a single provider.
//! It is constructed once at startup with the storage provider and the KMS
//! master secret, then shared by reference across requests.

use std::sync::Arc;

use crate::did::{DidKey, DidManager, DidOperator, Resolver};
use crate::key::KeyManager;
use crate::kms::{Kms, LocalKms};
use crate::provider::Provider;
use crate::w3c_vc::{CredentialIssuer, CredentialVerifier};

/// Governs how many times an access token may be redeemed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Each access token is good for exactly one credential request.
    #[default]
    SingleUse,

    /// Access tokens may be reused until they expire.
    MultiUse,
}

/// Agent configuration.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Alias of the issuing identifier, created on first use.
    pub issuer_alias: String,

    /// DID method used for the issuing identifier.
    pub did_provider: String,

    /// Access token redemption policy.
    pub token_policy: TokenPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            issuer_alias: "issuer-prod".to_string(),
            did_provider: "key".to_string(),
            token_policy: TokenPolicy::SingleUse,
        }
    }
}

/// The issuance and verification service object.
#[derive(Clone)]
pub struct Agent<P: Provider> {
    pub(crate) provider: P,
    pub(crate) keys: KeyManager<P>,
    pub(crate) dids: DidManager<P>,
    pub(crate) resolver: Resolver,
    pub(crate) issuer: CredentialIssuer<P>,
    pub(crate) verifier: CredentialVerifier,
    pub(crate) config: AgentConfig,
}

impl<P: Provider> Agent<P> {
    /// Build an agent over the given provider, with a local KMS keyed by the
    /// master secret.
    #[must_use]
    pub fn new(provider: P, master_secret: &str) -> Self {
        Self::with_config(provider, master_secret, AgentConfig::default())
    }

    /// Build an agent with explicit configuration.
    #[must_use]
    pub fn with_config(provider: P, master_secret: &str, config: AgentConfig) -> Self {
        let kms: Arc<dyn Kms> = Arc::new(LocalKms::new(master_secret));
        let keys = KeyManager::new(provider.clone(), kms);
        let resolver = Resolver::new(vec![Arc::new(DidKey) as Arc<dyn DidOperator>]);
        let dids = DidManager::new(provider.clone(), keys.clone(), resolver.clone());
        let issuer = CredentialIssuer::new(keys.clone(), resolver.clone());
        let verifier = CredentialVerifier::new(resolver.clone());

        Self { provider, keys, dids, resolver, issuer, verifier, config }
    }

    /// The key manager.
    #[must_use]
    pub const fn keys(&self) -> &KeyManager<P> {
        &self.keys
    }

    /// The identifier manager.
    #[must_use]
    pub const fn dids(&self) -> &DidManager<P> {
        &self.dids
    }

    /// The DID resolver.
    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The credential verifier.
    #[must_use]
    pub const fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// The agent configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}
