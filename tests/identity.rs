//! Key and Identifier Management Tests

use test_utils::{ISSUER, Issuer, MASTER_SECRET};
use veridian::did::did_jwk;
use veridian::did::document::PublicKey;
use veridian::key::KeyType;
use veridian::{Agent, Error};

fn agent() -> Agent<Issuer> {
    Agent::new(Issuer::new(ISSUER), MASTER_SECRET)
}

// Should create a did:key identifier whose document resolves locally.
#[tokio::test]
async fn create_and_resolve() {
    let agent = agent();

    let identifier = agent
        .dids()
        .create("key", KeyType::Ed25519, Some("signing"))
        .await
        .expect("should create identifier");
    assert!(identifier.did.starts_with("did:key:z"));
    assert_eq!(identifier.provider, "key");
    assert_eq!(identifier.alias.as_deref(), Some("signing"));

    let document = agent.resolver().resolve(&identifier.did).expect("should resolve");
    assert_eq!(document.id, identifier.did);

    let method = document.verification_method.first().expect("should have verification method");
    assert_eq!(method.type_, "Multikey");
    assert_eq!(method.controller, identifier.did);
    assert!(matches!(method.public_key, PublicKey::PublicKeyMultibase(_)));
    assert_eq!(document.assertion_method, vec![method.id.clone()]);

    // the controlling key is in the store
    let keys = agent.keys().list().await.expect("should list keys");
    assert!(keys.iter().any(|k| k.kid == identifier.controller_key_id));
}

// Dereferencing a DID URL yields the key the identifier was created with,
// and a fragment naming no published method is rejected.
#[tokio::test]
async fn dereference_key() {
    let agent = agent();

    let identifier = agent
        .dids()
        .create("key", KeyType::Ed25519, None)
        .await
        .expect("should create identifier");

    let document = agent.resolver().resolve(&identifier.did).expect("should resolve");
    let method = document.verification_method.first().expect("should have verification method");

    let jwk = did_jwk(&method.id, agent.resolver()).expect("should dereference");
    assert!(!jwk.x.is_empty());
    assert!(jwk.y.is_none());

    let bogus = format!("{}#no-such-key", identifier.did);
    let result = did_jwk(&bogus, agent.resolver());
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// did:key cannot express a secp256k1 key.
#[tokio::test]
async fn secp256k1_rejected() {
    let agent = agent();

    let result = agent.dids().create("key", KeyType::Secp256k1, None).await;
    assert!(matches!(result, Err(Error::UnsupportedKeyType(_))));
}

// Should reject an unregistered DID method.
#[tokio::test]
async fn unknown_method() {
    let agent = agent();

    let result = agent.dids().create("web", KeyType::Ed25519, None).await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = agent.resolver().resolve("did:web:example.com");
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = agent.resolver().resolve("not-a-did");
    assert!(matches!(result, Err(Error::InvalidRequest(_))));
}

// An alias is unique per method: creating it twice conflicts.
#[tokio::test]
async fn alias_conflict() {
    let agent = agent();

    agent
        .dids()
        .create("key", KeyType::Ed25519, Some("issuer"))
        .await
        .expect("should create identifier");

    let result = agent.dids().create("key", KeyType::Ed25519, Some("issuer")).await;
    assert!(matches!(result, Err(Error::Conflict(_))));
}

// Seeding is idempotent: repeated seeds converge on one identifier.
#[tokio::test]
async fn seed_idempotent() {
    let agent = agent();

    let (first, existed) = agent
        .dids()
        .seed("issuer-prod", "key", KeyType::Ed25519)
        .await
        .expect("should seed identifier");
    assert!(!existed);

    let (second, existed) = agent
        .dids()
        .seed("issuer-prod", "key", KeyType::Ed25519)
        .await
        .expect("should seed identifier");
    assert!(existed);
    assert_eq!(first.did, second.did);

    let all = agent.dids().list().await.expect("should list identifiers");
    assert_eq!(all.len(), 1);
}

// Managed keys sign through the KMS boundary.
#[tokio::test]
async fn managed_signing() {
    let agent = agent();

    let key = agent.keys().create(KeyType::Ed25519).await.expect("should create key");
    let signature =
        agent.keys().sign(&key.kid, b"payload").await.expect("should sign");
    assert_eq!(signature.len(), 64);

    let result = agent.keys().sign("no-such-key", b"payload").await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// The available DID methods are discoverable.
#[tokio::test]
async fn providers() {
    let agent = agent();
    assert_eq!(agent.dids().providers(), vec!["key"]);
}
