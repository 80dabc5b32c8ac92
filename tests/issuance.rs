//! Issuance and Verification Tests
//!
//! Exercises both proof formats and the failure modes of the credential
//! endpoint.

use chrono::Utc;
use serde_json::{Map, Value, json};
use test_utils::{ISSUER, Issuer, MASTER_SECRET};
use veridian::did::Identifier;
use veridian::key::KeyType;
use veridian::oid4vci::types::{
    CreateOfferRequest, CredentialRequest, PRE_AUTHORIZED_CODE, TokenRequest, VerifyRequest,
};
use veridian::w3c_vc::vc::Issuer as IssuerRef;
use veridian::w3c_vc::{CredentialSubject, Kind, VerifiableCredential, integrity, jose};
use veridian::{Agent, AuthorizationHeader, Error, Request, handle};

fn agent() -> Agent<Issuer> {
    Agent::new(Issuer::new(ISSUER), MASTER_SECRET)
}

// Should issue a VC-JWT credential that verifies.
#[tokio::test]
async fn jwt_round_trip() {
    let agent = agent();
    let token = redeem(&agent).await;

    let request = Request {
        body: CredentialRequest {
            format: Some("jwt_vc_json".to_string()),
            ..CredentialRequest::default()
        },
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    let response = handle(ISSUER, request, &agent).await.expect("should issue credential");

    assert_eq!(response.format, "jwt_vc_json");
    let jwt = response.credential.as_str().expect("should be a compact JWS");
    assert_eq!(jwt.split('.').count(), 3);

    let request = VerifyRequest { credential: response.body.credential.clone() };
    let result = handle(ISSUER, request, &agent).await.expect("should verify");
    assert!(result.verified);
    assert!(result.error.is_none());
}

// A VC-JWT with a modified payload does not verify.
#[tokio::test]
async fn jwt_tamper() {
    let agent = agent();
    let token = redeem(&agent).await;

    let request = Request {
        body: CredentialRequest {
            format: Some("jwt_vc_json".to_string()),
            ..CredentialRequest::default()
        },
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    let response = handle(ISSUER, request, &agent).await.expect("should issue credential");
    let jwt = response.credential.as_str().expect("should be a compact JWS");

    let parts: Vec<&str> = jwt.split('.').collect();
    let payload = base64ct_decode(parts[1]);
    let tampered_payload = String::from_utf8(payload)
        .expect("payload should be JSON")
        .replace("John", "Jane");
    let tampered = format!("{}.{}.{}", parts[0], base64ct_encode(&tampered_payload), parts[2]);

    let request = VerifyRequest { credential: Kind::String(tampered) };
    let result = handle(ISSUER, request, &agent).await.expect("should verify");
    assert!(!result.verified);
    assert_eq!(result.error.as_deref(), Some("signature invalid"));
}

// A Data-Integrity credential with a modified claim does not verify.
#[tokio::test]
async fn integrity_tamper() {
    let agent = agent();
    let token = redeem(&agent).await;

    let request = Request {
        body: CredentialRequest::default(),
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    let response = handle(ISSUER, request, &agent).await.expect("should issue credential");

    let mut vc = response.credential.as_object().expect("should be a credential object").clone();
    vc.credential_subject.claims.insert("givenName".to_string(), json!("Jane"));

    let request = VerifyRequest { credential: Kind::Object(vc) };
    let result = handle(ISSUER, request, &agent).await.expect("should verify");
    assert!(!result.verified);
    assert_eq!(result.error.as_deref(), Some("signature invalid"));
}

// A credential claiming one issuer but signed by another identifier's key
// does not verify, even though the signature itself is valid.
#[tokio::test]
async fn forged_issuer_integrity() {
    let agent = agent();
    let (victim, attacker) = two_identifiers(&agent).await;

    let vc = forged_vc(&victim.did);
    let document = agent.resolver().resolve(&attacker.did).expect("should resolve");
    let method = document.assertion_method.first().cloned().expect("should have method");
    let proof = integrity::create(&vc, &method, &attacker.controller_key_id, agent.keys())
        .await
        .expect("should sign");
    let forged = VerifiableCredential { proof: Some(proof), ..vc };

    let request = VerifyRequest { credential: Kind::Object(forged) };
    let result = handle(ISSUER, request, &agent).await.expect("should verify");
    assert!(!result.verified);
    assert_eq!(result.error.as_deref(), Some("issuer mismatch"));
}

// A VC-JWT claiming one issuer but signed under another identifier's key
// does not verify.
#[tokio::test]
async fn forged_issuer_jwt() {
    let agent = agent();
    let (victim, attacker) = two_identifiers(&agent).await;

    let document = agent.resolver().resolve(&attacker.did).expect("should resolve");
    let method = document.assertion_method.first().cloned().expect("should have method");

    let header = jose::Header {
        alg: jose::Algorithm::EdDSA,
        typ: Some("JWT".to_string()),
        kid: method,
    };
    let claims = jose::VcClaims::from(forged_vc(&victim.did));
    let input = jose::signing_input(&claims, &header).expect("should encode");
    let signature = agent
        .keys()
        .sign(&attacker.controller_key_id, input.as_bytes())
        .await
        .expect("should sign");

    let request = VerifyRequest { credential: Kind::String(jose::encode(&input, &signature)) };
    let result = handle(ISSUER, request, &agent).await.expect("should verify");
    assert!(!result.verified);
    assert_eq!(result.error.as_deref(), Some("issuer mismatch"));
}

// Caller-supplied subject claims override the issuer's dataset.
#[tokio::test]
async fn claim_overrides() {
    let agent = agent();
    let token = redeem(&agent).await;

    let mut overrides = Map::new();
    overrides.insert("givenName".to_string(), json!("Alice"));
    overrides.insert("id".to_string(), json!("did:example:alice"));

    let request = Request {
        body: CredentialRequest {
            credential_subject: Some(overrides),
            ..CredentialRequest::default()
        },
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    let response = handle(ISSUER, request, &agent).await.expect("should issue credential");

    let vc = response.credential.as_object().expect("should be a credential object");
    assert_eq!(vc.credential_subject.id.as_deref(), Some("did:example:alice"));
    assert_eq!(vc.credential_subject.claims["givenName"], "Alice");
    assert_eq!(vc.credential_subject.claims["familyName"], "Walt");
}

// A claim not defined by any supplied `@context` entry fails canonicalization
// rather than signing an open-world credential.
#[tokio::test]
async fn undefined_claim() {
    let agent = agent();
    let token = redeem(&agent).await;

    let mut overrides = Map::new();
    overrides.insert("frobnicate".to_string(), json!("x"));

    let request = Request {
        body: CredentialRequest {
            credential_subject: Some(overrides),
            ..CredentialRequest::default()
        },
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    let result = handle(ISSUER, request, &agent).await;
    assert!(matches!(result, Err(Error::CanonicalizationFailed(_))));

    // a failed issuance does not consume the token
    let request = Request {
        body: CredentialRequest::default(),
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    handle(ISSUER, request, &agent).await.expect("corrected retry should issue");
}

// Should reject a credential request for a format the engine cannot produce.
// The rejected request does not consume the token: a corrected retry
// succeeds.
#[tokio::test]
async fn unsupported_format() {
    let agent = agent();
    let token = redeem(&agent).await;

    let request = Request {
        body: CredentialRequest {
            format: Some("mso_mdoc".to_string()),
            ..CredentialRequest::default()
        },
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    let result = handle(ISSUER, request, &agent).await;
    assert!(matches!(result, Err(Error::UnsupportedProofFormat(_))));

    let request = Request {
        body: CredentialRequest::default(),
        headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
    };
    handle(ISSUER, request, &agent).await.expect("corrected retry should issue");
}

// The issuing identifier is created on first issuance and reused thereafter.
#[tokio::test]
async fn stable_issuer_identifier() {
    let agent = agent();

    let mut issuers = Vec::new();
    for _ in 0..2 {
        let token = redeem(&agent).await;
        let request = Request {
            body: CredentialRequest::default(),
            headers: AuthorizationHeader { authorization: format!("Bearer {token}") },
        };
        let response = handle(ISSUER, request, &agent).await.expect("should issue credential");
        let vc = response.credential.as_object().expect("should be a credential object").clone();
        issuers.push(vc.issuer_id().to_string());
    }
    assert_eq!(issuers[0], issuers[1]);
}

// Create two unrelated identifiers.
async fn two_identifiers(agent: &Agent<Issuer>) -> (Identifier, Identifier) {
    let victim = agent
        .dids()
        .create("key", KeyType::Ed25519, Some("victim"))
        .await
        .expect("should create identifier");
    let attacker = agent
        .dids()
        .create("key", KeyType::Ed25519, Some("attacker"))
        .await
        .expect("should create identifier");
    (victim, attacker)
}

// An unsigned credential naming the given DID as its issuer.
fn forged_vc(issuer_did: &str) -> VerifiableCredential {
    let Value::Object(claims) = json!({
        "givenName": "Mallory",
        "familyName": "Walt",
    }) else {
        panic!("expected object");
    };
    VerifiableCredential {
        context: vec![integrity::CREDENTIALS_V1.to_string(), integrity::VDL_V1.to_string()],
        id: Some("urn:uuid:forged".to_string()),
        type_: vec!["VerifiableCredential".to_string(), "MobileDrivingLicence".to_string()],
        issuer: Kind::Object(IssuerRef { id: issuer_did.to_string(), name: None }),
        issuance_date: Utc::now(),
        credential_subject: CredentialSubject { id: None, claims },
        proof: None,
    }
}

// Walk offer and token, returning an access token ready for a credential
// request.
async fn redeem(agent: &Agent<Issuer>) -> String {
    let offer = handle(ISSUER, CreateOfferRequest::default(), agent)
        .await
        .expect("should create offer");
    let request = TokenRequest {
        grant_type: PRE_AUTHORIZED_CODE.to_string(),
        pre_authorized_code: Some(offer.grants.pre_authorized_code.pre_authorized_code.clone()),
    };
    let token = handle(ISSUER, request, agent).await.expect("should return token");
    token.access_token.clone()
}

fn base64ct_decode(part: &str) -> Vec<u8> {
    use base64ct::{Base64UrlUnpadded, Encoding};
    Base64UrlUnpadded::decode_vec(part).expect("should decode")
}

fn base64ct_encode(payload: &str) -> String {
    use base64ct::{Base64UrlUnpadded, Encoding};
    Base64UrlUnpadded::encode_string(payload.as_bytes())
}
