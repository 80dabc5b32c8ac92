//! # did:key
//!
//! A deterministic DID method: the identifier encodes the public key, so
//! resolution needs no registry or network access.
//!
//! See <https://w3c-ccg.github.io/did-method-key>

use multibase::Base;

use super::DidOperator;
use super::document::{Document, PublicKey, VerificationMethod};
use crate::key::KeyType;
use crate::{Error, Result};

const ED25519_CODEC: [u8; 2] = [0xed, 0x01];
const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
const MULTIKEY_CONTEXT: &str = "https://w3id.org/security/multikey/v1";

/// The did:key method operator.
pub struct DidKey;

impl DidOperator for DidKey {
    fn method(&self) -> &'static str {
        "key"
    }

    fn create(&self, public_key: &[u8], key_type: KeyType) -> Result<String> {
        if key_type != KeyType::Ed25519 {
            return Err(Error::UnsupportedKeyType(
                "did:key identifiers support Ed25519 keys only".to_string(),
            ));
        }

        let mut multi_bytes = ED25519_CODEC.to_vec();
        multi_bytes.extend_from_slice(public_key);
        let multikey = multibase::encode(Base::Base58Btc, &multi_bytes);

        Ok(format!("did:key:{multikey}"))
    }

    fn resolve(&self, did: &str) -> Result<Document> {
        let Some(multikey) = did.strip_prefix("did:key:") else {
            return Err(Error::NotFound(format!("{did} is not a did:key identifier")));
        };

        let (_, key_bytes) = multibase::decode(multikey)
            .map_err(|e| Error::NotFound(format!("invalid did:key encoding: {e}")))?;
        if key_bytes.len() != 34 || key_bytes[0..2] != ED25519_CODEC {
            return Err(Error::NotFound("unsupported did:key codec".to_string()));
        }

        let kid = format!("{did}#{multikey}");

        Ok(Document {
            context: vec![DID_CONTEXT.to_string(), MULTIKEY_CONTEXT.to_string()],
            id: did.to_string(),
            verification_method: vec![VerificationMethod {
                id: kid.clone(),
                type_: "Multikey".to_string(),
                controller: did.to_string(),
                public_key: PublicKey::PublicKeyMultibase(multikey.to_string()),
            }],
            authentication: vec![kid.clone()],
            assertion_method: vec![kid],
            service: vec![],
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn create_resolve_roundtrip() {
        let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let public_key = signing_key.verifying_key().to_bytes();

        let did = DidKey.create(&public_key, KeyType::Ed25519).expect("should create");
        assert!(did.starts_with("did:key:z"));

        let document = DidKey.resolve(&did).expect("should resolve");
        assert_eq!(document.id, did);
        let method = &document.verification_method[0];
        let PublicKey::PublicKeyMultibase(multikey) = &method.public_key else {
            panic!("expected multibase key");
        };
        let (_, bytes) = multibase::decode(multikey).expect("should decode");
        assert_eq!(&bytes[2..], public_key);
    }

    #[test]
    fn secp256k1_rejected() {
        let result = DidKey.create(&[0u8; 33], KeyType::Secp256k1);
        assert!(matches!(result, Err(Error::UnsupportedKeyType(_))));
    }

    #[test]
    fn unknown_codec_rejected() {
        let multikey = multibase::encode(Base::Base58Btc, [0xec, 0x01, 0x00]);
        let result = DidKey.resolve(&format!("did:key:{multikey}"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
