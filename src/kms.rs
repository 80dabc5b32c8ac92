//! # Key Management Service
//!
//! The KMS boundary: private keys are generated inside a KMS, handed out only
//! as wrapped blobs, and unwrapped only for the duration of a signing
//! operation.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::Signer as _;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::key::{KeyRecord, KeyType};

const NONCE_LEN: usize = 12;

/// Wraps secrets with AES-256-GCM under a key derived from the KMS master
/// secret. Sealed blobs are base64url `nonce || ciphertext`.
pub struct SecretBox {
    key: [u8; 32],
}

impl SecretBox {
    /// Derive a wrapping key from the master secret.
    #[must_use]
    pub fn new(master_secret: &str) -> Self {
        Self {
            key: Sha256::digest(master_secret.as_bytes()).into(),
        }
    }

    /// Seal the plaintext, returning an opaque blob.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| anyhow!("sealing secret: {e}"))?;

        let mut blob = nonce.to_vec();
        blob.extend(ciphertext);
        Ok(Base64UrlUnpadded::encode_string(&blob))
    }

    /// Open a sealed blob, returning the plaintext.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is malformed or was sealed under a
    /// different master secret.
    pub fn open(&self, blob: &str) -> Result<Vec<u8>> {
        let bytes = Base64UrlUnpadded::decode_vec(blob)
            .map_err(|e| anyhow!("decoding sealed blob: {e}"))?;
        if bytes.len() <= NONCE_LEN {
            bail!("sealed blob is too short");
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| anyhow!("opening sealed blob: {e}"))
    }
}

/// Key material returned by a KMS on generation. Private material is wrapped.
pub struct GeneratedKey {
    /// Base64url-encoded public key bytes.
    pub public_key: String,

    /// The wrapped private key blob.
    pub wrapped_private_key: String,
}

/// A key management backend. Implementations hold the only path to unwrapped
/// private key material.
pub trait Kms: Send + Sync {
    /// Backend name, recorded on key records.
    fn name(&self) -> &'static str;

    /// Generate a new key pair of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot generate or wrap the key.
    fn generate(&self, key_type: KeyType) -> Result<GeneratedKey>;

    /// Sign the payload with the record's private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the wrapped key cannot be opened or the signing
    /// operation fails.
    fn sign(&self, record: &KeyRecord, payload: &[u8]) -> Result<Vec<u8>>;
}

/// An in-process KMS supporting Ed25519 and secp256k1 keys.
pub struct LocalKms {
    secrets: SecretBox,
}

impl LocalKms {
    /// Create a local KMS from its master secret.
    #[must_use]
    pub fn new(master_secret: &str) -> Self {
        Self {
            secrets: SecretBox::new(master_secret),
        }
    }
}

impl Kms for LocalKms {
    fn name(&self) -> &'static str {
        "local"
    }

    fn generate(&self, key_type: KeyType) -> Result<GeneratedKey> {
        match key_type {
            KeyType::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
                Ok(GeneratedKey {
                    public_key: Base64UrlUnpadded::encode_string(
                        signing_key.verifying_key().as_bytes(),
                    ),
                    wrapped_private_key: self.secrets.seal(signing_key.as_bytes())?,
                })
            }
            KeyType::Secp256k1 => {
                let signing_key = k256::ecdsa::SigningKey::random(&mut OsRng);
                let public = signing_key.verifying_key().to_encoded_point(false);
                Ok(GeneratedKey {
                    public_key: Base64UrlUnpadded::encode_string(public.as_bytes()),
                    wrapped_private_key: self.secrets.seal(&signing_key.to_bytes())?,
                })
            }
        }
    }

    fn sign(&self, record: &KeyRecord, payload: &[u8]) -> Result<Vec<u8>> {
        let secret = self.secrets.open(&record.wrapped_private_key)?;

        match record.key_type {
            KeyType::Ed25519 => {
                let bytes: [u8; 32] =
                    secret.try_into().map_err(|_| anyhow!("invalid Ed25519 secret key"))?;
                let signing_key = ed25519_dalek::SigningKey::from_bytes(&bytes);
                Ok(signing_key.sign(payload).to_bytes().to_vec())
            }
            KeyType::Secp256k1 => {
                let signing_key = k256::ecdsa::SigningKey::from_slice(&secret)?;
                let signature: k256::ecdsa::Signature = signing_key.sign(payload);
                Ok(signature.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use ed25519_dalek::Verifier as _;

    use super::*;

    #[test]
    fn secret_box_roundtrip() {
        let secrets = SecretBox::new("test master secret");
        let sealed = secrets.seal(b"private key bytes").expect("should seal");
        let opened = secrets.open(&sealed).expect("should open");
        assert_eq!(opened, b"private key bytes");
    }

    #[test]
    fn secret_box_wrong_master() {
        let sealed = SecretBox::new("one").seal(b"secret").expect("should seal");
        assert!(SecretBox::new("two").open(&sealed).is_err());
    }

    #[test]
    fn ed25519_sign() {
        let kms = LocalKms::new("test master secret");
        let generated = kms.generate(KeyType::Ed25519).expect("should generate");
        let record = KeyRecord {
            kid: "key-1".to_string(),
            key_type: KeyType::Ed25519,
            public_key: generated.public_key.clone(),
            wrapped_private_key: generated.wrapped_private_key,
            kms: "local".to_string(),
        };

        let sig = kms.sign(&record, b"message").expect("should sign");

        let public = Base64UrlUnpadded::decode_vec(&generated.public_key).unwrap();
        let bytes: [u8; 32] = public.try_into().unwrap();
        let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&bytes).unwrap();
        let signature = ed25519_dalek::Signature::from_slice(&sig).unwrap();
        verifying_key.verify(b"message", &signature).expect("should verify");
    }

    #[test]
    fn secp256k1_sign() {
        let kms = LocalKms::new("test master secret");
        let generated = kms.generate(KeyType::Secp256k1).expect("should generate");
        let record = KeyRecord {
            kid: "key-2".to_string(),
            key_type: KeyType::Secp256k1,
            public_key: generated.public_key.clone(),
            wrapped_private_key: generated.wrapped_private_key,
            kms: "local".to_string(),
        };

        let sig = kms.sign(&record, b"message").expect("should sign");

        let public = Base64UrlUnpadded::decode_vec(&generated.public_key).unwrap();
        let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&public).unwrap();
        let signature = k256::ecdsa::Signature::from_slice(&sig).unwrap();
        verifying_key.verify(b"message", &signature).expect("should verify");
    }
}
