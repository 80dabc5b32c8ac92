//! # Generate
//!
//! Random identifiers for pre-authorized codes, access tokens, and nonces.
//! Codes and tokens are one-time bearer secrets, so generation is
//! CSPRNG-backed.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::RngCore;
use rand::rngs::OsRng;

const TOKEN_LEN: usize = 32;

/// Generates a random pre-authorized code.
#[must_use]
pub fn code() -> String {
    random_token()
}

/// Generates a random access token.
#[must_use]
pub fn token() -> String {
    random_token()
}

/// Generates a random `c_nonce`.
#[must_use]
pub fn nonce() -> String {
    random_token()
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_shape() {
        let token = token();
        assert_eq!(token.len(), 43);
        assert!(!token.contains(['+', '/', '=']));
    }

    #[test]
    fn distinct() {
        assert_ne!(code(), code());
        assert_ne!(nonce(), nonce());
    }
}
