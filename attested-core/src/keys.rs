//! Ed25519 keypair generation, signing and verification (C2).
//!
//! Private key material never leaves [`Keypair`]; every other part of the
//! core only ever sees a base64url-encoded public key or a signature.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error("invalid base64 public key: {0}")]
    Base64(String),
    #[error("public key must decode to exactly 32 bytes, got {0}")]
    BadPublicKeyLength(usize),
    #[error("signature must decode to exactly 64 bytes, got {0}")]
    BadSignatureLength(usize),
}

/// A generated Ed25519 keypair. Wraps `ed25519-dalek`'s `SigningKey`.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from a cryptographically secure source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from its 32-byte seed (e.g. loaded from disk by
    /// a caller — the core itself never touches a filesystem).
    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte seed backing this keypair.
    pub fn seed_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// This keypair's public key, base64url (unpadded), 43 characters.
    pub fn public_key_b64url(&self) -> String {
        encode_public_key(&self.signing_key.verifying_key())
    }

    /// Sign `msg_bytes`, returning a base64url (unpadded) signature.
    pub fn sign(&self, msg_bytes: &[u8]) -> String {
        let sig: Signature = self.signing_key.sign(msg_bytes);
        URL_SAFE_NO_PAD.encode(sig.to_bytes())
    }
}

fn encode_public_key(vk: &VerifyingKey) -> String {
    URL_SAFE_NO_PAD.encode(vk.to_bytes())
}

/// Decode a base64url (unpadded) public key into raw bytes.
pub fn decode_public_key(b64url: &str) -> Result<[u8; 32], SigningError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(b64url)
        .map_err(|e| SigningError::Base64(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| SigningError::BadPublicKeyLength(v.len()))
}

/// Verify `sig_b64url` over `msg_bytes` under the raw 32-byte public key.
/// Rejects malformed keys and signatures by returning `false` rather than
/// propagating a decode error — callers (the Verifier) treat malformed
/// material identically to a failed cryptographic check.
pub fn verify(pk_bytes: &[u8; 32], sig_b64url: &str, msg_bytes: &[u8]) -> bool {
    let vk = match VerifyingKey::from_bytes(pk_bytes) {
        Ok(vk) => vk,
        Err(_) => return false,
    };
    let sig_bytes = match URL_SAFE_NO_PAD.decode(sig_b64url) {
        Ok(b) => b,
        Err(_) => return false,
    };
    let sig_arr: [u8; 64] = match sig_bytes.try_into() {
        Ok(a) => a,
        Err(_) => return false,
    };
    let sig = Signature::from_bytes(&sig_arr);
    vk.verify(msg_bytes, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrip() {
        let kp = Keypair::generate();
        let msg = b"hello world";
        let sig = kp.sign(msg);
        let pk = decode_public_key(&kp.public_key_b64url()).unwrap();
        assert!(verify(&pk, &sig, msg));
    }

    #[test]
    fn public_key_is_43_chars() {
        let kp = Keypair::generate();
        assert_eq!(kp.public_key_b64url().len(), 43);
    }

    #[test]
    fn tampered_message_fails_verification() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"original");
        let pk = decode_public_key(&kp.public_key_b64url()).unwrap();
        assert!(!verify(&pk, &sig, b"tampered"));
    }

    #[test]
    fn seed_roundtrip_reproduces_same_key() {
        let kp = Keypair::generate();
        let seed = kp.seed_bytes();
        let kp2 = Keypair::from_seed_bytes(&seed);
        assert_eq!(kp.public_key_b64url(), kp2.public_key_b64url());
    }

    #[test]
    fn malformed_public_key_rejected() {
        assert!(matches!(
            decode_public_key("not-valid-b64!!"),
            Err(SigningError::Base64(_))
        ));
    }

    #[test]
    fn wrong_length_public_key_rejected() {
        let short = URL_SAFE_NO_PAD.encode([0u8; 16]);
        assert!(matches!(
            decode_public_key(&short),
            Err(SigningError::BadPublicKeyLength(16))
        ));
    }

    #[test]
    fn verify_rejects_malformed_signature() {
        let kp = Keypair::generate();
        let pk = decode_public_key(&kp.public_key_b64url()).unwrap();
        assert!(!verify(&pk, "not base64!!", b"msg"));
    }
}
