//! Immutable message record, signable view, domain separation and the
//! hash-chain digest rule (C3).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::{canonical_json, CanonicalizationError};

/// The fixed ASCII prefix every signed/digested byte string begins with, so
/// a signature produced here can never be replayed against a different
/// protocol that also signs raw canonical JSON.
pub const DOMAIN_PREFIX: &str = "attested-logs/v1\n";

/// Hex digest of an empty-chain predecessor (64 `'0'` characters).
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// An immutable, fully-signed message in a session's hash chain.
///
/// Construct instances only through [`crate::session::Session::append`] or
/// by deserializing a chain retrieved from a [`crate::store::Store`] /
/// JSONL export — never by hand, since `prev_hash`/`signature` must be
/// computed together with the rest of the signable view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub session_id: String,
    pub seq: u64,
    pub timestamp: String,
    pub role: String,
    pub agent_id: String,
    pub content: String,
    pub prev_hash: String,
    pub public_key: String,
    pub signature: String,
}

/// The eight named fields that make up a message's signable view.
/// `signature` is deliberately excluded — see module docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignableView {
    pub session_id: String,
    pub seq: u64,
    pub timestamp: String,
    pub role: String,
    pub agent_id: String,
    pub content: String,
    pub prev_hash: String,
    pub public_key: String,
}

impl Message {
    /// This message's signable view (everything but `signature`).
    pub fn signable_view(&self) -> SignableView {
        SignableView {
            session_id: self.session_id.clone(),
            seq: self.seq,
            timestamp: self.timestamp.clone(),
            role: self.role.clone(),
            agent_id: self.agent_id.clone(),
            content: self.content.clone(),
            prev_hash: self.prev_hash.clone(),
            public_key: self.public_key.clone(),
        }
    }

    /// `"attested-logs/v1\n" || canonical_json(signable_view)` — the exact
    /// bytes that were signed, and the exact bytes hashed to produce
    /// [`digest`].
    pub fn signed_bytes(&self) -> Result<Vec<u8>, CanonicalizationError> {
        signed_bytes(&self.signable_view())
    }

    /// `SHA-256(signed_bytes)`, hex-lowercase — this message's contribution
    /// to the chain, embedded as the *next* message's `prev_hash`.
    pub fn digest(&self) -> Result<String, CanonicalizationError> {
        Ok(hex_sha256(&self.signed_bytes()?))
    }
}

/// Compute the domain-separated bytes that get signed/hashed for a given
/// signable view, without requiring a fully-assembled [`Message`]. Used by
/// [`crate::session::Session::append`] to sign a message before it exists.
pub fn signed_bytes(view: &SignableView) -> Result<Vec<u8>, CanonicalizationError> {
    let canon = canonical_json(&serde_json::to_value(view).expect("SignableView is always representable"))?;
    let mut out = Vec::with_capacity(DOMAIN_PREFIX.len() + canon.len());
    out.extend_from_slice(DOMAIN_PREFIX.as_bytes());
    out.extend_from_slice(canon.as_bytes());
    Ok(out)
}

pub(crate) fn hex_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex_lower(&digest)
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> SignableView {
        SignableView {
            session_id: "s1".into(),
            seq: 0,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            role: "user".into(),
            agent_id: "agent:a".into(),
            content: "hi".into(),
            prev_hash: ZERO_HASH.into(),
            public_key: "x".repeat(43),
        }
    }

    #[test]
    fn zero_hash_is_64_chars_of_zero() {
        assert_eq!(ZERO_HASH.len(), 64);
        assert!(ZERO_HASH.chars().all(|c| c == '0'));
    }

    #[test]
    fn signed_bytes_start_with_domain_prefix() {
        let view = sample_view();
        let bytes = signed_bytes(&view).unwrap();
        assert!(bytes.starts_with(DOMAIN_PREFIX.as_bytes()));
    }

    #[test]
    fn digest_is_64_hex_chars() {
        let view = sample_view();
        let bytes = signed_bytes(&view).unwrap();
        let digest = hex_sha256(&bytes);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_view_same_digest() {
        let a = signed_bytes(&sample_view()).unwrap();
        let b = signed_bytes(&sample_view()).unwrap();
        assert_eq!(hex_sha256(&a), hex_sha256(&b));
    }

    #[test]
    fn different_content_different_digest() {
        let mut v2 = sample_view();
        v2.content = "bye".into();
        let a = hex_sha256(&signed_bytes(&sample_view()).unwrap());
        let b = hex_sha256(&signed_bytes(&v2).unwrap());
        assert_ne!(a, b);
    }
}
