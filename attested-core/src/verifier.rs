//! Offline, whole-chain integrity and authenticity check (C5).
//!
//! The verifier touches nothing but a retrieved `Vec<Message>` and a
//! caller-supplied [`TrustedKeyMap`] — no `Store`, no adapters, no clock.
//! Verification is total: every message is inspected and every finding is
//! collected, so a tool can surface every tamper point in one pass.

use std::collections::HashMap;

use crate::keys::{decode_public_key, verify as verify_signature};
use crate::message::{signed_bytes, Message, ZERO_HASH};

/// `agent_id -> public key bytes`, curated by the caller. No default: an
/// `agent_id` absent from the map fails verification for any message
/// claiming it.
pub type TrustedKeyMap = HashMap<String, [u8; 32]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Required fields missing/malformed, `seq` doesn't match index, or
    /// `session_id` doesn't match the chain's first message.
    SchemaError { index: usize, detail: String },
    /// `prev_hash` did not match the computed digest of the predecessor
    /// (or the zero digest, at index 0).
    ChainBreak {
        index: usize,
        expected_prev: String,
        actual_prev: String,
    },
    /// `agent_id` has no entry in the `TrustedKeyMap`.
    UnknownAgent { index: usize, agent_id: String },
    /// The message's embedded `public_key` does not match the key bound to
    /// `agent_id` in the `TrustedKeyMap` — a strong binding so the log
    /// cannot silently substitute keys.
    KeyMismatch { index: usize, agent_id: String },
    /// The Ed25519 signature did not verify under the bound public key.
    SignatureInvalid { index: usize },
}

impl Finding {
    pub fn index(&self) -> usize {
        match self {
            Finding::SchemaError { index, .. }
            | Finding::ChainBreak { index, .. }
            | Finding::UnknownAgent { index, .. }
            | Finding::KeyMismatch { index, .. }
            | Finding::SignatureInvalid { index } => *index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub is_valid: bool,
    pub summary: String,
    pub findings: Vec<Finding>,
}

/// Verify `chain` against `trusted_keys`. Empty chain verifies vacuously
/// (P8). Never panics or returns `Err` on malformed input — bad data always
/// becomes a [`Finding`], never a thrown error (§7).
pub fn verify_chain(chain: &[Message], trusted_keys: &TrustedKeyMap) -> VerificationReport {
    if chain.is_empty() {
        return VerificationReport {
            is_valid: true,
            summary: "empty chain: vacuously valid".to_string(),
            findings: Vec::new(),
        };
    }

    let first_session_id = &chain[0].session_id;
    let mut findings = Vec::new();
    let mut prev_digest = ZERO_HASH.to_string();

    for (index, message) in chain.iter().enumerate() {
        // 1. Schema.
        if message.seq != index as u64 {
            findings.push(Finding::SchemaError {
                index,
                detail: format!("seq {} does not match chain position {}", message.seq, index),
            });
        }
        if &message.session_id != first_session_id {
            findings.push(Finding::SchemaError {
                index,
                detail: format!(
                    "session_id {:?} does not match chain's session_id {:?}",
                    message.session_id, first_session_id
                ),
            });
        }
        if message.prev_hash.len() != 64 || !message.prev_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            findings.push(Finding::SchemaError {
                index,
                detail: "prev_hash is not a 64-character hex string".to_string(),
            });
        }

        // 2. Chain linkage.
        if message.prev_hash.len() == 64 && message.prev_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            if message.prev_hash != prev_digest {
                findings.push(Finding::ChainBreak {
                    index,
                    expected_prev: prev_digest.clone(),
                    actual_prev: message.prev_hash.clone(),
                });
            }
        }

        // 3. Trust-map membership and key binding.
        let trusted_pk = trusted_keys.get(&message.agent_id);
        let embedded_pk = decode_public_key(&message.public_key).ok();

        let key_for_signature_check: Option<[u8; 32]> = match trusted_pk {
            None => {
                findings.push(Finding::UnknownAgent {
                    index,
                    agent_id: message.agent_id.clone(),
                });
                None
            }
            Some(trusted) => match embedded_pk {
                Some(embedded) if embedded == *trusted => Some(embedded),
                _ => {
                    findings.push(Finding::KeyMismatch {
                        index,
                        agent_id: message.agent_id.clone(),
                    });
                    None
                }
            },
        };

        // 4. Signature, only checked against a key that passed trust binding
        // (Open Question, decided in DESIGN.md: KeyMismatch precedes
        // SignatureInvalid for a substituted key).
        if let Some(pk) = key_for_signature_check {
            match signed_bytes(&message.signable_view()) {
                Ok(bytes) => {
                    if !verify_signature(&pk, &message.signature, &bytes) {
                        findings.push(Finding::SignatureInvalid { index });
                    }
                }
                Err(_) => findings.push(Finding::SchemaError {
                    index,
                    detail: "message fields are not canonicalizable".to_string(),
                }),
            }
        }

        // Next iteration's expected prev_hash is this message's digest,
        // computed independent of whether prev_hash matched above.
        prev_digest = match signed_bytes(&message.signable_view()) {
            Ok(bytes) => crate::message::hex_sha256(&bytes),
            Err(_) => prev_digest,
        };
    }

    let is_valid = findings.is_empty();
    let summary = if is_valid {
        format!("chain of {} message(s) verified successfully", chain.len())
    } else {
        format!(
            "chain of {} message(s) failed verification with {} finding(s)",
            chain.len(),
            findings.len()
        )
    };

    VerificationReport {
        is_valid,
        summary,
        findings,
    }
}
