//! Stateful append protocol producing a linked, signed sequence (C4).
//!
//! `Session` is a single-writer object (§5): its invariants require that
//! `append` run under mutual exclusion for a given `session_id`. This type
//! is plain `&mut self`-on-append and intentionally does not wrap itself in
//! a `Mutex` — a host (the CLI, an adapter's `LogWriter`) owns one `Mutex`
//! per `session_id` and serializes calls through it. Distinct sessions are
//! independent and may proceed in parallel.

use std::sync::Arc;

use thiserror::Error;

use crate::canonical::CanonicalizationError;
use crate::keys::Keypair;
use crate::message::{signed_bytes, hex_sha256, Message, SignableView, ZERO_HASH};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum AppendError {
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    #[error("store rejected the append: {0}")]
    Store(#[from] StoreError),
}

/// One conversational stream: one monotonic sequence counter, one current
/// chain tip. Construct with [`Session::open`] (first use of a
/// `session_id`) or [`Session::resume`] (continuing a chain already in the
/// `Store`).
pub struct Session {
    session_id: String,
    next_seq: u64,
    last_hash: String,
    store: Arc<dyn Store>,
}

impl Session {
    /// Start a brand-new session: `next_seq = 0`, `last_hash` = the all-zero
    /// digest.
    pub fn open(session_id: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self {
            session_id: session_id.into(),
            next_seq: 0,
            last_hash: ZERO_HASH.to_string(),
            store,
        }
    }

    /// Resume a session whose chain already has messages in `store` —
    /// reads the current tip back out so further appends link correctly.
    /// Returns `Session::open` behavior (an empty session) if the store has
    /// no messages yet for `session_id`.
    pub fn resume(session_id: impl Into<String>, store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let session_id = session_id.into();
        let chain = store.get_chain(&session_id)?;
        match chain.last() {
            Some(last) => {
                let last_hash = last
                    .digest()
                    .map_err(|e| StoreError::Io(format!("could not re-derive tip digest: {e}")))?;
                Ok(Self {
                    session_id,
                    next_seq: last.seq + 1,
                    last_hash,
                    store,
                })
            }
            None => Ok(Self::open(session_id, store)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }

    /// Build, sign, persist, and commit a new message (§4.4 steps 1-6).
    ///
    /// `content`, `role`, and `agent_id` are carried verbatim; `timestamp`
    /// is a caller-supplied claim (the core never reads a clock — see
    /// [`crate::clock`]). On any error, session state (`next_seq`,
    /// `last_hash`) is left unchanged and no message is ever handed to the
    /// store: steps 1-4 have no externally visible effect until the store
    /// write in step 5 succeeds.
    pub fn append(
        &mut self,
        content: impl Into<String>,
        role: impl Into<String>,
        keypair: &Keypair,
        agent_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Message, AppendError> {
        let view = SignableView {
            session_id: self.session_id.clone(),
            seq: self.next_seq,
            timestamp: timestamp.into(),
            role: role.into(),
            agent_id: agent_id.into(),
            content: content.into(),
            prev_hash: self.last_hash.clone(),
            public_key: keypair.public_key_b64url(),
        };

        let bytes = signed_bytes(&view)?;
        let signature = keypair.sign(&bytes);
        let digest = hex_sha256(&bytes);

        let message = Message {
            session_id: view.session_id,
            seq: view.seq,
            timestamp: view.timestamp,
            role: view.role,
            agent_id: view.agent_id,
            content: view.content,
            prev_hash: view.prev_hash,
            public_key: view.public_key,
            signature,
        };

        self.store.put(message.clone())?;

        self.last_hash = digest;
        self.next_seq += 1;

        Ok(message)
    }
}
