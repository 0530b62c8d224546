//! Persistence boundary the core consumes (§6.1). The trait is the contract;
//! `attested-store` ships the durable `sqlite`-backed realization, and this
//! module ships [`MemoryStore`] so `attested-core`'s own tests — and
//! `attested-adapters`'/`attested-cli`'s — don't need a filesystem.
//!
//! The store does no validation; the [`crate::verifier`] is the only oracle
//! of integrity. `put` is append-only: overwriting an existing
//! `(session_id, seq)` with *different* content is a [`StoreError`];
//! re-putting the identical record is accepted as a no-op.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::message::Message;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("message at (session_id={session_id:?}, seq={seq}) already exists with different content")]
    Conflict { session_id: String, seq: u64 },
    #[error("store I/O failure: {0}")]
    Io(String),
}

/// Durable persistence and retrieval of messages by session (E1).
///
/// Implementations MUST guarantee that a record has survived a process
/// crash once `put` returns `Ok`. Neither `Session` nor the `Verifier`
/// depends on any concrete implementation — both are written against this
/// trait.
pub trait Store: Send + Sync {
    fn put(&self, message: Message) -> Result<(), StoreError>;
    fn list_sessions(&self) -> Result<Vec<String>, StoreError>;
    fn get_chain(&self, session_id: &str) -> Result<Vec<Message>, StoreError>;
}

/// In-memory `Store`, keyed by `(session_id, seq)`. Not durable — exists for
/// tests and for hosts that don't need cross-process persistence.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<(String, u64), Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn put(&self, message: Message) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Io("lock poisoned".into()))?;
        let key = (message.session_id.clone(), message.seq);
        match guard.get(&key) {
            Some(existing) if existing != &message => Err(StoreError::Conflict {
                session_id: message.session_id.clone(),
                seq: message.seq,
            }),
            Some(_) => Ok(()),
            None => {
                guard.insert(key, message);
                Ok(())
            }
        }
    }

    fn list_sessions(&self) -> Result<Vec<String>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Io("lock poisoned".into()))?;
        let mut ids: Vec<String> = guard.keys().map(|(sid, _)| sid.clone()).collect();
        ids.dedup();
        Ok(ids)
    }

    fn get_chain(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::Io("lock poisoned".into()))?;
        Ok(guard
            .range((session_id.to_string(), 0)..(session_id.to_string(), u64::MAX))
            .map(|(_, m)| m.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(session_id: &str, seq: u64, content: &str) -> Message {
        Message {
            session_id: session_id.into(),
            seq,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            role: "user".into(),
            agent_id: "agent:a".into(),
            content: content.into(),
            prev_hash: crate::message::ZERO_HASH.into(),
            public_key: "x".repeat(43),
            signature: "y".repeat(86),
        }
    }

    #[test]
    fn put_then_get_chain_roundtrips() {
        let store = MemoryStore::new();
        store.put(msg("s1", 0, "hi")).unwrap();
        store.put(msg("s1", 1, "there")).unwrap();
        let chain = store.get_chain("s1").unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].seq, 0);
        assert_eq!(chain[1].seq, 1);
    }

    #[test]
    fn idempotent_reput_of_identical_record_is_ok() {
        let store = MemoryStore::new();
        let m = msg("s1", 0, "hi");
        store.put(m.clone()).unwrap();
        assert!(store.put(m).is_ok());
    }

    #[test]
    fn reput_with_different_content_is_conflict() {
        let store = MemoryStore::new();
        store.put(msg("s1", 0, "hi")).unwrap();
        let err = store.put(msg("s1", 0, "HACKED")).unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                session_id: "s1".into(),
                seq: 0
            }
        );
    }

    #[test]
    fn list_sessions_reflects_distinct_ids() {
        let store = MemoryStore::new();
        store.put(msg("s1", 0, "a")).unwrap();
        store.put(msg("s2", 0, "b")).unwrap();
        let mut sessions = store.list_sessions().unwrap();
        sessions.sort();
        assert_eq!(sessions, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn unknown_session_returns_empty_chain() {
        let store = MemoryStore::new();
        assert!(store.get_chain("nope").unwrap().is_empty());
    }
}
