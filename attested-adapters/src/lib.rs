//! Framework-adapter polymorphism (Design Notes §9): the core specifies
//! only a hook shape — one `append` call per observed host event, carrying
//! `role`, `agent_id`, `content`, `timestamp`. This crate supplies that
//! capability trait, a `LogWriter` that turns observed events into appends
//! against a single session, and two adapters that exercise it without
//! depending on any third-party agent-framework crate (out of scope per
//! the core's own charter).
//!
//! Re-ordering or dropping events before they reach [`LogWriter::observe`]
//! breaks chain semantics; that's the adapter author's responsibility, not
//! something this crate or the core can prevent. The offline Verifier is
//! what catches it after the fact.

pub mod generic;
pub mod jsonl;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use attested_core::{AppendError, Clock, Keypair, Message, Session, Store};
use thiserror::Error;

/// One host event a framework adapter has observed and wants appended to
/// the log: a pre-send or post-receive turn.
pub trait ObservedEvent {
    fn role(&self) -> &str;
    fn agent_id(&self) -> &str;
    fn content(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum LogWriterError {
    #[error("no signing key registered for agent_id {0:?}")]
    UnknownAgent(String),
    #[error(transparent)]
    Append(#[from] AppendError),
}

/// Owns one session's `Mutex<Session>` plus the signing keys of every
/// agent_id it is willing to append on behalf of. A host registers one
/// `LogWriter` per session; registering the same `agent_id` twice replaces
/// its key (revocation/rotation within a live session is undefined per the
/// core's Open Questions — this crate documents last-write-wins as its
/// choice, not a core guarantee).
pub struct LogWriter {
    session: Mutex<Session>,
    keys: Mutex<HashMap<String, Keypair>>,
}

impl LogWriter {
    pub fn new(session_id: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self {
            session: Mutex::new(Session::open(session_id, store)),
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// Resume appending to a session that already has messages in `store`.
    pub fn resume(session_id: impl Into<String>, store: Arc<dyn Store>) -> Result<Self, attested_core::StoreError> {
        Ok(Self {
            session: Mutex::new(Session::resume(session_id, store)?),
            keys: Mutex::new(HashMap::new()),
        })
    }

    /// Register the signing key used for a given `agent_id`'s future
    /// appends through this writer.
    pub fn register_signer(&self, agent_id: impl Into<String>, keypair: Keypair) {
        self.keys.lock().expect("keys mutex poisoned").insert(agent_id.into(), keypair);
    }

    /// Turn one observed event into exactly one `Session::append` call,
    /// serialized through this writer's session mutex (§5: a `Session` is a
    /// single-writer object).
    pub fn observe(&self, event: &dyn ObservedEvent, clock: &dyn Clock) -> Result<Message, LogWriterError> {
        let keys = self.keys.lock().expect("keys mutex poisoned");
        let keypair = keys
            .get(event.agent_id())
            .ok_or_else(|| LogWriterError::UnknownAgent(event.agent_id().to_string()))?;

        let mut session = self.session.lock().expect("session mutex poisoned");
        let timestamp = clock.now_rfc3339_millis();
        let message = session.append(
            event.content(),
            event.role(),
            keypair,
            event.agent_id(),
            timestamp,
        )?;
        tracing::info!(session_id = session.session_id(), seq = message.seq, agent_id = %message.agent_id, "appended message");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attested_core::{FixedClock, MemoryStore};
    use crate::generic::GenericTurnAdapter;

    #[test]
    fn observe_appends_through_registered_signer() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let writer = LogWriter::new("s1", store);
        writer.register_signer("agent:a", Keypair::from_seed_bytes(&[1; 32]));

        let event = GenericTurnAdapter::new("user", "agent:a", "hi");
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");
        let message = writer.observe(&event, &clock).unwrap();
        assert_eq!(message.seq, 0);
        assert_eq!(message.content, "hi");
    }

    #[test]
    fn observe_without_registered_signer_fails() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let writer = LogWriter::new("s1", store);
        let event = GenericTurnAdapter::new("user", "agent:unknown", "hi");
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");
        assert!(matches!(
            writer.observe(&event, &clock),
            Err(LogWriterError::UnknownAgent(_))
        ));
    }

    #[test]
    fn two_events_produce_a_linked_chain() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let writer = LogWriter::new("s1", store);
        writer.register_signer("agent:a", Keypair::from_seed_bytes(&[1; 32]));
        writer.register_signer("agent:b", Keypair::from_seed_bytes(&[2; 32]));
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");

        let first = writer
            .observe(&GenericTurnAdapter::new("user", "agent:a", "hi"), &clock)
            .unwrap();
        let second = writer
            .observe(&GenericTurnAdapter::new("assistant", "agent:b", "hello"), &clock)
            .unwrap();

        assert_eq!(second.prev_hash, first.digest().unwrap());
    }
}
