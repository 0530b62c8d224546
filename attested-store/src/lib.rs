//! Durable realization of [`attested_core::Store`] backed by SQLite via
//! `rusqlite`, opened in WAL journal mode with `synchronous = NORMAL` — the
//! write-ahead-log-backed row store with autocommit that the design calls
//! an acceptable crash-safety realization.
//!
//! The store does no validation of message contents; it only enforces the
//! append-only shape of the data model (§6.1): a `(session_id, seq)` pair
//! may be `put` once, and re-`put`ting the identical record is a no-op.
//! Whether a chain is internally consistent is entirely the Verifier's job.

use std::path::Path;
use std::sync::Mutex;

use attested_core::{Message, Store, StoreError};
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed `Store`. One connection per instance, guarded by a mutex —
/// `rusqlite::Connection` is `Send` but not `Sync`, and the `Store` trait
/// requires both since a host may share one `SqliteStore` across sessions
/// running on different threads.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if absent) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(io_err)?;
        let store = Self::init(conn)?;
        tracing::info!(path = %path.display(), "opened sqlite store");
        Ok(store)
    }

    /// Open an in-process, non-durable database. Useful for tests that want
    /// real SQL semantics without a temp file; prefer
    /// [`attested_core::MemoryStore`] when SQL semantics don't matter.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(io_err)?;
        let store = Self::init(conn)?;
        tracing::info!("opened in-memory sqlite store");
        Ok(store)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL").map_err(io_err)?;
        conn.pragma_update(None, "synchronous", "NORMAL").map_err(io_err)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                session_id TEXT NOT NULL,
                seq        INTEGER NOT NULL,
                timestamp  TEXT NOT NULL,
                role       TEXT NOT NULL,
                agent_id   TEXT NOT NULL,
                content    TEXT NOT NULL,
                prev_hash  TEXT NOT NULL,
                public_key TEXT NOT NULL,
                signature  TEXT NOT NULL,
                PRIMARY KEY (session_id, seq)
            )",
            [],
        )
        .map_err(io_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl Store for SqliteStore {
    fn put(&self, message: Message) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;

        let existing = conn
            .query_row(
                "SELECT timestamp, role, agent_id, content, prev_hash, public_key, signature
                 FROM messages WHERE session_id = ?1 AND seq = ?2",
                params![message.session_id, message.seq as i64],
                |row| {
                    Ok(Message {
                        session_id: message.session_id.clone(),
                        seq: message.seq,
                        timestamp: row.get(0)?,
                        role: row.get(1)?,
                        agent_id: row.get(2)?,
                        content: row.get(3)?,
                        prev_hash: row.get(4)?,
                        public_key: row.get(5)?,
                        signature: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(io_err)?;

        match existing {
            Some(existing) if existing == message => {
                tracing::info!(session_id = %message.session_id, seq = message.seq, "idempotent re-put, no-op");
                Ok(())
            }
            Some(_) => {
                tracing::warn!(session_id = %message.session_id, seq = message.seq, "rejected put: conflicts with existing record");
                Err(StoreError::Conflict {
                    session_id: message.session_id,
                    seq: message.seq,
                })
            }
            None => {
                conn.execute(
                    "INSERT INTO messages
                     (session_id, seq, timestamp, role, agent_id, content, prev_hash, public_key, signature)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        message.session_id,
                        message.seq as i64,
                        message.timestamp,
                        message.role,
                        message.agent_id,
                        message.content,
                        message.prev_hash,
                        message.public_key,
                        message.signature,
                    ],
                )
                .map_err(io_err)?;
                tracing::info!(session_id = %message.session_id, seq = message.seq, "appended message");
                Ok(())
            }
        }
    }

    fn list_sessions(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT session_id FROM messages ORDER BY session_id")
            .map_err(io_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(io_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(io_err)
    }

    fn get_chain(&self, session_id: &str) -> Result<Vec<Message>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Io("lock poisoned".into()))?;
        let mut stmt = conn
            .prepare(
                "SELECT session_id, seq, timestamp, role, agent_id, content, prev_hash, public_key, signature
                 FROM messages WHERE session_id = ?1 ORDER BY seq ASC",
            )
            .map_err(io_err)?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(Message {
                    session_id: row.get(0)?,
                    seq: {
                        let seq: i64 = row.get(1)?;
                        seq as u64
                    },
                    timestamp: row.get(2)?,
                    role: row.get(3)?,
                    agent_id: row.get(4)?,
                    content: row.get(5)?,
                    prev_hash: row.get(6)?,
                    public_key: row.get(7)?,
                    signature: row.get(8)?,
                })
            })
            .map_err(io_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(io_err)
    }
}

fn io_err(e: rusqlite::Error) -> StoreError {
    StoreError::Io(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use attested_core::ZERO_HASH;

    fn msg(session_id: &str, seq: u64, content: &str) -> Message {
        Message {
            session_id: session_id.into(),
            seq,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
            role: "user".into(),
            agent_id: "agent:a".into(),
            content: content.into(),
            prev_hash: ZERO_HASH.into(),
            public_key: "x".repeat(43),
            signature: "y".repeat(86),
        }
    }

    #[test]
    fn put_then_get_chain_roundtrips() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put(msg("s1", 0, "hi")).unwrap();
        store.put(msg("s1", 1, "there")).unwrap();
        let chain = store.get_chain("s1").unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].content, "there");
    }

    #[test]
    fn idempotent_reput_is_ok() {
        let store = SqliteStore::open_in_memory().unwrap();
        let m = msg("s1", 0, "hi");
        store.put(m.clone()).unwrap();
        assert!(store.put(m).is_ok());
    }

    #[test]
    fn conflicting_reput_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put(msg("s1", 0, "hi")).unwrap();
        let err = store.put(msg("s1", 0, "HACKED")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn list_sessions_returns_distinct_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put(msg("s1", 0, "a")).unwrap();
        store.put(msg("s2", 0, "b")).unwrap();
        assert_eq!(store.list_sessions().unwrap(), vec!["s1", "s2"]);
    }

    #[test]
    fn file_backed_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(msg("s1", 0, "hi")).unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get_chain("s1").unwrap().len(), 1);
    }
}
