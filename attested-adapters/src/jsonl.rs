//! A stand-in for "observe a host framework's event log" without pulling in
//! any real third-party agent-framework crate (out of scope per the core's
//! charter). Reads one observed turn per line of a JSONL stream and feeds
//! each through a [`crate::LogWriter`] in file order — the adapter's
//! responsibility to preserve, since reordering or dropping lines here
//! breaks chain semantics the Verifier will later catch but this crate
//! cannot prevent.

use std::io::BufRead;

use attested_core::Clock;
use serde::Deserialize;
use thiserror::Error;

use crate::{LogWriter, LogWriterError, ObservedEvent};

/// One line of a JSONL feed: `{"role": "...", "agent_id": "...", "content": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedLine {
    pub role: String,
    pub agent_id: String,
    pub content: String,
}

impl ObservedEvent for FeedLine {
    fn role(&self) -> &str {
        &self.role
    }

    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Error)]
pub enum JsonlFeedError {
    #[error("line {line}: malformed JSON: {source}")]
    Malformed { line: usize, source: serde_json::Error },
    #[error("line {line}: {source}")]
    Writer { line: usize, source: LogWriterError },
    #[error("I/O error reading feed: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads `feed` line by line, parsing each non-blank line as a [`FeedLine`]
/// and calling [`LogWriter::observe`] on it in order. Returns every
/// resulting `Message` digest-linked sequence, or the first error
/// encountered (a malformed line or a writer failure stops the feed —
/// there is no partial-line recovery).
pub struct JsonlFeedAdapter<'a> {
    writer: &'a LogWriter,
    clock: &'a dyn Clock,
}

impl<'a> JsonlFeedAdapter<'a> {
    pub fn new(writer: &'a LogWriter, clock: &'a dyn Clock) -> Self {
        Self { writer, clock }
    }

    pub fn run(&self, feed: impl BufRead) -> Result<usize, JsonlFeedError> {
        let mut appended = 0;
        for (idx, line) in feed.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: FeedLine = serde_json::from_str(&line)
                .map_err(|source| JsonlFeedError::Malformed { line: idx + 1, source })?;
            self.writer
                .observe(&event, self.clock)
                .map_err(|source| JsonlFeedError::Writer { line: idx + 1, source })?;
            appended += 1;
        }
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attested_core::{FixedClock, Keypair, MemoryStore, Store};
    use std::io::Cursor;
    use std::sync::Arc;

    #[test]
    fn feeds_each_line_in_order() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let writer = LogWriter::new("s1", store.clone());
        writer.register_signer("agent:a", Keypair::from_seed_bytes(&[1; 32]));
        writer.register_signer("agent:b", Keypair::from_seed_bytes(&[2; 32]));
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");
        let adapter = JsonlFeedAdapter::new(&writer, &clock);

        let feed = Cursor::new(
            "{\"role\":\"user\",\"agent_id\":\"agent:a\",\"content\":\"hi\"}\n\
             {\"role\":\"assistant\",\"agent_id\":\"agent:b\",\"content\":\"hello\"}\n",
        );
        let appended = adapter.run(feed).unwrap();
        assert_eq!(appended, 2);

        let chain = store.get_chain("s1").unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].content, "hi");
        assert_eq!(chain[1].content, "hello");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let writer = LogWriter::new("s1", store.clone());
        writer.register_signer("agent:a", Keypair::from_seed_bytes(&[1; 32]));
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");
        let adapter = JsonlFeedAdapter::new(&writer, &clock);

        let feed = Cursor::new("\n{\"role\":\"user\",\"agent_id\":\"agent:a\",\"content\":\"hi\"}\n\n");
        assert_eq!(adapter.run(feed).unwrap(), 1);
    }

    #[test]
    fn malformed_line_stops_the_feed() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let writer = LogWriter::new("s1", store);
        writer.register_signer("agent:a", Keypair::from_seed_bytes(&[1; 32]));
        let clock = FixedClock::new("2024-01-01T00:00:00.000Z");
        let adapter = JsonlFeedAdapter::new(&writer, &clock);

        let feed = Cursor::new("not json\n");
        assert!(matches!(adapter.run(feed), Err(JsonlFeedError::Malformed { line: 1, .. })));
    }
}
