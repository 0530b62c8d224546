//! `attested messages <session_id> [--limit N] [--oldest-first|--newest-first]`

use std::path::Path;

use anyhow::{Context, Result};
use attested_core::Store;
use attested_store::SqliteStore;

pub fn run_messages(db_path: &Path, session_id: &str, limit: Option<usize>, newest_first: bool) -> Result<u8> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    let mut chain = store
        .get_chain(session_id)
        .with_context(|| format!("failed to read chain for session {session_id:?}"))?;

    if newest_first {
        chain.reverse();
    }
    if let Some(limit) = limit {
        chain.truncate(limit);
    }

    if chain.is_empty() {
        println!("(no messages for session {session_id:?})");
    }
    for message in &chain {
        println!(
            "[{}] seq={} role={} agent={} content={:?}",
            message.timestamp, message.seq, message.role, message.agent_id, message.content
        );
    }

    tracing::info!(session_id, shown = chain.len(), "listed messages");
    Ok(0)
}
