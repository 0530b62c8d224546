//! `attested sessions` — list session ids known to the store.

use std::path::Path;

use anyhow::{Context, Result};
use attested_core::Store;
use attested_store::SqliteStore;

pub fn run_sessions(db_path: &Path) -> Result<u8> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    let sessions = store.list_sessions().context("failed to list sessions")?;

    if sessions.is_empty() {
        println!("(no sessions)");
    }
    for session_id in &sessions {
        println!("{session_id}");
    }

    tracing::info!(count = sessions.len(), "listed sessions");
    Ok(0)
}
