//! `attested export <session_id> --output <file>` — JSONL dump, one
//! message per line, all ten fields including `signature`, in whatever JSON
//! key order `serde_json` happens to produce. Import is round-trip safe
//! regardless: a consumer re-canonicalizes the signable view before
//! verifying, never trusting the wire JSON's own formatting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use attested_core::Store;
use attested_store::SqliteStore;

pub fn run_export(db_path: &Path, session_id: &str, output: &Path) -> Result<u8> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    let chain = store
        .get_chain(session_id)
        .with_context(|| format!("failed to read chain for session {session_id:?}"))?;

    let file = File::create(output)
        .with_context(|| format!("failed to create export file: {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for message in &chain {
        let line = serde_json::to_string(message).context("failed to serialize message")?;
        writeln!(writer, "{line}").context("failed to write export line")?;
    }
    writer.flush().context("failed to flush export file")?;

    tracing::info!(session_id, count = chain.len(), output = %output.display(), "exported chain");
    println!("exported {} message(s) to {}", chain.len(), output.display());
    Ok(0)
}
