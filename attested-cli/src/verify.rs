//! `attested verify <session_id> [--trust-map <file>]` — exit 0 valid,
//! 1 invalid; prints the `VerificationReport` summary and every finding
//! (verification is total — see `attested_core::verifier`).

use std::path::Path;

use anyhow::{Context, Result};
use attested_core::{verify_chain, Store};
use attested_store::SqliteStore;

use crate::trustmap::load_trust_map;

pub fn run_verify(db_path: &Path, session_id: &str, trust_map_path: &Path) -> Result<u8> {
    let store = SqliteStore::open(db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))?;
    let chain = store
        .get_chain(session_id)
        .with_context(|| format!("failed to read chain for session {session_id:?}"))?;
    let trust_map = load_trust_map(trust_map_path)?;

    let report = verify_chain(&chain, &trust_map);
    println!("{}", report.summary);
    for finding in &report.findings {
        println!("  {finding:?}");
    }

    if report.is_valid {
        tracing::info!(session_id, "verification succeeded");
        Ok(0)
    } else {
        tracing::warn!(session_id, findings = report.findings.len(), "verification failed");
        Ok(1)
    }
}
