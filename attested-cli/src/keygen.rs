//! `attested keygen --agent-id <id> --out <file>` — a thin wrapper around
//! `attested_core::Keypair::generate`, not a new core component. Something
//! has to produce the keys that get curated into a trust-map file, since
//! the TrustedKeyMap has no default (§6.1).

use std::path::Path;

use anyhow::{Context, Result};
use attested_core::Keypair;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// On-disk shape of a generated keypair file. The core never reads or
/// writes files itself; this is purely a CLI/adapter-side concern for
/// keeping an agent's long-term signing key between process runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyFile {
    pub agent_id: String,
    pub public_key: String,
    pub seed_b64: String,
}

pub fn run_keygen(agent_id: &str, out: &Path) -> Result<u8> {
    let keypair = Keypair::generate();
    let key_file = KeyFile {
        agent_id: agent_id.to_string(),
        public_key: keypair.public_key_b64url(),
        seed_b64: URL_SAFE_NO_PAD.encode(keypair.seed_bytes()),
    };

    let json = serde_json::to_string_pretty(&key_file).context("failed to serialize key file")?;
    std::fs::write(out, json).with_context(|| format!("failed to write key file: {}", out.display()))?;

    println!("wrote signing key for {agent_id:?} to {}", out.display());
    println!("trust-map entry: \"{}\": \"{}\"", agent_id, key_file.public_key);

    tracing::info!(agent_id, out = %out.display(), "generated keypair");
    Ok(0)
}

/// Reload a keypair previously written by [`run_keygen`].
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file: {}", path.display()))?;
    let key_file: KeyFile = serde_json::from_str(&raw)
        .with_context(|| format!("key file is malformed: {}", path.display()))?;
    let seed_bytes = URL_SAFE_NO_PAD
        .decode(&key_file.seed_b64)
        .context("key file's seed_b64 is not valid base64url")?;
    let seed: [u8; 32] = seed_bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("key file's seed must decode to exactly 32 bytes"))?;
    Ok(Keypair::from_seed_bytes(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_then_load_reproduces_same_public_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent-a.json");
        run_keygen("agent:a", &path).unwrap();

        let loaded = load_keypair(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let key_file: KeyFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded.public_key_b64url(), key_file.public_key);
    }
}
