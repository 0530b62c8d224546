//! Trust-map file format (ambient addition — spec.md treats the map as an
//! abstract verifier input; something has to produce it for the CLI to be
//! usable at all). A small JSON object `{ "agent_id": "public_key_b64url" }`.
//! Malformed entries are a usage error (exit 2), never a verification
//! finding — they're rejected before the Verifier ever sees the chain.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use attested_core::{decode_public_key, TrustedKeyMap};

pub fn load_trust_map(path: &Path) -> Result<TrustedKeyMap> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trust-map file: {}", path.display()))?;
    let entries: HashMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("trust-map file is not a JSON object of agent_id -> public_key: {}", path.display()))?;

    let mut map = TrustedKeyMap::new();
    for (agent_id, pk_b64) in entries {
        let pk = decode_public_key(&pk_b64)
            .with_context(|| format!("trust-map entry for {agent_id:?} has a malformed public key"))?;
        map.insert(agent_id, pk);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attested_core::Keypair;
    use std::io::Write;

    #[test]
    fn loads_a_valid_trust_map() {
        let kp = Keypair::from_seed_bytes(&[1; 32]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"agent:a": "{}"}}"#, kp.public_key_b64url()).unwrap();

        let map = load_trust_map(file.path()).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("agent:a"));
    }

    #[test]
    fn rejects_malformed_public_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"agent:a": "not-valid-b64!!"}}"#).unwrap();
        assert!(load_trust_map(file.path()).is_err());
    }

    #[test]
    fn rejects_non_object_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1,2,3]").unwrap();
        assert!(load_trust_map(file.path()).is_err());
    }
}
