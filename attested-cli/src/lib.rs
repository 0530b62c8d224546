//! `attested-cli` — the CLI surface described in the core's charter: list,
//! show, verify, and export a tamper-evident session log, plus a `keygen`
//! convenience so a user has somewhere to get the keys that go into a
//! trust-map file.
//!
//! ## Subcommands
//!
//! - `attested sessions` — list session ids known to the store.
//! - `attested messages <session_id>` — show a session's messages.
//! - `attested verify <session_id>` — offline integrity/authenticity check.
//! - `attested export <session_id>` — JSONL dump for out-of-band transfer.
//! - `attested keygen` — generate an Ed25519 keypair file.
//!
//! Exit codes: `0` success, `1` verification failed, `2` usage error
//! (handled by `clap` itself), `3` I/O error.

pub mod export;
pub mod keygen;
pub mod messages;
pub mod sessions;
pub mod trustmap;
pub mod verify;
