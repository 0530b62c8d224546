//! Canonicalization, keys, hash-chain and offline verifier for
//! tamper-evident agent-conversation logs.
//!
//! This crate is the load-bearing core described in the design: a bug in
//! canonicalization, domain separation, or chain linkage silently destroys
//! every integrity guarantee built on top of it. It stays dependency-light
//! on purpose and never performs I/O or logging — see [`store`] for the
//! trait boundary the host implements, and [`clock`] for the clock-reading
//! boundary.

pub mod canonical;
pub mod clock;
pub mod keys;
pub mod message;
pub mod session;
pub mod store;
pub mod verifier;

pub use canonical::{canonicalize, canonical_json, CanonicalizationError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use keys::{decode_public_key, Keypair, SigningError};
pub use message::{Message, SignableView, DOMAIN_PREFIX, ZERO_HASH};
pub use session::{AppendError, Session};
pub use store::{MemoryStore, Store, StoreError};
pub use verifier::{verify_chain, Finding, TrustedKeyMap, VerificationReport};
