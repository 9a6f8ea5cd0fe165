//! Adapters: concrete implementations behind the ports.
//!
//! - `memory_ledger` - in-memory state reader + account ledger
//! - `keys` - secp256k1 account keys and signing
//! - `digest` - read-side credential indexes

pub mod digest;
pub mod keys;
pub mod memory_ledger;

pub use digest::{CredentialDigest, Indexed, PageRequest};
pub use keys::{AccountKey, AccountKeys, KeyPair};
pub use memory_ledger::InMemoryLedger;
