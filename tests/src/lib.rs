//! # Quantum-Chain Credentials Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # In-memory chain: ledger + processors + digest
//! └── integration/      # End-to-end operation flows
//!     ├── credential_flows.rs
//!     └── wire_flows.rs
//! benches/
//! └── credential_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests
//! cargo test -p qc-tests integration::
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

pub mod harness;
pub mod integration;
