//! # Integration Tests
//!
//! End-to-end operation flows through [`crate::harness::ChainHarness`]:
//! sign, pre-process, process, apply, index.
//!
//! ## Test Categories
//!
//! - `credential_flows`: lifecycle of a service from creation to revocation
//! - `wire_flows`: operations that arrive as hinted JSON

pub mod credential_flows;
pub mod wire_flows;
