//! # QC-18 Credentials - Verifiable Credential Operations Subsystem
//!
//! **Subsystem ID:** 18
//!
//! ## Purpose
//!
//! Turns signed credential operations into deterministic state deltas. Four
//! operation kinds are supported: create a credential service (design), add
//! a template to it, assign credentials to holders, and revoke them. Every
//! node replaying the ledger must derive the same deltas, so processing is
//! synchronous, reads only the supplied snapshot and never consults a clock.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One design per (contract, service) | `processors/checks.rs` - `ensure_design_absent()` |
//! | Template IDs unique, insertion-ordered | `domain/entities.rs` - `Policy::add_template()` |
//! | Template registered before any credential using it | `processors/checks.rs` - `require_template()` |
//! | `valid_until > valid_from` | `domain/facts.rs` - `AssignCredentialsItem::is_valid()` |
//! | (contract, service, template, credential ID) unique | `processors/assign.rs` - `issue()` |
//! | Holder never equals the issuing contract | `domain/facts.rs` - `AssignCredentialsItem::is_valid()` |
//! | A batch applies completely or not at all | `processors/assign.rs`, `processors/revoke.rs` |
//! | Fee never drives a balance negative | `processors/checks.rs` - `charge_fee()` |
//! | Revocation is a status change, never a deletion | `domain/entities.rs` - `Credential::revoke()` |
//!
//! ## State Machine
//!
//! ```text
//! UNINITIALIZED --CreateCredentialService--> DESIGN_ACTIVE
//! DESIGN_ACTIVE --AddTemplate--------------> DESIGN_ACTIVE (template set grows)
//! DESIGN_ACTIVE --Assign(valid template)---> DESIGN_ACTIVE (credential issued)
//! DESIGN_ACTIVE --Revoke(live credential)--> DESIGN_ACTIVE (credential revoked)
//! ```
//!
//! ## Error Tiers
//!
//! | Tier | Type | Effect |
//! |------|------|--------|
//! | 1 | `ValidationError` | Operation discarded before any state read |
//! | 2 | `ReasonError` | Operation rejected, block continues |
//! | 3 | `FatalError` | Block processing aborts |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |-----------|-------|---------|
//! | State store | `StateReader` | Read designs, templates, credentials |
//! | Account subsystem | `AccountLedger` | Accounts, contract owners, fees, balances, signs |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_credentials::prelude::*;
//!
//! let processors = CredentialProcessors::new(config.processing);
//! let view = LedgerView::over(height, &ledger);
//!
//! match processors.execute(&operation, view) {
//!     Ok(values) => ledger.apply(&values)?,
//!     Err(err) if err.is_fatal() => return Err(err.into()),
//!     Err(_) => {} // rejected; continue with the next operation
//! }
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod processors;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::currency::{ContractAccount, CurrencyPolicy, Feeer};
    pub use crate::domain::entities::{
        Credential, CredentialStatus, Design, Holder, HolderDid, Policy, Template,
        TemplateMetadata,
    };
    pub use crate::domain::facts::{
        AddTemplateFact, AssignCredentialsFact, AssignCredentialsItem,
        CreateCredentialServiceFact, OperationFact, RevokeCredentialsFact, RevokeCredentialsItem,
    };
    pub use crate::domain::limits;
    pub use crate::domain::operation::{Fact, Operation, OperationKind};
    pub use crate::domain::state::{KeyPath, MergeOp, StateKey, StateMergeValue, StateValue};
    pub use crate::domain::value_objects::{
        Address, Amount, CurrencyId, Date, FactHash, Height, ServiceId, Sign,
    };

    // Ports
    pub use crate::ports::{
        AccountLedger, FactProcessor, LedgerView, OperationProcessorApi, StateReader,
    };

    // Processors
    pub use crate::processors::{
        AddTemplateProcessor, AssignProcessor, CreateCredentialServiceProcessor,
        CredentialProcessors, ProcessingStats, RevokeProcessor,
    };

    // Codec & config
    pub use crate::codec::{encode_fact, encode_operation, Hint, HintRegistry};
    pub use crate::config::{ConfigError, CredentialConfig, DigestConfig, ProcessingConfig};

    // Errors
    pub use crate::errors::{
        ApplyError, CodecError, DigestError, FatalError, ProcessError, ReasonError, SignError,
        StateError, ValidationError,
    };

    // Adapters
    pub use crate::adapters::{
        AccountKey, AccountKeys, CredentialDigest, InMemoryLedger, Indexed, KeyPair, PageRequest,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 18;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Credentials";

// =============================================================================
// TESTS
// =============================================================================
