//! # Error Types
//!
//! Operation processing reports failures in three tiers:
//!
//! | Tier | Type | Meaning | Effect |
//! |------|------|---------|--------|
//! | 1 | [`ValidationError`] | Fact/Item failed self-validation | Operation discarded before any state read |
//! | 2 | [`ReasonError`] | Semantically invalid against current state | Operation rejected, block continues |
//! | 3 | [`FatalError`] | Wrong-typed state or corrupted collaborator data | Block processing aborts |
//!
//! [`ProcessError`] wraps all three and is what the processors return.

use crate::domain::value_objects::{Address, Amount, CurrencyId, ServiceId};
use thiserror::Error;

// =============================================================================
// TIER 1: VALIDATION ERRORS
// =============================================================================

/// A fact or item failed its own structural checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An address field holds the zero address.
    #[error("zero address in field {field}")]
    ZeroAddress { field: &'static str },

    /// A string could not be parsed as an address.
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),

    /// A field is shorter or longer than allowed.
    #[error("invalid length of {field}: {actual} not in {min}..={max}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// A field contains characters it may not contain.
    #[error("invalid characters in {field}: {value:?}")]
    InvalidCharacters { field: &'static str, value: String },

    /// A date is not a valid `yyyy-MM-dd` calendar date.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// A template expires on or before its service date.
    #[error("expiration date {expiration} is not after service date {service}")]
    InvalidDateRange { service: String, expiration: String },

    /// Validity window is empty or inverted.
    #[error("valid until <= valid from: {until} <= {from}")]
    InvalidValidityWindow { from: u64, until: u64 },

    /// The credential holder is the issuing contract itself.
    #[error("holder is the issuing contract: {0}")]
    HolderIsContract(Address),

    /// The sender is the contract account it acts upon.
    #[error("sender is the target contract: {0}")]
    SenderIsContract(Address),

    /// The DID string is empty.
    #[error("empty did")]
    EmptyDid,

    /// A batch fact has no items or too many.
    #[error("invalid item count: {count} not in 1..={max}")]
    InvalidItemCount { count: usize, max: usize },

    /// Two items in one fact address the same credential.
    #[error("duplicate item in fact: {0}")]
    DuplicateItem(String),

    /// Items in one fact name different fee currencies.
    #[error("items must share one fee currency: {first} != {other}")]
    MixedCurrencies {
        first: CurrencyId,
        other: CurrencyId,
    },

    /// A design or policy value is internally inconsistent.
    #[error("invalid design: {0}")]
    InvalidDesign(String),
}

// =============================================================================
// TIER 2: REASON ERRORS
// =============================================================================

/// The operation is well-formed but cannot apply to the current state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReasonError {
    /// Sender account does not exist.
    #[error("sender not found: {0}")]
    SenderNotFound(Address),

    /// Sender is a contract account; contract accounts cannot send these operations.
    #[error("contract account cannot send credential operations: {0}")]
    SenderIsContractAccount(Address),

    /// Target contract account does not exist.
    #[error("contract account not found: {0}")]
    ContractNotFound(Address),

    /// Sender is not the registered owner of the contract account.
    #[error("not contract account owner: sender {sender}, contract {contract}")]
    NotContractOwner { contract: Address, sender: Address },

    /// A design already exists at (contract, service).
    #[error("credential service already exists: {contract}-{service}")]
    ServiceAlreadyExists {
        contract: Address,
        service: ServiceId,
    },

    /// No design exists at (contract, service).
    #[error("credential service not found: {contract}-{service}")]
    ServiceNotFound {
        contract: Address,
        service: ServiceId,
    },

    /// The template ID is already registered under the design.
    #[error("template already exists: {service}/{template_id}")]
    TemplateAlreadyExists {
        service: ServiceId,
        template_id: String,
    },

    /// The template ID is not registered under the design.
    #[error("template not registered: {service}/{template_id}")]
    TemplateNotRegistered {
        service: ServiceId,
        template_id: String,
    },

    /// A credential with the same ID already exists for the template.
    #[error("credential already exists: {template_id}/{credential_id}")]
    CredentialAlreadyExists {
        template_id: String,
        credential_id: String,
    },

    /// No credential exists with the given ID.
    #[error("credential not found: {template_id}/{credential_id}")]
    CredentialNotFound {
        template_id: String,
        credential_id: String,
    },

    /// The credential belongs to a different holder.
    #[error("credential {credential_id} is not held by {holder}")]
    HolderMismatch {
        credential_id: String,
        holder: Address,
    },

    /// The credential was revoked earlier.
    #[error("credential already revoked: {template_id}/{credential_id}")]
    AlreadyRevoked {
        template_id: String,
        credential_id: String,
    },

    /// Fee currency is not registered.
    #[error("currency not found: {0}")]
    CurrencyNotFound(CurrencyId),

    /// The currency's fee policy could not produce a fee.
    #[error("failed to check fee of currency {currency}: {reason}")]
    FeeUnavailable { currency: CurrencyId, reason: String },

    /// Sender holds no balance in the fee currency.
    #[error("sender balance not found: {sender} in {currency}")]
    BalanceNotFound {
        sender: Address,
        currency: CurrencyId,
    },

    /// Sender balance does not cover the fee.
    #[error("not enough balance of sender: required {required}, available {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    /// Signatures do not satisfy the sender's registered keys.
    #[error("invalid signing: {0}")]
    InvalidSigning(#[from] SignError),

    /// A state read failed; reads are never retried.
    #[error("state unavailable: {0}")]
    StateUnavailable(String),
}

// =============================================================================
// TIER 3: FATAL ERRORS
// =============================================================================

/// An internal inconsistency that must abort processing of the whole block.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// The state store returned a value of the wrong kind for a key.
    #[error("unexpected state value at {key}: expected {expected}, found {found}")]
    UnexpectedStateValue {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A collaborator returned data that cannot be trusted.
    #[error("corrupted state: {0}")]
    CorruptedState(String),

    /// A bookkeeping counter would overflow.
    #[error("counter overflow: {0}")]
    CounterOverflow(&'static str),
}

// =============================================================================
// PROCESS ERROR
// =============================================================================

/// Result error of [`crate::ports::FactProcessor`] phases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Tier 1: malformed operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(#[from] ValidationError),

    /// Tier 2: rejected against current state.
    #[error("operation rejected: {0}")]
    Rejected(#[from] ReasonError),

    /// Tier 3: block processing must stop.
    #[error("fatal: {0}")]
    Fatal(#[from] FatalError),
}

impl ProcessError {
    /// Returns true if the whole block must abort.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// Returns true if only this operation is discarded.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !self.is_fatal()
    }

    /// The reason error, if this is a tier 2 rejection.
    #[must_use]
    pub fn reason(&self) -> Option<&ReasonError> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<StateError> for ProcessError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::Unavailable(msg) => Self::Rejected(ReasonError::StateUnavailable(msg)),
            StateError::Corrupted(msg) => Self::Fatal(FatalError::CorruptedState(msg)),
        }
    }
}

impl From<SignError> for ProcessError {
    fn from(err: SignError) -> Self {
        Self::Rejected(ReasonError::InvalidSigning(err))
    }
}

// =============================================================================
// PORT ERRORS
// =============================================================================

/// Errors from the state reader and account ledger ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The read could not be served.
    #[error("state read failed: {0}")]
    Unavailable(String),

    /// The store holds data it cannot decode.
    #[error("state corruption detected: {0}")]
    Corrupted(String),
}

/// Signature check failures reported by the account subsystem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The operation carries no signatures.
    #[error("no signs")]
    NoSigns,

    /// The sender has no registered keys.
    #[error("account keys not found: {0}")]
    KeysNotFound(Address),

    /// A sign was made by a key the sender has not registered.
    #[error("unknown signer key: {0}")]
    UnknownSigner(String),

    /// A signature does not verify against its signer key.
    #[error("signature verification failed for key {0}")]
    VerificationFailed(String),

    /// Valid signatures do not reach the account threshold.
    #[error("not enough signs: weight {weight} < threshold {threshold}")]
    ThresholdNotMet { weight: u32, threshold: u32 },

    /// A local key failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Failures while parsing a state key back into its components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key prefix names no known entity kind.
    #[error("unknown state key prefix: {0:?}")]
    UnknownPrefix(String),

    /// The key has the wrong number of segments for its kind.
    #[error("malformed state key {key:?}: expected {expected} segments, found {found}")]
    SegmentCount {
        key: String,
        expected: usize,
        found: usize,
    },

    /// A segment does not parse as its component type.
    #[error("malformed state key {key:?}: {reason}")]
    Segment { key: String, reason: String },
}

/// Failures while computing a fee from a currency policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeeError {
    /// Ratio fee computation overflowed.
    #[error("fee overflow for amount {0}")]
    Overflow(Amount),

    /// Ratio fee policy has `min > max`.
    #[error("invalid fee bounds: min {min} > max {max}")]
    InvalidBounds { min: Amount, max: Amount },
}

/// Failures while encoding or decoding wire facts and operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload has no `_hint` type tag.
    #[error("missing _hint type tag")]
    MissingHint,

    /// No decoder is registered for the hint.
    #[error("unknown hint: {0}")]
    UnknownHint(String),

    /// A decoder is already registered for the hint.
    #[error("hint already registered: {0}")]
    DuplicateHint(String),

    /// The hint string is not `<name>-v<major>.<minor>.<patch>`.
    #[error("malformed hint: {0:?}")]
    MalformedHint(String),

    /// The encoded hash does not match the decoded fact.
    #[error("fact hash mismatch: encoded {encoded}, computed {computed}")]
    HashMismatch { encoded: String, computed: String },

    /// A required field is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field is present with the wrong JSON type.
    #[error("invalid field {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while committing merge values to the in-memory ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// A debit targets a balance that does not exist.
    #[error("balance not found at {0}")]
    BalanceNotFound(String),

    /// A debit would drive a balance negative.
    #[error("balance underflow at {key}: {balance} < {amount}")]
    Underflow {
        key: String,
        balance: Amount,
        amount: Amount,
    },

    /// A key could not be parsed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Failures while the read-side digest ingests applied merge values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// A key could not be parsed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The value kind does not match the key kind.
    #[error(transparent)]
    Mismatch(#[from] FatalError),

    /// Blocks must be ingested in height order.
    #[error("stale height {got}, last ingested {last}")]
    StaleHeight { last: u64, got: u64 },
}

// =============================================================================
// TESTS
// =============================================================================
