//! # State Key Schema & Merge Values
//!
//! Keys are derived deterministically from identifiers:
//!
//! ```text
//! design:{contract}:{service}
//! template:{contract}:{service}:{template_id}
//! credential:{contract}:{service}:{template_id}:{credential_id}
//! holderdid:{contract}:{service}:{holder}
//! balance:{account}:{currency}            (owned by the account subsystem)
//! ```
//!
//! No identifier may contain `:`, so every key splits back into exactly its
//! components and keys of different kinds never collide. The read-side digest
//! relies on [`KeyPath::parse`] to route applied values.

use crate::domain::entities::{Credential, Design, HolderDid, Template};
use crate::domain::value_objects::{Address, Amount, CurrencyId, ServiceId};
use crate::errors::{FatalError, KeyError};
use serde::{Deserialize, Serialize};
use std::fmt;

const DESIGN_PREFIX: &str = "design";
const TEMPLATE_PREFIX: &str = "template";
const CREDENTIAL_PREFIX: &str = "credential";
const HOLDER_DID_PREFIX: &str = "holderdid";
const BALANCE_PREFIX: &str = "balance";
const SEPARATOR: char = ':';

// =============================================================================
// STATE KEY
// =============================================================================

/// A derived state key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    pub fn design(contract: &Address, service: &ServiceId) -> Self {
        Self(format!("{DESIGN_PREFIX}:{contract}:{service}"))
    }

    pub fn template(contract: &Address, service: &ServiceId, template_id: &str) -> Self {
        Self(format!("{TEMPLATE_PREFIX}:{contract}:{service}:{template_id}"))
    }

    pub fn credential(
        contract: &Address,
        service: &ServiceId,
        template_id: &str,
        credential_id: &str,
    ) -> Self {
        Self(format!(
            "{CREDENTIAL_PREFIX}:{contract}:{service}:{template_id}:{credential_id}"
        ))
    }

    pub fn holder_did(contract: &Address, service: &ServiceId, holder: &Address) -> Self {
        Self(format!("{HOLDER_DID_PREFIX}:{contract}:{service}:{holder}"))
    }

    pub fn balance(account: &Address, currency: &CurrencyId) -> Self {
        Self(format!("{BALANCE_PREFIX}:{account}:{currency}"))
    }

    /// Wraps a raw key string, e.g. one read back from a store.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_design(&self) -> bool {
        self.has_prefix(DESIGN_PREFIX)
    }

    pub fn is_template(&self) -> bool {
        self.has_prefix(TEMPLATE_PREFIX)
    }

    pub fn is_credential(&self) -> bool {
        self.has_prefix(CREDENTIAL_PREFIX)
    }

    pub fn is_holder_did(&self) -> bool {
        self.has_prefix(HOLDER_DID_PREFIX)
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.0
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// Splits the key back into its components.
    pub fn parse(&self) -> Result<KeyPath, KeyError> {
        KeyPath::parse(&self.0)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// KEY PATH (parsed key)
// =============================================================================

/// The components a [`StateKey`] was derived from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPath {
    Design {
        contract: Address,
        service: ServiceId,
    },
    Template {
        contract: Address,
        service: ServiceId,
        template_id: String,
    },
    Credential {
        contract: Address,
        service: ServiceId,
        template_id: String,
        credential_id: String,
    },
    HolderDid {
        contract: Address,
        service: ServiceId,
        holder: Address,
    },
    Balance {
        account: Address,
        currency: CurrencyId,
    },
}

impl KeyPath {
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        let segments: Vec<&str> = key.split(SEPARATOR).collect();
        let expect = |expected: usize| {
            if segments.len() == expected {
                Ok(())
            } else {
                Err(KeyError::SegmentCount {
                    key: key.to_string(),
                    expected,
                    found: segments.len(),
                })
            }
        };
        let address = |segment: &str| {
            segment.parse::<Address>().map_err(|e| KeyError::Segment {
                key: key.to_string(),
                reason: e.to_string(),
            })
        };
        let text = |segment: &str| {
            if segment.is_empty() {
                Err(KeyError::Segment {
                    key: key.to_string(),
                    reason: "empty segment".to_string(),
                })
            } else {
                Ok(segment.to_string())
            }
        };

        match segments[0] {
            DESIGN_PREFIX => {
                expect(3)?;
                Ok(Self::Design {
                    contract: address(segments[1])?,
                    service: ServiceId::new(text(segments[2])?),
                })
            }
            TEMPLATE_PREFIX => {
                expect(4)?;
                Ok(Self::Template {
                    contract: address(segments[1])?,
                    service: ServiceId::new(text(segments[2])?),
                    template_id: text(segments[3])?,
                })
            }
            CREDENTIAL_PREFIX => {
                expect(5)?;
                Ok(Self::Credential {
                    contract: address(segments[1])?,
                    service: ServiceId::new(text(segments[2])?),
                    template_id: text(segments[3])?,
                    credential_id: text(segments[4])?,
                })
            }
            HOLDER_DID_PREFIX => {
                expect(4)?;
                Ok(Self::HolderDid {
                    contract: address(segments[1])?,
                    service: ServiceId::new(text(segments[2])?),
                    holder: address(segments[3])?,
                })
            }
            BALANCE_PREFIX => {
                expect(3)?;
                Ok(Self::Balance {
                    account: address(segments[1])?,
                    currency: CurrencyId::new(text(segments[2])?),
                })
            }
            other => Err(KeyError::UnknownPrefix(other.to_string())),
        }
    }

    /// Re-derives the key.
    pub fn to_key(&self) -> StateKey {
        match self {
            Self::Design { contract, service } => StateKey::design(contract, service),
            Self::Template {
                contract,
                service,
                template_id,
            } => StateKey::template(contract, service, template_id),
            Self::Credential {
                contract,
                service,
                template_id,
                credential_id,
            } => StateKey::credential(contract, service, template_id, credential_id),
            Self::HolderDid {
                contract,
                service,
                holder,
            } => StateKey::holder_did(contract, service, holder),
            Self::Balance { account, currency } => StateKey::balance(account, currency),
        }
    }
}

// =============================================================================
// STATE VALUE
// =============================================================================

/// A value stored under a credential state key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    Design(Design),
    Template(Template),
    Credential(Credential),
    HolderDid(HolderDid),
}

impl StateValue {
    /// Entity kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Design(_) => "design",
            Self::Template(_) => "template",
            Self::Credential(_) => "credential",
            Self::HolderDid(_) => "holder_did",
        }
    }

    pub fn into_design(self, key: &StateKey) -> Result<Design, FatalError> {
        match self {
            Self::Design(design) => Ok(design),
            other => Err(unexpected(key, "design", &other)),
        }
    }

    pub fn into_template(self, key: &StateKey) -> Result<Template, FatalError> {
        match self {
            Self::Template(template) => Ok(template),
            other => Err(unexpected(key, "template", &other)),
        }
    }

    pub fn into_credential(self, key: &StateKey) -> Result<Credential, FatalError> {
        match self {
            Self::Credential(credential) => Ok(credential),
            other => Err(unexpected(key, "credential", &other)),
        }
    }

    pub fn into_holder_did(self, key: &StateKey) -> Result<HolderDid, FatalError> {
        match self {
            Self::HolderDid(holder_did) => Ok(holder_did),
            other => Err(unexpected(key, "holder_did", &other)),
        }
    }
}

fn unexpected(key: &StateKey, expected: &'static str, found: &StateValue) -> FatalError {
    FatalError::UnexpectedStateValue {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

// =============================================================================
// MERGE VALUES
// =============================================================================

/// How the apply layer merges a value into the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOp {
    /// Replace whatever is stored with this value.
    Set(StateValue),
    /// Subtract `amount` from the balance stored at the key. Processors only
    /// emit debits they have checked against the current balance.
    Debit(Amount),
}

/// One state delta produced by `process`. Processors return these as an
/// ordered list which the apply layer commits atomically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMergeValue {
    pub key: StateKey,
    pub op: MergeOp,
}

impl StateMergeValue {
    pub fn set(key: StateKey, value: StateValue) -> Self {
        Self {
            key,
            op: MergeOp::Set(value),
        }
    }

    pub fn debit(key: StateKey, amount: Amount) -> Self {
        Self {
            key,
            op: MergeOp::Debit(amount),
        }
    }

    /// The value being set, if this is a `Set`.
    pub fn value(&self) -> Option<&StateValue> {
        match &self.op {
            MergeOp::Set(value) => Some(value),
            MergeOp::Debit(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
