//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the credential subsystem depends on. Adapters implement them:
//! - State reads (the node's state store)
//! - Account, currency and signature checks (the account subsystem)
//!
//! Both are read-only. Processors never write; they return merge values and
//! the apply layer commits them.

use crate::domain::currency::{ContractAccount, CurrencyPolicy};
use crate::domain::state::{StateKey, StateValue};
use crate::domain::value_objects::{Address, Amount, CurrencyId, Height, Sign};
use crate::errors::{SignError, StateError};

// =============================================================================
// STATE READER
// =============================================================================

/// Read access to credential state.
///
/// Implementations must return a consistent snapshot for the duration of one
/// operation. A read failure is reported once and never retried.
pub trait StateReader: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Some(StateValue)` - If a value exists
    /// * `None` - If nothing was ever written
    fn get_state(&self, key: &StateKey) -> Result<Option<StateValue>, StateError>;
}

// =============================================================================
// ACCOUNT LEDGER
// =============================================================================

/// Account and currency queries served by the account subsystem.
pub trait AccountLedger: Send + Sync {
    /// Returns true if a regular or contract account exists at `address`.
    fn account_exists(&self, address: &Address) -> Result<bool, StateError>;

    /// Get the contract account at `address`, if `address` is a contract.
    fn contract_account(&self, address: &Address) -> Result<Option<ContractAccount>, StateError>;

    /// Get the registered policy of `currency`.
    fn currency_policy(&self, currency: &CurrencyId) -> Result<Option<CurrencyPolicy>, StateError>;

    /// Get the balance of `account` in `currency`.
    fn balance(&self, account: &Address, currency: &CurrencyId)
        -> Result<Option<Amount>, StateError>;

    /// Verify `signs` over `message` against the keys registered for `sender`.
    fn check_signs(&self, sender: &Address, message: &[u8], signs: &[Sign])
        -> Result<(), SignError>;
}

// =============================================================================
// LEDGER VIEW
// =============================================================================

/// Everything a processor may read while handling one operation.
#[derive(Clone, Copy)]
pub struct LedgerView<'a> {
    /// Height of the block being processed. Revocations record it.
    pub height: Height,
    pub state: &'a dyn StateReader,
    pub accounts: &'a dyn AccountLedger,
}

impl<'a> LedgerView<'a> {
    pub fn new(height: Height, state: &'a dyn StateReader, accounts: &'a dyn AccountLedger) -> Self {
        Self {
            height,
            state,
            accounts,
        }
    }

    /// Builds a view over one adapter that serves both ports.
    pub fn over<L>(height: Height, ledger: &'a L) -> Self
    where
        L: StateReader + AccountLedger,
    {
        Self::new(height, ledger, ledger)
    }
}

impl std::fmt::Debug for LedgerView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerView")
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
