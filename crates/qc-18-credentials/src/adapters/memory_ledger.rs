//! # In-Memory Ledger
//!
//! A [`StateReader`] + [`AccountLedger`] over plain maps, with an `apply`
//! step that commits merge values the way the host's apply layer would:
//! all or nothing.
//!
//! Used for testing and for embedding the processors without a node.

use crate::adapters::keys::AccountKeys;
use crate::domain::currency::{ContractAccount, CurrencyPolicy};
use crate::domain::state::{KeyPath, MergeOp, StateKey, StateMergeValue, StateValue};
use crate::domain::value_objects::{Address, Amount, CurrencyId, Sign};
use crate::errors::{ApplyError, SignError, StateError};
use crate::ports::{AccountLedger, StateReader};
use std::collections::BTreeMap;

/// In-memory state and account store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    state: BTreeMap<StateKey, StateValue>,
    /// Account -> registered keys. Contract accounts have none.
    accounts: BTreeMap<Address, Option<AccountKeys>>,
    contracts: BTreeMap<Address, ContractAccount>,
    currencies: BTreeMap<CurrencyId, CurrencyPolicy>,
    balances: BTreeMap<StateKey, Amount>,
    read_failure: Option<StateError>,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_account(&mut self, address: Address, keys: Option<AccountKeys>) -> &mut Self {
        self.accounts.insert(address, keys);
        self
    }

    pub fn register_contract(&mut self, address: Address, owner: Address) -> &mut Self {
        self.accounts.insert(address, None);
        self.contracts
            .insert(address, ContractAccount::new(address, owner));
        self
    }

    pub fn register_currency(&mut self, policy: CurrencyPolicy) -> &mut Self {
        self.currencies.insert(policy.currency.clone(), policy);
        self
    }

    pub fn set_balance(&mut self, account: Address, currency: CurrencyId, amount: Amount) -> &mut Self {
        self.balances
            .insert(StateKey::balance(&account, &currency), amount);
        self
    }

    /// Writes a value directly, bypassing the processors.
    pub fn put_state(&mut self, key: StateKey, value: StateValue) -> &mut Self {
        self.state.insert(key, value);
        self
    }

    /// Makes every subsequent state read fail with `err`.
    pub fn fail_reads(&mut self, err: StateError) -> &mut Self {
        self.read_failure = Some(err);
        self
    }

    pub fn get(&self, key: &StateKey) -> Option<&StateValue> {
        self.state.get(key)
    }

    pub fn balance_of(&self, account: &Address, currency: &CurrencyId) -> Option<Amount> {
        self.balances
            .get(&StateKey::balance(account, currency))
            .copied()
    }

    /// Number of state entries of every kind: designs, templates,
    /// credentials and holder DIDs. Balances are not counted.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Commits merge values in order. Nothing is written unless every value
    /// applies.
    pub fn apply(&mut self, values: &[StateMergeValue]) -> Result<(), ApplyError> {
        let mut staged_state = Vec::new();
        let mut staged_balances: BTreeMap<&StateKey, Amount> = BTreeMap::new();

        for value in values {
            let path = value.key.parse()?;
            match &value.op {
                MergeOp::Set(state_value) => staged_state.push((value.key.clone(), state_value.clone())),
                MergeOp::Debit(amount) => {
                    if !matches!(path, KeyPath::Balance { .. }) {
                        return Err(ApplyError::BalanceNotFound(value.key.to_string()));
                    }
                    let current = staged_balances
                        .get(&value.key)
                        .or_else(|| self.balances.get(&value.key))
                        .copied()
                        .ok_or_else(|| ApplyError::BalanceNotFound(value.key.to_string()))?;
                    let next = current.checked_sub(*amount).ok_or_else(|| ApplyError::Underflow {
                        key: value.key.to_string(),
                        balance: current,
                        amount: *amount,
                    })?;
                    staged_balances.insert(&value.key, next);
                }
            }
        }

        for (key, amount) in staged_balances {
            self.balances.insert(key.clone(), amount);
        }
        self.state.extend(staged_state);
        Ok(())
    }
}

impl StateReader for InMemoryLedger {
    fn get_state(&self, key: &StateKey) -> Result<Option<StateValue>, StateError> {
        if let Some(err) = &self.read_failure {
            return Err(err.clone());
        }
        Ok(self.state.get(key).cloned())
    }
}

impl AccountLedger for InMemoryLedger {
    fn account_exists(&self, address: &Address) -> Result<bool, StateError> {
        Ok(self.accounts.contains_key(address))
    }

    fn contract_account(&self, address: &Address) -> Result<Option<ContractAccount>, StateError> {
        Ok(self.contracts.get(address).cloned())
    }

    fn currency_policy(&self, currency: &CurrencyId) -> Result<Option<CurrencyPolicy>, StateError> {
        Ok(self.currencies.get(currency).cloned())
    }

    fn balance(&self, account: &Address, currency: &CurrencyId) -> Result<Option<Amount>, StateError> {
        Ok(self.balance_of(account, currency))
    }

    fn check_signs(&self, sender: &Address, message: &[u8], signs: &[Sign]) -> Result<(), SignError> {
        match self.accounts.get(sender) {
            Some(Some(keys)) => keys.verify(message, signs),
            _ => Err(SignError::KeysNotFound(*sender)),
        }
    }
}
