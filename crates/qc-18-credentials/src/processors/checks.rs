//! Validation helpers shared by the four processors.
//!
//! Every helper reads through the supplied [`LedgerView`] and turns a miss
//! into a [`ReasonError`]. A value of the wrong kind under a credential key
//! is a [`FatalError`](crate::errors::FatalError).

use crate::domain::currency::ContractAccount;
use crate::domain::entities::{Credential, Design};
use crate::domain::state::{StateKey, StateMergeValue};
use crate::domain::value_objects::{Address, CurrencyId, FactHash, ServiceId, Sign};
use crate::errors::{ProcessError, ReasonError, SignError};
use crate::ports::LedgerView;

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Sender must exist and must not be a contract account.
pub(crate) fn check_sender(sender: &Address, view: LedgerView<'_>) -> Result<(), ProcessError> {
    if !view.accounts.account_exists(sender)? {
        return Err(ReasonError::SenderNotFound(*sender).into());
    }
    if view.accounts.contract_account(sender)?.is_some() {
        return Err(ReasonError::SenderIsContractAccount(*sender).into());
    }
    Ok(())
}

pub(crate) fn require_contract(
    contract: &Address,
    view: LedgerView<'_>,
) -> Result<ContractAccount, ProcessError> {
    view.accounts
        .contract_account(contract)?
        .ok_or_else(|| ReasonError::ContractNotFound(*contract).into())
}

/// Sender must be the registered owner of the contract account.
pub(crate) fn authorize(account: &ContractAccount, sender: &Address) -> Result<(), ProcessError> {
    if !account.is_owner(sender) {
        return Err(ReasonError::NotContractOwner {
            contract: account.address,
            sender: *sender,
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// DESIGN
// =============================================================================

pub(crate) fn load_design(
    contract: &Address,
    service: &ServiceId,
    view: LedgerView<'_>,
) -> Result<Option<Design>, ProcessError> {
    let key = StateKey::design(contract, service);
    match view.state.get_state(&key)? {
        Some(value) => Ok(Some(value.into_design(&key)?)),
        None => Ok(None),
    }
}

pub(crate) fn require_design(
    contract: &Address,
    service: &ServiceId,
    view: LedgerView<'_>,
) -> Result<Design, ProcessError> {
    load_design(contract, service, view)?.ok_or_else(|| {
        ReasonError::ServiceNotFound {
            contract: *contract,
            service: service.clone(),
        }
        .into()
    })
}

pub(crate) fn ensure_design_absent(
    contract: &Address,
    service: &ServiceId,
    view: LedgerView<'_>,
) -> Result<(), ProcessError> {
    if load_design(contract, service, view)?.is_some() {
        return Err(ReasonError::ServiceAlreadyExists {
            contract: *contract,
            service: service.clone(),
        }
        .into());
    }
    Ok(())
}

/// Contract exists, design exists, sender owns the contract. In that order.
pub(crate) fn authorized_design(
    sender: &Address,
    contract: &Address,
    service: &ServiceId,
    view: LedgerView<'_>,
) -> Result<Design, ProcessError> {
    let account = require_contract(contract, view)?;
    let design = require_design(contract, service, view)?;
    authorize(&account, sender)?;
    Ok(design)
}

pub(crate) fn require_template(design: &Design, template_id: &str) -> Result<(), ProcessError> {
    if !design.policy().has_template(template_id) {
        return Err(ReasonError::TemplateNotRegistered {
            service: design.service_id().clone(),
            template_id: template_id.to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// CREDENTIAL
// =============================================================================

pub(crate) fn load_credential(
    key: &StateKey,
    view: LedgerView<'_>,
) -> Result<Option<Credential>, ProcessError> {
    match view.state.get_state(key)? {
        Some(value) => Ok(Some(value.into_credential(key)?)),
        None => Ok(None),
    }
}

// =============================================================================
// SIGNS & FEE
// =============================================================================

pub(crate) fn check_signs(
    sender: &Address,
    hash: &FactHash,
    signs: &[Sign],
    view: LedgerView<'_>,
) -> Result<(), ProcessError> {
    if signs.is_empty() {
        return Err(SignError::NoSigns.into());
    }
    view.accounts.check_signs(sender, hash.as_bytes(), signs)?;
    Ok(())
}

/// Evaluates the currency's fee at a zero amount and checks the sender can
/// pay it. Returns the debit merge value.
pub(crate) fn charge_fee(
    sender: &Address,
    currency: &CurrencyId,
    view: LedgerView<'_>,
) -> Result<StateMergeValue, ProcessError> {
    let policy = view
        .accounts
        .currency_policy(currency)?
        .ok_or_else(|| ReasonError::CurrencyNotFound(currency.clone()))?;

    let fee = policy
        .feeer
        .fee(0)
        .map_err(|e| ReasonError::FeeUnavailable {
            currency: currency.clone(),
            reason: e.to_string(),
        })?;

    let balance = view
        .accounts
        .balance(sender, currency)?
        .ok_or_else(|| ReasonError::BalanceNotFound {
            sender: *sender,
            currency: currency.clone(),
        })?;

    if balance < fee {
        return Err(ReasonError::InsufficientBalance {
            required: fee,
            available: balance,
        }
        .into());
    }

    Ok(StateMergeValue::debit(StateKey::balance(sender, currency), fee))
}
