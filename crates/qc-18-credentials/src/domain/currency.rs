//! # Account & Currency Interface Types
//!
//! Values returned by the account/currency subsystem through
//! [`crate::ports::AccountLedger`]. This subsystem only reads them.

use crate::domain::value_objects::{Address, Amount, CurrencyId};
use crate::errors::FeeError;
use serde::{Deserialize, Serialize};

/// Ratio fees are expressed in basis points.
pub const RATIO_DENOMINATOR: Amount = 10_000;

/// A contract account and its registered owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAccount {
    pub address: Address,
    pub owner: Address,
}

impl ContractAccount {
    pub fn new(address: Address, owner: Address) -> Self {
        Self { address, owner }
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.owner == *account
    }
}

/// Fee rule of a currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feeer {
    /// No fee.
    Nil,
    /// A flat fee regardless of amount.
    Fixed { receiver: Address, amount: Amount },
    /// `amount * ratio_bps / 10_000`, clamped to `min..=max`.
    Ratio {
        receiver: Address,
        ratio_bps: u32,
        min: Amount,
        max: Amount,
    },
}

impl Feeer {
    /// Fee charged for moving `amount`. Credential operations move nothing
    /// and are charged `fee(0)`.
    pub fn fee(&self, amount: Amount) -> Result<Amount, FeeError> {
        match self {
            Self::Nil => Ok(0),
            Self::Fixed { amount: fee, .. } => Ok(*fee),
            Self::Ratio {
                ratio_bps,
                min,
                max,
                ..
            } => {
                if min > max {
                    return Err(FeeError::InvalidBounds {
                        min: *min,
                        max: *max,
                    });
                }
                let raw = amount
                    .checked_mul(Amount::from(*ratio_bps))
                    .ok_or(FeeError::Overflow(amount))?
                    / RATIO_DENOMINATOR;
                Ok(raw.clamp(*min, *max))
            }
        }
    }

    pub fn receiver(&self) -> Option<&Address> {
        match self {
            Self::Nil => None,
            Self::Fixed { receiver, .. } | Self::Ratio { receiver, .. } => Some(receiver),
        }
    }
}

/// Registered policy of a currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPolicy {
    pub currency: CurrencyId,
    pub min_balance: Amount,
    pub feeer: Feeer,
}

impl CurrencyPolicy {
    pub fn new(currency: CurrencyId, min_balance: Amount, feeer: Feeer) -> Self {
        Self {
            currency,
            min_balance,
            feeer,
        }
    }
}
