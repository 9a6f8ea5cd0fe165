//! RevokeCredentials: moves credentials to `Revoked` at the current height.
//! Holder DIDs and design counters are left as they are.

use super::checks;
use crate::domain::entities::Credential;
use crate::domain::facts::{OperationFact, RevokeCredentialsFact, RevokeCredentialsItem};
use crate::domain::limits;
use crate::domain::state::{StateKey, StateMergeValue, StateValue};
use crate::domain::value_objects::Sign;
use crate::errors::{ProcessError, ReasonError, ValidationError};
use crate::ports::{FactProcessor, LedgerView};

/// Processor for [`RevokeCredentialsFact`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RevokeProcessor;

impl RevokeProcessor {
    /// Loads the live credential an item targets. The credential must exist
    /// before ownership is checked.
    fn live_credential(
        &self,
        fact: &RevokeCredentialsFact,
        item: &RevokeCredentialsItem,
        view: LedgerView<'_>,
    ) -> Result<(StateKey, Credential), ProcessError> {
        let account = checks::require_contract(item.contract(), view)?;
        let design = checks::require_design(item.contract(), item.service_id(), view)?;
        checks::require_template(&design, item.template_id())?;

        let key = StateKey::credential(
            item.contract(),
            item.service_id(),
            item.template_id(),
            item.credential_id(),
        );
        let credential = checks::load_credential(&key, view)?.ok_or_else(|| {
            ReasonError::CredentialNotFound {
                template_id: item.template_id().to_string(),
                credential_id: item.credential_id().to_string(),
            }
        })?;
        checks::authorize(&account, fact.sender())?;

        if credential.holder != *item.holder() {
            return Err(ReasonError::HolderMismatch {
                credential_id: item.credential_id().to_string(),
                holder: *item.holder(),
            }
            .into());
        }
        if !credential.is_active() {
            return Err(ReasonError::AlreadyRevoked {
                template_id: item.template_id().to_string(),
                credential_id: item.credential_id().to_string(),
            }
            .into());
        }
        Ok((key, credential))
    }
}

impl FactProcessor<RevokeCredentialsFact> for RevokeProcessor {
    fn pre_process(
        &self,
        fact: &RevokeCredentialsFact,
        signs: &[Sign],
        view: LedgerView<'_>,
    ) -> Result<(), ProcessError> {
        fact.is_valid()?;
        checks::check_sender(fact.sender(), view)?;
        for item in fact.items() {
            self.live_credential(fact, item, view)?;
        }
        checks::check_signs(fact.sender(), &fact.hash(), signs, view)
    }

    fn process(
        &self,
        fact: &RevokeCredentialsFact,
        view: LedgerView<'_>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        fact.is_valid()?;
        checks::check_sender(fact.sender(), view)?;

        let mut values = Vec::with_capacity(fact.items().len() + 1);
        for item in fact.items() {
            let (key, mut credential) = self.live_credential(fact, item, view)?;
            credential.revoke(view.height);
            values.push(StateMergeValue::set(key, StateValue::Credential(credential)));
        }

        let currency = fact.fee_currency().ok_or(ValidationError::InvalidItemCount {
            count: 0,
            max: limits::MAX_ITEMS,
        })?;
        values.push(checks::charge_fee(fact.sender(), currency, view)?);
        Ok(values)
    }
}
