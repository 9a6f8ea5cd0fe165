//! AssignCredentials: issues a batch of credentials.
//!
//! Every item is checked before anything is emitted. Output order is fixed:
//! credentials in item order, then holder DIDs (one per holder, last item
//! wins), then the touched designs in first-seen order, then one fee debit.

use super::checks;
use crate::domain::entities::{Credential, CredentialStatus, Design, HolderDid};
use crate::domain::facts::{AssignCredentialsFact, AssignCredentialsItem, OperationFact};
use crate::domain::limits;
use crate::domain::state::{StateKey, StateMergeValue, StateValue};
use crate::domain::value_objects::{Address, Sign};
use crate::errors::{ProcessError, ReasonError, ValidationError};
use crate::ports::{FactProcessor, LedgerView};

/// Processor for [`AssignCredentialsFact`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AssignProcessor;

/// Designs read once per batch and updated in place as items are issued.
#[derive(Default)]
struct WorkingDesigns(Vec<(StateKey, Design)>);

impl WorkingDesigns {
    fn get_or_load(
        &mut self,
        sender: &Address,
        item: &AssignCredentialsItem,
        view: LedgerView<'_>,
    ) -> Result<&mut Design, ProcessError> {
        let key = StateKey::design(item.contract(), item.service_id());
        let index = match self.0.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                let design =
                    checks::authorized_design(sender, item.contract(), item.service_id(), view)?;
                self.0.push((key, design));
                self.0.len() - 1
            }
        };
        Ok(&mut self.0[index].1)
    }
}

impl AssignProcessor {
    fn issue(
        &self,
        fact: &AssignCredentialsFact,
        view: LedgerView<'_>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let sender = fact.sender();
        let mut designs = WorkingDesigns::default();
        let mut credentials = Vec::with_capacity(fact.items().len());
        let mut holder_dids: Vec<(StateKey, HolderDid)> = Vec::new();

        for item in fact.items() {
            let design = designs.get_or_load(sender, item, view)?;
            checks::require_template(design, item.template_id())?;

            let key = StateKey::credential(
                item.contract(),
                item.service_id(),
                item.template_id(),
                item.credential_id(),
            );
            if checks::load_credential(&key, view)?.is_some() {
                return Err(ReasonError::CredentialAlreadyExists {
                    template_id: item.template_id().to_string(),
                    credential_id: item.credential_id().to_string(),
                }
                .into());
            }

            design.policy_mut().record_issuance(*item.holder())?;

            credentials.push(StateMergeValue::set(
                key,
                StateValue::Credential(Credential {
                    holder: *item.holder(),
                    template_id: item.template_id().to_string(),
                    credential_id: item.credential_id().to_string(),
                    value: item.value().to_string(),
                    valid_from: item.valid_from(),
                    valid_until: item.valid_until(),
                    did: item.did().to_string(),
                    status: CredentialStatus::Active,
                }),
            ));

            let did_key = StateKey::holder_did(item.contract(), item.service_id(), item.holder());
            let did = HolderDid::new(*item.holder(), item.did());
            match holder_dids.iter_mut().find(|(k, _)| *k == did_key) {
                Some(entry) => entry.1 = did,
                None => holder_dids.push((did_key, did)),
            }
        }

        let mut values = credentials;
        values.extend(
            holder_dids
                .into_iter()
                .map(|(key, did)| StateMergeValue::set(key, StateValue::HolderDid(did))),
        );
        values.extend(
            designs
                .0
                .into_iter()
                .map(|(key, design)| StateMergeValue::set(key, StateValue::Design(design))),
        );
        Ok(values)
    }
}

impl FactProcessor<AssignCredentialsFact> for AssignProcessor {
    fn pre_process(
        &self,
        fact: &AssignCredentialsFact,
        signs: &[Sign],
        view: LedgerView<'_>,
    ) -> Result<(), ProcessError> {
        fact.is_valid()?;
        checks::check_sender(fact.sender(), view)?;

        let mut designs = WorkingDesigns::default();
        for item in fact.items() {
            designs.get_or_load(fact.sender(), item, view)?;
        }
        checks::check_signs(fact.sender(), &fact.hash(), signs, view)
    }

    fn process(
        &self,
        fact: &AssignCredentialsFact,
        view: LedgerView<'_>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        fact.is_valid()?;
        checks::check_sender(fact.sender(), view)?;

        let mut values = self.issue(fact, view)?;

        let currency = fact.fee_currency().ok_or(ValidationError::InvalidItemCount {
            count: 0,
            max: limits::MAX_ITEMS,
        })?;
        values.push(checks::charge_fee(fact.sender(), currency, view)?);
        Ok(values)
    }
}
