//! CreateCredentialService: registers a design with an empty policy.

use super::checks;
use crate::domain::entities::{Design, Policy};
use crate::domain::facts::{CreateCredentialServiceFact, OperationFact};
use crate::domain::state::{StateKey, StateMergeValue, StateValue};
use crate::domain::value_objects::Sign;
use crate::errors::ProcessError;
use crate::ports::{FactProcessor, LedgerView};

/// Processor for [`CreateCredentialServiceFact`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CreateCredentialServiceProcessor;

impl CreateCredentialServiceProcessor {
    fn check_state(
        &self,
        fact: &CreateCredentialServiceFact,
        view: LedgerView<'_>,
    ) -> Result<(), ProcessError> {
        fact.is_valid()?;
        checks::check_sender(fact.sender(), view)?;
        let account = checks::require_contract(fact.contract(), view)?;
        checks::authorize(&account, fact.sender())?;
        checks::ensure_design_absent(fact.contract(), fact.service_id(), view)
    }
}

impl FactProcessor<CreateCredentialServiceFact> for CreateCredentialServiceProcessor {
    fn pre_process(
        &self,
        fact: &CreateCredentialServiceFact,
        signs: &[Sign],
        view: LedgerView<'_>,
    ) -> Result<(), ProcessError> {
        self.check_state(fact, view)?;
        checks::check_signs(fact.sender(), &fact.hash(), signs, view)
    }

    fn process(
        &self,
        fact: &CreateCredentialServiceFact,
        view: LedgerView<'_>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        self.check_state(fact, view)?;

        let design = Design::new(fact.service_id().clone(), Policy::default());
        let fee = checks::charge_fee(fact.sender(), fact.currency(), view)?;

        Ok(vec![
            StateMergeValue::set(
                StateKey::design(fact.contract(), fact.service_id()),
                StateValue::Design(design),
            ),
            fee,
        ])
    }
}
