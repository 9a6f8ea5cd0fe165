//! AddTemplate: appends a template ID to a design's policy and stores the
//! template record under its own key.

use super::checks;
use crate::domain::entities::{Design, Template};
use crate::domain::facts::{AddTemplateFact, OperationFact};
use crate::domain::state::{StateKey, StateMergeValue, StateValue};
use crate::domain::value_objects::Sign;
use crate::errors::{ProcessError, ReasonError};
use crate::ports::{FactProcessor, LedgerView};

/// Processor for [`AddTemplateFact`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AddTemplateProcessor;

impl AddTemplateProcessor {
    /// Returns the design with the template appended.
    fn check_state(&self, fact: &AddTemplateFact, view: LedgerView<'_>) -> Result<Design, ProcessError> {
        fact.is_valid()?;
        checks::check_sender(fact.sender(), view)?;
        let mut design =
            checks::authorized_design(fact.sender(), fact.contract(), fact.service_id(), view)?;

        let template_key = StateKey::template(fact.contract(), fact.service_id(), fact.template_id());
        if view.state.get_state(&template_key)?.is_some()
            || !design.policy_mut().add_template(fact.template_id())
        {
            return Err(ReasonError::TemplateAlreadyExists {
                service: fact.service_id().clone(),
                template_id: fact.template_id().to_string(),
            }
            .into());
        }
        Ok(design)
    }
}

impl FactProcessor<AddTemplateFact> for AddTemplateProcessor {
    fn pre_process(
        &self,
        fact: &AddTemplateFact,
        signs: &[Sign],
        view: LedgerView<'_>,
    ) -> Result<(), ProcessError> {
        self.check_state(fact, view)?;
        checks::check_signs(fact.sender(), &fact.hash(), signs, view)
    }

    fn process(
        &self,
        fact: &AddTemplateFact,
        view: LedgerView<'_>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let design = self.check_state(fact, view)?;
        let fee = checks::charge_fee(fact.sender(), fact.currency(), view)?;

        let template = Template::new(fact.template_id(), fact.metadata().clone());
        Ok(vec![
            StateMergeValue::set(
                StateKey::design(fact.contract(), fact.service_id()),
                StateValue::Design(design),
            ),
            StateMergeValue::set(
                StateKey::template(fact.contract(), fact.service_id(), fact.template_id()),
                StateValue::Template(template),
            ),
            fee,
        ])
    }
}
