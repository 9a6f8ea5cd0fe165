//! # Driving Ports (API - Inbound)
//!
//! The two-phase contract every credential processor implements.
//!
//! | Phase | Reads | Checks | Output |
//! |-------|-------|--------|--------|
//! | `pre_process` | state, accounts | fact validity, existence, ownership, uniqueness, signs | nothing |
//! | `process` | state, accounts | everything above except signs, plus fee and balance | ordered merge values |
//!
//! `process` re-checks state because the state may have changed between the
//! two phases. Neither phase writes.

use crate::domain::operation::Operation;
use crate::domain::state::StateMergeValue;
use crate::domain::value_objects::Sign;
use crate::errors::ProcessError;
use crate::ports::outbound::LedgerView;

/// Entry point used by the host's operation dispatcher.
pub trait OperationProcessorApi {
    /// Validate a signed operation of any kind.
    fn pre_process(&self, op: &Operation, view: LedgerView<'_>) -> Result<(), ProcessError>;

    /// Compute the state deltas of an operation that passed `pre_process`.
    fn process(&self, op: &Operation, view: LedgerView<'_>)
        -> Result<Vec<StateMergeValue>, ProcessError>;

    /// Both phases against the same view.
    fn execute(&self, op: &Operation, view: LedgerView<'_>)
        -> Result<Vec<StateMergeValue>, ProcessError> {
        self.pre_process(op, view)?;
        self.process(op, view)
    }
}

/// Processor of one fact type.
pub trait FactProcessor<F> {
    /// Validate the fact and its signs against the current state.
    fn pre_process(&self, fact: &F, signs: &[Sign], view: LedgerView<'_>)
        -> Result<(), ProcessError>;

    /// Compute the state deltas of the fact.
    ///
    /// Either every delta is returned or none is; a rejected operation
    /// produces no partial output.
    fn process(&self, fact: &F, view: LedgerView<'_>) -> Result<Vec<StateMergeValue>, ProcessError>;
}
