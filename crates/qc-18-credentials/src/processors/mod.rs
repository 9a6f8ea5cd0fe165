//! # Operation Processors
//!
//! One stateless processor per operation kind, plus [`CredentialProcessors`],
//! the dispatcher the host calls with any [`Operation`].
//!
//! ## Check Order
//!
//! Every processor checks in the same order so that the first failure, and
//! therefore the reported reason, is identical on every node:
//!
//! 1. Fact self-validation
//! 2. Sender exists and is not a contract account
//! 3. Existence: contract account, design, credential
//! 4. Authorization: contract owner == sender
//! 5. Uniqueness / presence: template, credential, revocation status
//! 6. Signs (`pre_process`) or fee and balance (`process`)

mod add_template;
mod assign;
mod checks;
mod create_service;
mod revoke;

pub use add_template::AddTemplateProcessor;
pub use assign::AssignProcessor;
pub use create_service::CreateCredentialServiceProcessor;
pub use revoke::RevokeProcessor;

use crate::config::ProcessingConfig;
use crate::domain::operation::{Fact, Operation};
use crate::domain::state::StateMergeValue;
use crate::errors::ProcessError;
use crate::ports::{FactProcessor, LedgerView, OperationProcessorApi};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, instrument, trace, warn};

/// Outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Operations whose `process` phase produced merge values.
    pub accepted: u64,
    /// Operations rejected in either phase (tiers 1 and 2).
    pub rejected: u64,
    /// Fatal errors raised (tier 3).
    pub fatal: u64,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    fatal: AtomicU64,
}

/// Dispatches operations to the processor for their fact kind.
#[derive(Debug, Default)]
pub struct CredentialProcessors {
    config: ProcessingConfig,
    create_service: CreateCredentialServiceProcessor,
    add_template: AddTemplateProcessor,
    assign: AssignProcessor,
    revoke: RevokeProcessor,
    counters: Counters,
}

impl CredentialProcessors {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            fatal: self.counters.fatal.load(Ordering::Relaxed),
        }
    }

    fn record_failure(&self, phase: &'static str, err: &ProcessError) {
        if err.is_fatal() {
            self.counters.fatal.fetch_add(1, Ordering::Relaxed);
            error!(phase, error = %err, "Fatal error, block processing must stop");
            return;
        }
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        if self.config.log_rejections {
            warn!(phase, error = %err, "Operation rejected");
        } else {
            debug!(phase, error = %err, "Operation rejected");
        }
    }
}

impl OperationProcessorApi for CredentialProcessors {
    #[instrument(skip(self, op, view), fields(kind = %op.kind(), fact = %op.hash(), height = view.height))]
    fn pre_process(&self, op: &Operation, view: LedgerView<'_>) -> Result<(), ProcessError> {
        let signs = op.signs();
        let result = match op.fact() {
            Fact::CreateCredentialService(fact) => self.create_service.pre_process(fact, signs, view),
            Fact::AddTemplate(fact) => self.add_template.pre_process(fact, signs, view),
            Fact::AssignCredentials(fact) => self.assign.pre_process(fact, signs, view),
            Fact::RevokeCredentials(fact) => self.revoke.pre_process(fact, signs, view),
        };

        match &result {
            Ok(()) => debug!(sender = %op.fact().sender(), "Operation passed pre-process"),
            Err(err) => self.record_failure("pre_process", err),
        }
        result
    }

    #[instrument(skip(self, op, view), fields(kind = %op.kind(), fact = %op.hash(), height = view.height))]
    fn process(
        &self,
        op: &Operation,
        view: LedgerView<'_>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let result = match op.fact() {
            Fact::CreateCredentialService(fact) => self.create_service.process(fact, view),
            Fact::AddTemplate(fact) => self.add_template.process(fact, view),
            Fact::AssignCredentials(fact) => self.assign.process(fact, view),
            Fact::RevokeCredentials(fact) => self.revoke.process(fact, view),
        };

        match &result {
            Ok(values) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                debug!(values = values.len(), "Operation processed");
                if self.config.trace_state_values {
                    for value in values {
                        trace!(key = %value.key, op = ?value.op, "State merge value");
                    }
                }
            }
            Err(err) => self.record_failure("process", err),
        }
        result
    }
}
