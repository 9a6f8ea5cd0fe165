//! # Chain Harness
//!
//! Plays the host's role around the credential processors: supplies a
//! snapshot view at the current height, applies accepted merge values to the
//! in-memory ledger, feeds them to the read-side digest and advances the
//! height. One operation per block.

use qc_18_credentials::prelude::*;
use std::collections::BTreeMap;
use std::sync::Once;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const OWNER: Address = Address::new([0x0A; 20]);
pub const STRANGER: Address = Address::new([0x0B; 20]);
pub const CONTRACT: Address = Address::new([0xCC; 20]);
pub const HOLDER: Address = Address::new([0x11; 20]);
pub const OTHER_HOLDER: Address = Address::new([0x12; 20]);
pub const FEE_RECEIVER: Address = Address::new([0xFE; 20]);

pub const SERVICE: &str = "svc1";
pub const CURRENCY: &str = "QCT";
pub const FEE: Amount = 10;
pub const INITIAL_BALANCE: Amount = 1_000;

static TRACING: Once = Once::new();

/// Routes processor logs to the test writer. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Why a submission did not produce committed state.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error(transparent)]
    Digest(#[from] DigestError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Sign(#[from] SignError),
}

impl HarnessError {
    /// The tier 2 reason, if the processors rejected the operation.
    pub fn reason(&self) -> Option<&ReasonError> {
        match self {
            Self::Process(err) => err.reason(),
            _ => None,
        }
    }

    pub fn process_error(&self) -> Option<&ProcessError> {
        match self {
            Self::Process(err) => Some(err),
            _ => None,
        }
    }
}

/// In-memory chain driving the credential processors.
pub struct ChainHarness {
    pub ledger: InMemoryLedger,
    pub digest: CredentialDigest,
    pub processors: CredentialProcessors,
    pub registry: HintRegistry,
    height: Height,
    keys: BTreeMap<Address, KeyPair>,
}

impl ChainHarness {
    /// Owner of `CONTRACT` and a stranger, both funded, plus one holder
    /// account. Fees are a fixed `FEE` in `CURRENCY`.
    pub fn new() -> Result<Self, HarnessError> {
        Self::with_config(CredentialConfig::default())
    }

    pub fn with_config(config: CredentialConfig) -> Result<Self, HarnessError> {
        init_tracing();

        let mut keys = BTreeMap::new();
        keys.insert(OWNER, KeyPair::from_seed([0x01; 32])?);
        keys.insert(STRANGER, KeyPair::from_seed([0x02; 32])?);

        let currency = CurrencyId::new(CURRENCY);
        let mut ledger = InMemoryLedger::new();
        for (address, pair) in &keys {
            ledger
                .register_account(*address, Some(AccountKeys::single(pair.public_key())))
                .set_balance(*address, currency.clone(), INITIAL_BALANCE);
        }
        ledger
            .register_account(HOLDER, None)
            .register_account(OTHER_HOLDER, None)
            .register_contract(CONTRACT, OWNER)
            .register_currency(CurrencyPolicy::new(
                currency,
                0,
                Feeer::Fixed {
                    receiver: FEE_RECEIVER,
                    amount: FEE,
                },
            ));

        Ok(Self {
            ledger,
            digest: CredentialDigest::new(&config.digest),
            processors: CredentialProcessors::new(config.processing),
            registry: HintRegistry::with_credential_facts()?,
            height: 1,
            keys,
        })
    }

    pub fn height(&self) -> Height {
        self.height
    }

    /// Signs `fact` with the key of `signer`.
    pub fn sign(&self, fact: impl Into<Fact>, signer: Address) -> Result<Operation, HarnessError> {
        let fact = fact.into();
        let signs = match self.keys.get(&signer) {
            Some(pair) => vec![pair.sign(&fact.hash())?],
            None => Vec::new(),
        };
        Ok(Operation::new(fact, signs))
    }

    /// Runs both phases; on success commits and indexes the values.
    pub fn submit(&mut self, op: &Operation) -> Result<Vec<StateMergeValue>, HarnessError> {
        let view = LedgerView::over(self.height, &self.ledger);
        let values = self.processors.execute(op, view)?;

        self.ledger.apply(&values)?;
        self.digest.ingest(self.height, &values)?;
        self.height += 1;
        Ok(values)
    }

    /// Signs as the fact's sender and submits.
    pub fn sign_and_submit(
        &mut self,
        fact: impl Into<Fact>,
    ) -> Result<Vec<StateMergeValue>, HarnessError> {
        let fact = fact.into();
        let sender = *fact.sender();
        let op = self.sign(fact, sender)?;
        self.submit(&op)
    }

    /// Decodes a JSON operation through the hint registry and submits it.
    pub fn submit_json(&mut self, json: &str) -> Result<Vec<StateMergeValue>, HarnessError> {
        let op = self.registry.decode_operation_str(json)?;
        self.submit(&op)
    }

    pub fn balance(&self, account: &Address) -> Amount {
        self.ledger
            .balance_of(account, &CurrencyId::new(CURRENCY))
            .unwrap_or_default()
    }

    pub fn design(&self) -> Option<Design> {
        let key = StateKey::design(&CONTRACT, &ServiceId::new(SERVICE));
        match self.ledger.get(&key) {
            Some(StateValue::Design(design)) => Some(design.clone()),
            _ => None,
        }
    }

    pub fn credential(&self, template_id: &str, credential_id: &str) -> Option<Credential> {
        let key = StateKey::credential(
            &CONTRACT,
            &ServiceId::new(SERVICE),
            template_id,
            credential_id,
        );
        match self.ledger.get(&key) {
            Some(StateValue::Credential(credential)) => Some(credential.clone()),
            _ => None,
        }
    }

    pub fn holder_did(&self, holder: &Address) -> Option<HolderDid> {
        let key = StateKey::holder_did(&CONTRACT, &ServiceId::new(SERVICE), holder);
        match self.ledger.get(&key) {
            Some(StateValue::HolderDid(did)) => Some(did.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// FACT BUILDERS
// =============================================================================

pub fn create_service(sender: Address) -> CreateCredentialServiceFact {
    CreateCredentialServiceFact::new(
        sender,
        CONTRACT,
        ServiceId::new(SERVICE),
        CurrencyId::new(CURRENCY),
    )
}

pub fn metadata() -> TemplateMetadata {
    TemplateMetadata {
        template_name: "degree".into(),
        service_date: Date::new("2024-01-01"),
        expiration_date: Date::new("2030-12-31"),
        template_share: true,
        multi_audit: false,
        display_name: "University Degree".into(),
        subject_key: "student".into(),
        description: "Bachelor degree issued by the registrar".into(),
        creator: OWNER,
    }
}

pub fn add_template(template_id: &str) -> AddTemplateFact {
    AddTemplateFact::new(
        OWNER,
        CONTRACT,
        ServiceId::new(SERVICE),
        template_id,
        metadata(),
        CurrencyId::new(CURRENCY),
    )
}

pub fn assign_item(
    holder: Address,
    template_id: &str,
    credential_id: &str,
    window: (u64, u64),
    did: &str,
) -> AssignCredentialsItem {
    AssignCredentialsItem::new(
        CONTRACT,
        ServiceId::new(SERVICE),
        holder,
        template_id,
        credential_id,
        "BSc Computer Science",
        window.0,
        window.1,
        did,
        CurrencyId::new(CURRENCY),
    )
}

pub fn assign(items: Vec<AssignCredentialsItem>) -> AssignCredentialsFact {
    AssignCredentialsFact::new(OWNER, items)
}

pub fn revoke(holder: Address, template_id: &str, credential_id: &str) -> RevokeCredentialsFact {
    RevokeCredentialsFact::new(
        OWNER,
        vec![RevokeCredentialsItem::new(
            CONTRACT,
            ServiceId::new(SERVICE),
            holder,
            template_id,
            credential_id,
            CurrencyId::new(CURRENCY),
        )],
    )
}

/// A harness with `svc1` created and `edu-degree` registered.
pub fn harness_with_template() -> Result<ChainHarness, HarnessError> {
    let mut chain = ChainHarness::new()?;
    chain.sign_and_submit(create_service(OWNER))?;
    chain.sign_and_submit(add_template("edu-degree"))?;
    Ok(chain)
}
