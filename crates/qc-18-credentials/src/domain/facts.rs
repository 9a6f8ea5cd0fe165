//! # Operation Facts & Items
//!
//! A fact is the signed intent of an operation; an item is one target inside
//! a batch fact. Both are immutable once built and validate themselves
//! without touching state (tier 1 of the error model).
//!
//! ## Canonical Bytes
//!
//! `bytes()` is the input to the fact hash that signatures cover. It is the
//! hint followed by every field in declaration order, each prefixed with its
//! length as a big-endian `u32`; integers are big-endian and booleans are one
//! byte. Changing this layout changes every fact hash.

use crate::domain::entities::{check_len, TemplateMetadata};
use crate::domain::limits;
use crate::domain::value_objects::{Address, CurrencyId, FactHash, ServiceId};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// HINTS
// =============================================================================

pub const CREATE_CREDENTIAL_SERVICE_FACT_HINT: &str = "credential-create-service-fact-v0.0.1";
pub const ADD_TEMPLATE_FACT_HINT: &str = "credential-add-template-fact-v0.0.1";
pub const ASSIGN_CREDENTIALS_FACT_HINT: &str = "credential-assign-credentials-fact-v0.0.1";
pub const ASSIGN_CREDENTIALS_ITEM_HINT: &str = "credential-assign-credentials-item-v0.0.1";
pub const REVOKE_CREDENTIALS_FACT_HINT: &str = "credential-revoke-credentials-fact-v0.0.1";
pub const REVOKE_CREDENTIALS_ITEM_HINT: &str = "credential-revoke-credentials-item-v0.0.1";

/// Behavior shared by the four operation facts.
pub trait OperationFact {
    /// Versioned wire type tag.
    const HINT: &'static str;

    /// Account that signs and pays for the operation.
    fn sender(&self) -> &Address;

    /// Structural self-validation. Never reads state.
    fn is_valid(&self) -> Result<(), ValidationError>;

    /// Canonical bytes covered by the fact hash.
    fn bytes(&self) -> Vec<u8>;

    fn hash(&self) -> FactHash {
        FactHash::digest(&self.bytes())
    }
}

/// Length-prefixed concatenation used for canonical bytes.
#[derive(Default)]
struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    fn new(hint: &str) -> Self {
        let mut bytes = Self::default();
        bytes.push(hint.as_bytes());
        bytes
    }

    fn push(&mut self, part: &[u8]) -> &mut Self {
        // Parts are bounded by the length limits, far below u32::MAX.
        let len = u32::try_from(part.len()).unwrap_or(u32::MAX);
        self.0.extend_from_slice(&len.to_be_bytes());
        self.0.extend_from_slice(part);
        self
    }

    fn push_u64(&mut self, value: u64) -> &mut Self {
        self.push(&value.to_be_bytes())
    }

    fn finish(self) -> Vec<u8> {
        self.0
    }
}

/// IDs become state key segments: bounded length and no `:` separator.
fn check_identifier(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    check_len(field, value, 1, max)?;
    if value.contains(':') || value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// CREATE CREDENTIAL SERVICE
// =============================================================================

/// Registers a new credential service (design) under a contract account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCredentialServiceFact {
    sender: Address,
    contract: Address,
    service_id: ServiceId,
    currency: CurrencyId,
}

impl CreateCredentialServiceFact {
    pub fn new(
        sender: Address,
        contract: Address,
        service_id: ServiceId,
        currency: CurrencyId,
    ) -> Self {
        Self {
            sender,
            contract,
            service_id,
            currency,
        }
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl OperationFact for CreateCredentialServiceFact {
    const HINT: &'static str = CREATE_CREDENTIAL_SERVICE_FACT_HINT;

    fn sender(&self) -> &Address {
        &self.sender
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.sender.is_valid("sender")?;
        self.contract.is_valid("contract")?;
        self.service_id.is_valid()?;
        self.currency.is_valid()?;
        if self.sender == self.contract {
            return Err(ValidationError::SenderIsContract(self.contract));
        }
        Ok(())
    }

    fn bytes(&self) -> Vec<u8> {
        let mut bytes = CanonicalBytes::new(Self::HINT);
        bytes
            .push(self.sender.as_bytes())
            .push(self.contract.as_bytes())
            .push(self.service_id.as_str().as_bytes())
            .push(self.currency.as_str().as_bytes());
        bytes.finish()
    }
}

// =============================================================================
// ADD TEMPLATE
// =============================================================================

/// Registers a credential template under an existing design.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTemplateFact {
    sender: Address,
    contract: Address,
    service_id: ServiceId,
    template_id: String,
    metadata: TemplateMetadata,
    currency: CurrencyId,
}

impl AddTemplateFact {
    pub fn new(
        sender: Address,
        contract: Address,
        service_id: ServiceId,
        template_id: impl Into<String>,
        metadata: TemplateMetadata,
        currency: CurrencyId,
    ) -> Self {
        Self {
            sender,
            contract,
            service_id,
            template_id: template_id.into(),
            metadata,
            currency,
        }
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn metadata(&self) -> &TemplateMetadata {
        &self.metadata
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl OperationFact for AddTemplateFact {
    const HINT: &'static str = ADD_TEMPLATE_FACT_HINT;

    fn sender(&self) -> &Address {
        &self.sender
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.sender.is_valid("sender")?;
        self.contract.is_valid("contract")?;
        self.service_id.is_valid()?;
        self.currency.is_valid()?;
        if self.sender == self.contract {
            return Err(ValidationError::SenderIsContract(self.contract));
        }
        check_identifier("template_id", &self.template_id, limits::MAX_TEMPLATE_ID_LEN)?;
        self.metadata.is_valid()
    }

    fn bytes(&self) -> Vec<u8> {
        let mut bytes = CanonicalBytes::new(Self::HINT);
        bytes
            .push(self.sender.as_bytes())
            .push(self.contract.as_bytes())
            .push(self.service_id.as_str().as_bytes())
            .push(self.template_id.as_bytes());
        for part in self.metadata.bytes() {
            bytes.push(&part);
        }
        bytes.push(self.currency.as_str().as_bytes());
        bytes.finish()
    }
}

// =============================================================================
// ASSIGN CREDENTIALS
// =============================================================================

/// One credential to issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignCredentialsItem {
    contract: Address,
    service_id: ServiceId,
    holder: Address,
    template_id: String,
    credential_id: String,
    value: String,
    valid_from: u64,
    valid_until: u64,
    did: String,
    currency: CurrencyId,
}

impl AssignCredentialsItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contract: Address,
        service_id: ServiceId,
        holder: Address,
        template_id: impl Into<String>,
        credential_id: impl Into<String>,
        value: impl Into<String>,
        valid_from: u64,
        valid_until: u64,
        did: impl Into<String>,
        currency: CurrencyId,
    ) -> Self {
        Self {
            contract,
            service_id,
            holder,
            template_id: template_id.into(),
            credential_id: credential_id.into(),
            value: value.into(),
            valid_from,
            valid_until,
            did: did.into(),
            currency,
        }
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn holder(&self) -> &Address {
        &self.holder
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn credential_id(&self) -> &str {
        &self.credential_id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn valid_from(&self) -> u64 {
        self.valid_from
    }

    pub fn valid_until(&self) -> u64 {
        self.valid_until
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.service_id.is_valid()?;
        self.contract.is_valid("contract")?;
        self.holder.is_valid("holder")?;
        self.currency.is_valid()?;

        if self.contract == self.holder {
            return Err(ValidationError::HolderIsContract(self.holder));
        }
        if self.valid_until <= self.valid_from {
            return Err(ValidationError::InvalidValidityWindow {
                from: self.valid_from,
                until: self.valid_until,
            });
        }

        check_identifier("template_id", &self.template_id, limits::MAX_TEMPLATE_ID_LEN)?;
        check_identifier(
            "credential_id",
            &self.credential_id,
            limits::MAX_CREDENTIAL_ID_LEN,
        )?;
        if self.did.is_empty() {
            return Err(ValidationError::EmptyDid);
        }
        check_len("did", &self.did, 1, limits::MAX_DID_LEN)?;
        check_len("value", &self.value, 1, limits::MAX_CREDENTIAL_VALUE_LEN)
    }

    fn write_bytes(&self, bytes: &mut CanonicalBytes) {
        bytes
            .push(ASSIGN_CREDENTIALS_ITEM_HINT.as_bytes())
            .push(self.contract.as_bytes())
            .push(self.service_id.as_str().as_bytes())
            .push(self.holder.as_bytes())
            .push(self.template_id.as_bytes())
            .push(self.credential_id.as_bytes())
            .push(self.value.as_bytes())
            .push_u64(self.valid_from)
            .push_u64(self.valid_until)
            .push(self.did.as_bytes())
            .push(self.currency.as_str().as_bytes());
    }
}

/// Issues a batch of credentials. Items succeed or fail together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignCredentialsFact {
    sender: Address,
    items: Vec<AssignCredentialsItem>,
}

impl AssignCredentialsFact {
    pub fn new(sender: Address, items: Vec<AssignCredentialsItem>) -> Self {
        Self { sender, items }
    }

    pub fn items(&self) -> &[AssignCredentialsItem] {
        &self.items
    }

    /// The currency the single batch fee is charged in.
    pub fn fee_currency(&self) -> Option<&CurrencyId> {
        self.items.first().map(AssignCredentialsItem::currency)
    }
}

impl OperationFact for AssignCredentialsFact {
    const HINT: &'static str = ASSIGN_CREDENTIALS_FACT_HINT;

    fn sender(&self) -> &Address {
        &self.sender
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.sender.is_valid("sender")?;
        check_batch(
            &self.sender,
            self.items.iter().map(|it| BatchEntry {
                contract: &it.contract,
                service_id: &it.service_id,
                template_id: &it.template_id,
                credential_id: &it.credential_id,
                currency: &it.currency,
            }),
        )?;
        self.items.iter().try_for_each(AssignCredentialsItem::is_valid)
    }

    fn bytes(&self) -> Vec<u8> {
        let mut bytes = CanonicalBytes::new(Self::HINT);
        bytes.push(self.sender.as_bytes());
        for item in &self.items {
            item.write_bytes(&mut bytes);
        }
        bytes.finish()
    }
}

// =============================================================================
// REVOKE CREDENTIALS
// =============================================================================

/// One credential to revoke.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeCredentialsItem {
    contract: Address,
    service_id: ServiceId,
    holder: Address,
    template_id: String,
    credential_id: String,
    currency: CurrencyId,
}

impl RevokeCredentialsItem {
    pub fn new(
        contract: Address,
        service_id: ServiceId,
        holder: Address,
        template_id: impl Into<String>,
        credential_id: impl Into<String>,
        currency: CurrencyId,
    ) -> Self {
        Self {
            contract,
            service_id,
            holder,
            template_id: template_id.into(),
            credential_id: credential_id.into(),
            currency,
        }
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn holder(&self) -> &Address {
        &self.holder
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn credential_id(&self) -> &str {
        &self.credential_id
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.service_id.is_valid()?;
        self.contract.is_valid("contract")?;
        self.holder.is_valid("holder")?;
        self.currency.is_valid()?;
        if self.contract == self.holder {
            return Err(ValidationError::HolderIsContract(self.holder));
        }
        check_identifier("template_id", &self.template_id, limits::MAX_TEMPLATE_ID_LEN)?;
        check_identifier(
            "credential_id",
            &self.credential_id,
            limits::MAX_CREDENTIAL_ID_LEN,
        )
    }

    fn write_bytes(&self, bytes: &mut CanonicalBytes) {
        bytes
            .push(REVOKE_CREDENTIALS_ITEM_HINT.as_bytes())
            .push(self.contract.as_bytes())
            .push(self.service_id.as_str().as_bytes())
            .push(self.holder.as_bytes())
            .push(self.template_id.as_bytes())
            .push(self.credential_id.as_bytes())
            .push(self.currency.as_str().as_bytes());
    }
}

/// Revokes a batch of credentials. Items succeed or fail together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeCredentialsFact {
    sender: Address,
    items: Vec<RevokeCredentialsItem>,
}

impl RevokeCredentialsFact {
    pub fn new(sender: Address, items: Vec<RevokeCredentialsItem>) -> Self {
        Self { sender, items }
    }

    pub fn items(&self) -> &[RevokeCredentialsItem] {
        &self.items
    }

    pub fn fee_currency(&self) -> Option<&CurrencyId> {
        self.items.first().map(RevokeCredentialsItem::currency)
    }
}

impl OperationFact for RevokeCredentialsFact {
    const HINT: &'static str = REVOKE_CREDENTIALS_FACT_HINT;

    fn sender(&self) -> &Address {
        &self.sender
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.sender.is_valid("sender")?;
        check_batch(
            &self.sender,
            self.items.iter().map(|it| BatchEntry {
                contract: &it.contract,
                service_id: &it.service_id,
                template_id: &it.template_id,
                credential_id: &it.credential_id,
                currency: &it.currency,
            }),
        )?;
        self.items.iter().try_for_each(RevokeCredentialsItem::is_valid)
    }

    fn bytes(&self) -> Vec<u8> {
        let mut bytes = CanonicalBytes::new(Self::HINT);
        bytes.push(self.sender.as_bytes());
        for item in &self.items {
            item.write_bytes(&mut bytes);
        }
        bytes.finish()
    }
}

// =============================================================================
// BATCH RULES
// =============================================================================

struct BatchEntry<'a> {
    contract: &'a Address,
    service_id: &'a ServiceId,
    template_id: &'a str,
    credential_id: &'a str,
    currency: &'a CurrencyId,
}

/// Item count, per-item sender check, uniqueness of the credential tuple and
/// a single fee currency.
fn check_batch<'a>(
    sender: &Address,
    entries: impl ExactSizeIterator<Item = BatchEntry<'a>>,
) -> Result<(), ValidationError> {
    let count = entries.len();
    if count == 0 || count > limits::MAX_ITEMS {
        return Err(ValidationError::InvalidItemCount {
            count,
            max: limits::MAX_ITEMS,
        });
    }

    let mut seen = BTreeSet::new();
    let mut currency: Option<&CurrencyId> = None;
    for entry in entries {
        if entry.contract == sender {
            return Err(ValidationError::SenderIsContract(*entry.contract));
        }

        let tuple = (
            entry.contract,
            entry.service_id,
            entry.template_id,
            entry.credential_id,
        );
        if !seen.insert(tuple) {
            return Err(ValidationError::DuplicateItem(format!(
                "{}:{}:{}:{}",
                entry.contract, entry.service_id, entry.template_id, entry.credential_id
            )));
        }

        match currency {
            None => currency = Some(entry.currency),
            Some(first) if first != entry.currency => {
                return Err(ValidationError::MixedCurrencies {
                    first: first.clone(),
                    other: entry.currency.clone(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
