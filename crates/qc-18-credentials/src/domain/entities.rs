//! # Domain Entities
//!
//! Records stored under the credential state keys.
//!
//! ## Lifecycle
//!
//! - `Design` is created once by CreateCredentialService and never deleted.
//! - `Template` entries are appended by AddTemplate.
//! - `Credential` and `HolderDid` are written by Assign. Revoke flips the
//!   credential's status; nothing is physically deleted.
//!
//! The core never keeps these across calls. Each processor reads the current
//! value, computes the next one and hands it back as a merge value.

use crate::domain::limits;
use crate::domain::value_objects::{Address, Date, Height, ServiceId};
use crate::errors::{FatalError, ValidationError};
use serde::{Deserialize, Serialize};

// =============================================================================
// HOLDER
// =============================================================================

/// A holder known to a service, with the number of credentials issued to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    pub address: Address,
    pub credential_count: u64,
}

impl Holder {
    pub fn new(address: Address, credential_count: u64) -> Self {
        Self {
            address,
            credential_count,
        }
    }
}

// =============================================================================
// POLICY
// =============================================================================

/// Mutable configuration embedded in a [`Design`].
///
/// `templates` keeps insertion order and never holds duplicates. `holders`
/// only grows, through Assign.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    templates: Vec<String>,
    holders: Vec<Holder>,
    credential_count: u64,
}

impl Policy {
    pub fn new(templates: Vec<String>, holders: Vec<Holder>, credential_count: u64) -> Self {
        Self {
            templates,
            holders,
            credential_count,
        }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn holders(&self) -> &[Holder] {
        &self.holders
    }

    pub fn credential_count(&self) -> u64 {
        self.credential_count
    }

    pub fn has_template(&self, template_id: &str) -> bool {
        self.templates.iter().any(|t| t == template_id)
    }

    pub fn holder(&self, address: &Address) -> Option<&Holder> {
        self.holders.iter().find(|h| h.address == *address)
    }

    /// Appends a template ID. Returns false, leaving the policy unchanged,
    /// if the ID is already registered.
    pub fn add_template(&mut self, template_id: impl Into<String>) -> bool {
        let template_id = template_id.into();
        if self.has_template(&template_id) {
            return false;
        }
        self.templates.push(template_id);
        true
    }

    /// Records one credential issued to `holder`.
    pub fn record_issuance(&mut self, holder: Address) -> Result<(), FatalError> {
        self.credential_count = self
            .credential_count
            .checked_add(1)
            .ok_or(FatalError::CounterOverflow("policy credential_count"))?;

        match self.holders.iter_mut().find(|h| h.address == holder) {
            Some(entry) => {
                entry.credential_count = entry
                    .credential_count
                    .checked_add(1)
                    .ok_or(FatalError::CounterOverflow("holder credential_count"))?;
            }
            None => self.holders.push(Holder::new(holder, 1)),
        }
        Ok(())
    }

    /// Checks that templates and holders are unique.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        for (i, template) in self.templates.iter().enumerate() {
            if self.templates[..i].contains(template) {
                return Err(ValidationError::InvalidDesign(format!(
                    "duplicate template {template}"
                )));
            }
        }
        for (i, holder) in self.holders.iter().enumerate() {
            if self.holders[..i].iter().any(|h| h.address == holder.address) {
                return Err(ValidationError::InvalidDesign(format!(
                    "duplicate holder {}",
                    holder.address
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// DESIGN
// =============================================================================

/// A credential-issuing service scoped to one contract account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    service_id: ServiceId,
    policy: Policy,
}

impl Design {
    pub fn new(service_id: ServiceId, policy: Policy) -> Self {
        Self { service_id, policy }
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut Policy {
        &mut self.policy
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.service_id.is_valid()?;
        self.policy.is_valid()
    }
}

// =============================================================================
// TEMPLATE
// =============================================================================

/// Display and lifecycle metadata of a credential template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub template_name: String,
    pub service_date: Date,
    pub expiration_date: Date,
    pub template_share: bool,
    pub multi_audit: bool,
    pub display_name: String,
    pub subject_key: String,
    pub description: String,
    pub creator: Address,
}

impl TemplateMetadata {
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        check_len("template_name", &self.template_name, 1, limits::MAX_TEMPLATE_LABEL_LEN)?;
        check_len("display_name", &self.display_name, 1, limits::MAX_TEMPLATE_LABEL_LEN)?;
        check_len("subject_key", &self.subject_key, 1, limits::MAX_TEMPLATE_LABEL_LEN)?;
        check_len(
            "description",
            &self.description,
            0,
            limits::MAX_TEMPLATE_DESCRIPTION_LEN,
        )?;
        self.creator.is_valid("creator")?;

        let service = self.service_date.parse()?;
        let expiration = self.expiration_date.parse()?;
        if expiration <= service {
            return Err(ValidationError::InvalidDateRange {
                service: self.service_date.to_string(),
                expiration: self.expiration_date.to_string(),
            });
        }
        Ok(())
    }

    /// Canonical bytes, in field order.
    pub fn bytes(&self) -> Vec<Vec<u8>> {
        vec![
            self.template_name.as_bytes().to_vec(),
            self.service_date.as_str().as_bytes().to_vec(),
            self.expiration_date.as_str().as_bytes().to_vec(),
            vec![u8::from(self.template_share)],
            vec![u8::from(self.multi_audit)],
            self.display_name.as_bytes().to_vec(),
            self.subject_key.as_bytes().to_vec(),
            self.description.as_bytes().to_vec(),
            self.creator.as_bytes().to_vec(),
        ]
    }
}

/// A credential schema registered under a design.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub metadata: TemplateMetadata,
}

impl Template {
    pub fn new(template_id: impl Into<String>, metadata: TemplateMetadata) -> Self {
        Self {
            template_id: template_id.into(),
            metadata,
        }
    }
}

// =============================================================================
// CREDENTIAL
// =============================================================================

/// Liveness of an issued credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredentialStatus {
    /// Issued and not revoked.
    Active,
    /// Revoked at the given block height.
    Revoked { height: Height },
}

/// An issued claim instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub holder: Address,
    pub template_id: String,
    pub credential_id: String,
    pub value: String,
    /// Start of the validity window (inclusive).
    pub valid_from: u64,
    /// End of the validity window (exclusive). Always greater than `valid_from`.
    pub valid_until: u64,
    pub did: String,
    pub status: CredentialStatus,
}

impl Credential {
    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    /// Marks the credential revoked at `height`. Returns false if it was
    /// already revoked.
    pub fn revoke(&mut self, height: Height) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = CredentialStatus::Revoked { height };
        true
    }
}

// =============================================================================
// HOLDER DID
// =============================================================================

/// The DID string a holder is known by within one service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderDid {
    pub holder: Address,
    pub did: String,
}

impl HolderDid {
    pub fn new(holder: Address, did: impl Into<String>) -> Self {
        Self {
            holder,
            did: did.into(),
        }
    }
}

/// Checks a length bound counted in characters.
pub(crate) fn check_len(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::InvalidLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
