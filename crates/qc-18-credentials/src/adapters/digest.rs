//! # Credential Digest (read side)
//!
//! Materializes applied merge values into query indexes. Entity kinds are
//! recognized by parsing the state key, never by inspecting the value first;
//! a value whose kind disagrees with its key is rejected.
//!
//! Listing pages are ordered by credential ID. The offset is an exclusive
//! cursor: the last ID of the previous page.

use crate::config::DigestConfig;
use crate::domain::entities::{Credential, Design, HolderDid, Template};
use crate::domain::state::{KeyPath, MergeOp, StateMergeValue};
use crate::domain::value_objects::{Address, Height, ServiceId};
use crate::errors::DigestError;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

/// A value together with the height it was last written at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indexed<T> {
    pub height: Height,
    pub value: T,
}

/// Paging parameters for credential listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Credential ID to continue after (or before, when `reverse`).
    pub offset: Option<String>,
    /// Requested page size. Missing, zero or oversized limits are clamped.
    pub limit: Option<usize>,
    pub reverse: bool,
}

type ServiceScope = (Address, ServiceId);

/// In-memory read model of credential state.
#[derive(Debug, Default)]
pub struct CredentialDigest {
    max_page_size: usize,
    last_height: Option<Height>,
    designs: BTreeMap<ServiceScope, Indexed<Design>>,
    templates: BTreeMap<(ServiceScope, String), Indexed<Template>>,
    credentials: BTreeMap<(ServiceScope, String), BTreeMap<String, Indexed<Credential>>>,
    holder_dids: BTreeMap<(ServiceScope, Address), Indexed<HolderDid>>,
}

impl CredentialDigest {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            max_page_size: config.max_page_size.max(1),
            ..Self::default()
        }
    }

    pub fn last_height(&self) -> Option<Height> {
        self.last_height
    }

    /// Ingests the merge values applied at `height`. Balance debits belong to
    /// the account subsystem and are skipped. Returns the number of indexed
    /// values.
    pub fn ingest(&mut self, height: Height, values: &[StateMergeValue]) -> Result<usize, DigestError> {
        if let Some(last) = self.last_height {
            if height < last {
                return Err(DigestError::StaleHeight { last, got: height });
            }
        }

        // Parse everything first so a bad value leaves the indexes untouched.
        let mut parsed = Vec::with_capacity(values.len());
        for value in values {
            let MergeOp::Set(state_value) = &value.op else {
                continue;
            };
            let path = value.key.parse()?;
            let entry = match path {
                KeyPath::Design { contract, service } => Entry::Design(
                    (contract, service),
                    state_value.clone().into_design(&value.key)?,
                ),
                KeyPath::Template {
                    contract,
                    service,
                    template_id,
                } => Entry::Template(
                    ((contract, service), template_id),
                    state_value.clone().into_template(&value.key)?,
                ),
                KeyPath::Credential {
                    contract,
                    service,
                    template_id,
                    credential_id,
                } => Entry::Credential(
                    ((contract, service), template_id),
                    credential_id,
                    state_value.clone().into_credential(&value.key)?,
                ),
                KeyPath::HolderDid {
                    contract,
                    service,
                    holder,
                } => Entry::HolderDid(
                    ((contract, service), holder),
                    state_value.clone().into_holder_did(&value.key)?,
                ),
                KeyPath::Balance { .. } => continue,
            };
            parsed.push(entry);
        }

        let count = parsed.len();
        for entry in parsed {
            match entry {
                Entry::Design(scope, value) => {
                    self.designs.insert(scope, Indexed { height, value });
                }
                Entry::Template(scope, value) => {
                    self.templates.insert(scope, Indexed { height, value });
                }
                Entry::Credential(scope, id, value) => {
                    self.credentials
                        .entry(scope)
                        .or_default()
                        .insert(id, Indexed { height, value });
                }
                Entry::HolderDid(scope, value) => {
                    self.holder_dids.insert(scope, Indexed { height, value });
                }
            }
        }
        self.last_height = Some(height);
        debug!(height, indexed = count, "Digest ingested block values");
        Ok(count)
    }

    pub fn design(&self, contract: &Address, service: &ServiceId) -> Option<&Indexed<Design>> {
        self.designs.get(&(*contract, service.clone()))
    }

    pub fn template(
        &self,
        contract: &Address,
        service: &ServiceId,
        template_id: &str,
    ) -> Option<&Indexed<Template>> {
        self.templates
            .get(&((*contract, service.clone()), template_id.to_string()))
    }

    pub fn credential(
        &self,
        contract: &Address,
        service: &ServiceId,
        template_id: &str,
        credential_id: &str,
    ) -> Option<&Indexed<Credential>> {
        self.credentials
            .get(&((*contract, service.clone()), template_id.to_string()))?
            .get(credential_id)
    }

    pub fn holder_did(
        &self,
        contract: &Address,
        service: &ServiceId,
        holder: &Address,
    ) -> Option<&Indexed<HolderDid>> {
        self.holder_dids.get(&((*contract, service.clone()), *holder))
    }

    /// Lists credentials of one template, one page at a time.
    pub fn credentials_by_template(
        &self,
        contract: &Address,
        service: &ServiceId,
        template_id: &str,
        page: &PageRequest,
    ) -> Vec<&Indexed<Credential>> {
        let Some(by_id) = self
            .credentials
            .get(&((*contract, service.clone()), template_id.to_string()))
        else {
            return Vec::new();
        };

        let limit = self.page_size(page.limit);
        let offset = page.offset.as_deref();
        match (page.reverse, offset) {
            (false, Some(after)) => by_id
                .range::<str, _>((Bound::Excluded(after), Bound::Unbounded))
                .map(|(_, v)| v)
                .take(limit)
                .collect(),
            (false, None) => by_id.values().take(limit).collect(),
            (true, Some(before)) => by_id
                .range::<str, _>((Bound::Unbounded, Bound::Excluded(before)))
                .rev()
                .map(|(_, v)| v)
                .take(limit)
                .collect(),
            (true, None) => by_id.values().rev().take(limit).collect(),
        }
    }

    fn page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(limit) if limit > 0 && limit <= self.max_page_size => limit,
            _ => self.max_page_size,
        }
    }
}

enum Entry {
    Design(ServiceScope, Design),
    Template((ServiceScope, String), Template),
    Credential((ServiceScope, String), String, Credential),
    HolderDid((ServiceScope, Address), HolderDid),
}
