//! Operations: a fact plus the signatures over its hash.

use crate::domain::facts::{
    AddTemplateFact, AssignCredentialsFact, CreateCredentialServiceFact, OperationFact,
    RevokeCredentialsFact,
};
use crate::domain::value_objects::{Address, FactHash, Sign};
use crate::errors::ValidationError;
use std::fmt;

/// The four credential operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateCredentialService,
    AddTemplate,
    AssignCredentials,
    RevokeCredentials,
}

impl OperationKind {
    pub const ALL: [Self; 4] = [
        Self::CreateCredentialService,
        Self::AddTemplate,
        Self::AssignCredentials,
        Self::RevokeCredentials,
    ];

    /// Wire hint of the fact carried by this kind.
    pub fn fact_hint(&self) -> &'static str {
        match self {
            Self::CreateCredentialService => CreateCredentialServiceFact::HINT,
            Self::AddTemplate => AddTemplateFact::HINT,
            Self::AssignCredentials => AssignCredentialsFact::HINT,
            Self::RevokeCredentials => RevokeCredentialsFact::HINT,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateCredentialService => "create_credential_service",
            Self::AddTemplate => "add_template",
            Self::AssignCredentials => "assign_credentials",
            Self::RevokeCredentials => "revoke_credentials",
        };
        f.write_str(name)
    }
}

/// Any credential fact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fact {
    CreateCredentialService(CreateCredentialServiceFact),
    AddTemplate(AddTemplateFact),
    AssignCredentials(AssignCredentialsFact),
    RevokeCredentials(RevokeCredentialsFact),
}

impl Fact {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CreateCredentialService(_) => OperationKind::CreateCredentialService,
            Self::AddTemplate(_) => OperationKind::AddTemplate,
            Self::AssignCredentials(_) => OperationKind::AssignCredentials,
            Self::RevokeCredentials(_) => OperationKind::RevokeCredentials,
        }
    }

    pub fn hint(&self) -> &'static str {
        self.kind().fact_hint()
    }

    pub fn sender(&self) -> &Address {
        match self {
            Self::CreateCredentialService(f) => f.sender(),
            Self::AddTemplate(f) => f.sender(),
            Self::AssignCredentials(f) => f.sender(),
            Self::RevokeCredentials(f) => f.sender(),
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        match self {
            Self::CreateCredentialService(f) => f.is_valid(),
            Self::AddTemplate(f) => f.is_valid(),
            Self::AssignCredentials(f) => f.is_valid(),
            Self::RevokeCredentials(f) => f.is_valid(),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Self::CreateCredentialService(f) => f.bytes(),
            Self::AddTemplate(f) => f.bytes(),
            Self::AssignCredentials(f) => f.bytes(),
            Self::RevokeCredentials(f) => f.bytes(),
        }
    }

    pub fn hash(&self) -> FactHash {
        FactHash::digest(&self.bytes())
    }
}

impl From<CreateCredentialServiceFact> for Fact {
    fn from(fact: CreateCredentialServiceFact) -> Self {
        Self::CreateCredentialService(fact)
    }
}

impl From<AddTemplateFact> for Fact {
    fn from(fact: AddTemplateFact) -> Self {
        Self::AddTemplate(fact)
    }
}

impl From<AssignCredentialsFact> for Fact {
    fn from(fact: AssignCredentialsFact) -> Self {
        Self::AssignCredentials(fact)
    }
}

impl From<RevokeCredentialsFact> for Fact {
    fn from(fact: RevokeCredentialsFact) -> Self {
        Self::RevokeCredentials(fact)
    }
}

/// A signed fact, as submitted to the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    fact: Fact,
    signs: Vec<Sign>,
}

impl Operation {
    pub fn new(fact: impl Into<Fact>, signs: Vec<Sign>) -> Self {
        Self {
            fact: fact.into(),
            signs,
        }
    }

    pub fn fact(&self) -> &Fact {
        &self.fact
    }

    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    pub fn kind(&self) -> OperationKind {
        self.fact.kind()
    }

    /// Hash of the fact; this is what every sign covers.
    pub fn hash(&self) -> FactHash {
        self.fact.hash()
    }

    pub fn into_parts(self) -> (Fact, Vec<Sign>) {
        (self.fact, self.signs)
    }
}
