//! # Wire Codec
//!
//! JSON encoding of facts and operations. Every encoded fact carries a
//! `_hint` type tag (`<name>-v<major>.<minor>.<patch>`); decoding resolves the
//! tag through a [`HintRegistry`] that is built once at startup and passed by
//! reference. There is no process-wide registry.
//!
//! ```json
//! {
//!   "hash": "<hex keccak of the fact bytes>",
//!   "fact": { "_hint": "credential-create-service-fact-v0.0.1", "sender": "0x..", ... },
//!   "signs": [ { "signer": "02..", "signature": ".." } ]
//! }
//! ```

use crate::domain::facts::{
    AddTemplateFact, AssignCredentialsFact, CreateCredentialServiceFact, OperationFact,
    RevokeCredentialsFact,
};
use crate::domain::operation::{Fact, Operation};
use crate::domain::value_objects::Sign;
use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Field holding the type tag.
pub const HINT_FIELD: &str = "_hint";

// =============================================================================
// HINT
// =============================================================================

/// A parsed type tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hint {
    name: String,
    version: (u32, u32, u32),
}

impl Hint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> (u32, u32, u32) {
        self.version
    }
}

impl FromStr for Hint {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CodecError::MalformedHint(s.to_string());

        let (name, version) = s.rsplit_once("-v").ok_or_else(malformed)?;
        if name.is_empty() {
            return Err(malformed());
        }
        let parts: Vec<u32> = version
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| malformed()))
            .collect::<Result<_, _>>()?;
        let [major, minor, patch] = parts[..] else {
            return Err(malformed());
        };

        Ok(Self {
            name: name.to_string(),
            version: (major, minor, patch),
        })
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor, patch) = self.version;
        write!(f, "{}-v{major}.{minor}.{patch}", self.name)
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Decodes a fact body (without `_hint`).
pub type FactDecoder = fn(Value) -> Result<Fact, CodecError>;

fn decode_as<F>(body: Value) -> Result<Fact, CodecError>
where
    F: DeserializeOwned + Into<Fact>,
{
    Ok(serde_json::from_value::<F>(body)?.into())
}

/// Type tag -> decoder table.
#[derive(Clone, Default)]
pub struct HintRegistry {
    decoders: BTreeMap<String, FactDecoder>,
}

impl HintRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the four credential facts.
    pub fn with_credential_facts() -> Result<Self, CodecError> {
        let mut registry = Self::new();
        registry.register(
            CreateCredentialServiceFact::HINT,
            decode_as::<CreateCredentialServiceFact>,
        )?;
        registry.register(AddTemplateFact::HINT, decode_as::<AddTemplateFact>)?;
        registry.register(AssignCredentialsFact::HINT, decode_as::<AssignCredentialsFact>)?;
        registry.register(RevokeCredentialsFact::HINT, decode_as::<RevokeCredentialsFact>)?;
        Ok(registry)
    }

    /// Registers a decoder. A hint can be registered once.
    pub fn register(&mut self, hint: &str, decoder: FactDecoder) -> Result<(), CodecError> {
        hint.parse::<Hint>()?;
        if self.decoders.contains_key(hint) {
            return Err(CodecError::DuplicateHint(hint.to_string()));
        }
        self.decoders.insert(hint.to_string(), decoder);
        Ok(())
    }

    pub fn is_registered(&self, hint: &str) -> bool {
        self.decoders.contains_key(hint)
    }

    pub fn hints(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Decodes a tagged fact object.
    pub fn decode_fact(&self, value: Value) -> Result<Fact, CodecError> {
        let Value::Object(mut body) = value else {
            return Err(CodecError::MissingHint);
        };
        let hint = match body.remove(HINT_FIELD) {
            Some(Value::String(hint)) => hint,
            _ => return Err(CodecError::MissingHint),
        };
        let decoder = self
            .decoders
            .get(&hint)
            .ok_or(CodecError::UnknownHint(hint))?;
        decoder(Value::Object(body))
    }

    pub fn decode_fact_str(&self, json: &str) -> Result<Fact, CodecError> {
        self.decode_fact(serde_json::from_str(json)?)
    }

    /// Decodes an operation and checks the encoded hash, if present, against
    /// the decoded fact.
    pub fn decode_operation(&self, value: Value) -> Result<Operation, CodecError> {
        let Value::Object(mut body) = value else {
            return Err(CodecError::MissingField("fact"));
        };
        let fact = self.decode_fact(body.remove("fact").ok_or(CodecError::MissingField("fact"))?)?;
        let signs: Vec<Sign> = match body.remove("signs") {
            Some(signs) => serde_json::from_value(signs)?,
            None => Vec::new(),
        };

        match body.remove("hash") {
            Some(Value::String(encoded)) => {
                let computed = hex::encode(fact.hash().as_bytes());
                if encoded.trim_start_matches("0x") != computed {
                    return Err(CodecError::HashMismatch { encoded, computed });
                }
            }
            Some(_) => {
                return Err(CodecError::InvalidField {
                    field: "hash",
                    expected: "hex string",
                });
            }
            None => {}
        }
        Ok(Operation::new(fact, signs))
    }

    pub fn decode_operation_str(&self, json: &str) -> Result<Operation, CodecError> {
        self.decode_operation(serde_json::from_str(json)?)
    }
}

impl fmt::Debug for HintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintRegistry")
            .field("hints", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a fact with its `_hint` tag.
pub fn encode_fact(fact: &Fact) -> Result<Value, CodecError> {
    let body = match fact {
        Fact::CreateCredentialService(f) => serde_json::to_value(f)?,
        Fact::AddTemplate(f) => serde_json::to_value(f)?,
        Fact::AssignCredentials(f) => serde_json::to_value(f)?,
        Fact::RevokeCredentials(f) => serde_json::to_value(f)?,
    };
    let Value::Object(body) = body else {
        return Err(CodecError::MissingField("fact body"));
    };

    let mut tagged = Map::with_capacity(body.len() + 1);
    tagged.insert(HINT_FIELD.to_string(), Value::String(fact.hint().to_string()));
    tagged.extend(body);
    Ok(Value::Object(tagged))
}

/// Encodes an operation: fact hash, tagged fact, signs.
pub fn encode_operation(op: &Operation) -> Result<Value, CodecError> {
    let mut body = Map::new();
    body.insert(
        "hash".to_string(),
        Value::String(hex::encode(op.hash().as_bytes())),
    );
    body.insert("fact".to_string(), encode_fact(op.fact())?);
    body.insert("signs".to_string(), serde_json::to_value(op.signs())?);
    Ok(Value::Object(body))
}
