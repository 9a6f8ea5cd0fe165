//! # Value Objects
//!
//! Immutable primitives shared by facts, entities and state keys.
//! All of them render to key-safe strings (no `:` separator) so that state
//! keys stay parseable.

use crate::domain::limits;
use crate::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Token amount in base units.
pub type Amount = u128;

/// Block height of the snapshot an operation is processed against.
pub type Height = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address. Contract accounts and regular accounts share
/// the same address space.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Rejects the zero address, which no account can own.
    pub fn is_valid(&self, field: &'static str) -> Result<(), ValidationError> {
        if self.is_zero() {
            return Err(ValidationError::ZeroAddress { field });
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|_| ValidationError::MalformedAddress(s.to_string()))?;
        Self::from_slice(&bytes).ok_or_else(|| ValidationError::MalformedAddress(s.to_string()))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SERVICE ID
// =============================================================================

/// Identifier of a credential service, unique per contract account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Wraps a raw identifier. Call [`ServiceId::is_valid`] before trusting it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Service IDs are 3..=10 characters of `[A-Za-z0-9_.!$*@-]`, starting
    /// and ending with an alphanumeric character.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let len = self.0.chars().count();
        if !(limits::MIN_SERVICE_ID_LEN..=limits::MAX_SERVICE_ID_LEN).contains(&len) {
            return Err(ValidationError::InvalidLength {
                field: "service_id",
                min: limits::MIN_SERVICE_ID_LEN,
                max: limits::MAX_SERVICE_ID_LEN,
                actual: len,
            });
        }

        let allowed = |c: char| c.is_ascii_alphanumeric() || "_.!$*@-".contains(c);
        let edges_ok = self.0.starts_with(|c: char| c.is_ascii_alphanumeric())
            && self.0.ends_with(|c: char| c.is_ascii_alphanumeric());
        if !edges_ok || !self.0.chars().all(allowed) {
            return Err(ValidationError::InvalidCharacters {
                field: "service_id",
                value: self.0.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// CURRENCY ID
// =============================================================================

/// Currency the operation fee is paid in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Wraps a raw currency code. Call [`CurrencyId::is_valid`] before trusting it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the currency code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Currency codes are 3..=10 uppercase ASCII letters or digits.
    pub fn is_valid(&self) -> Result<(), ValidationError> {
        let len = self.0.len();
        if !(limits::MIN_CURRENCY_ID_LEN..=limits::MAX_CURRENCY_ID_LEN).contains(&len) {
            return Err(ValidationError::InvalidLength {
                field: "currency",
                min: limits::MIN_CURRENCY_ID_LEN,
                max: limits::MAX_CURRENCY_ID_LEN,
                actual: len,
            });
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidCharacters {
                field: "currency",
                value: self.0.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CurrencyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// DATE (yyyy-MM-dd)
// =============================================================================

/// Calendar date carried by template metadata, formatted `yyyy-MM-dd`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(String);

impl Date {
    const LAYOUT: &'static str = "%Y-%m-%d";

    /// Wraps a raw date string. Call [`Date::parse`] to validate it.
    pub fn new(date: impl Into<String>) -> Self {
        Self(date.into())
    }

    /// Returns the date as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the date, rejecting anything that is not a zero-padded
    /// `yyyy-MM-dd` calendar date.
    pub fn parse(&self) -> Result<chrono::NaiveDate, ValidationError> {
        if self.0.len() != 10 {
            return Err(ValidationError::InvalidDate(self.0.clone()));
        }
        chrono::NaiveDate::parse_from_str(&self.0, Self::LAYOUT)
            .map_err(|_| ValidationError::InvalidDate(self.0.clone()))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// FACT HASH (32 bytes)
// =============================================================================

/// Keccak-256 digest of a fact's canonical bytes. Signatures sign this value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FactHash(pub [u8; 32]);

impl FactHash {
    /// Hashes the given canonical bytes.
    #[must_use]
    pub fn digest(bytes: &[u8]) -> Self {
        Self(Keccak256::digest(bytes).into())
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for FactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for FactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..4]))?;
        write!(f, "...{}", hex::encode(&self.0[28..]))
    }
}

// =============================================================================
// SIGN
// =============================================================================

/// One signature over a fact hash, together with the public key that made it.
///
/// Which keys count, and with what weight, is decided by the account
/// subsystem behind [`crate::ports::AccountLedger::check_signs`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sign {
    /// SEC1-encoded public key of the signer.
    #[serde(with = "hex")]
    pub signer: Vec<u8>,
    /// Signature bytes.
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

impl Sign {
    /// Creates a sign entry.
    pub fn new(signer: Vec<u8>, signature: Vec<u8>) -> Self {
        Self { signer, signature }
    }
}

// =============================================================================
// TESTS
// =============================================================================
