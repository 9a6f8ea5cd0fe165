//! # Account Keys
//!
//! secp256k1 keys registered for an account, with per-key weights and a
//! threshold. A set of signs is accepted when the summed weight of distinct
//! keys that produced a valid signature over the message reaches the
//! threshold.
//!
//! Signs cover the 32-byte fact hash directly (prehash signing), so no
//! second digest is applied.

use crate::domain::value_objects::{FactHash, Sign};
use crate::errors::SignError;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use std::collections::BTreeSet;

/// One registered public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountKey {
    /// SEC1-encoded (compressed) public key.
    pub key: Vec<u8>,
    pub weight: u32,
}

/// The key set of an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountKeys {
    keys: Vec<AccountKey>,
    threshold: u32,
}

impl AccountKeys {
    pub fn new(keys: Vec<AccountKey>, threshold: u32) -> Self {
        Self { keys, threshold }
    }

    /// A single key that alone meets the threshold.
    pub fn single(public_key: Vec<u8>) -> Self {
        Self::new(
            vec![AccountKey {
                key: public_key,
                weight: 100,
            }],
            100,
        )
    }

    pub fn keys(&self) -> &[AccountKey] {
        &self.keys
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Checks `signs` over `message`.
    ///
    /// Every sign must come from a registered key and verify. A key that
    /// signs twice is counted once.
    pub fn verify(&self, message: &[u8], signs: &[Sign]) -> Result<(), SignError> {
        if signs.is_empty() {
            return Err(SignError::NoSigns);
        }

        let mut counted = BTreeSet::new();
        let mut weight: u32 = 0;
        for sign in signs {
            let entry = self
                .keys
                .iter()
                .find(|k| k.key == sign.signer)
                .ok_or_else(|| SignError::UnknownSigner(hex::encode(&sign.signer)))?;

            verify_one(&entry.key, message, &sign.signature)?;

            if counted.insert(entry.key.as_slice()) {
                weight = weight.saturating_add(entry.weight);
            }
        }

        if weight < self.threshold {
            return Err(SignError::ThresholdNotMet {
                weight,
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}

fn verify_one(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), SignError> {
    let failed = || SignError::VerificationFailed(hex::encode(public_key));

    let verifying_key = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| failed())?;
    let signature = Signature::from_slice(signature).map_err(|_| failed())?;
    verifying_key
        .verify_prehash(message, &signature)
        .map_err(|_| failed())
}

/// A local signing key, used by tests and tooling to produce signs.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Deterministic key from a 32-byte seed. Fails if the seed is not a
    /// valid secp256k1 scalar.
    pub fn from_seed(seed: [u8; 32]) -> Result<Self, SignError> {
        let signing_key =
            SigningKey::from_slice(&seed).map_err(|e| SignError::Signing(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_sec1_bytes().to_vec()
    }

    pub fn sign(&self, hash: &FactHash) -> Result<Sign, SignError> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(hash.as_bytes())
            .map_err(|e| SignError::Signing(e.to_string()))?;
        Ok(Sign::new(self.public_key(), signature.to_bytes().to_vec()))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}
