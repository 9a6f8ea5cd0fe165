//! # Wire Flows
//!
//! Operations that reach the chain as hinted JSON, decoded through the hint
//! registry before processing.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use qc_18_credentials::prelude::*;
    use serde_json::{json, Value};

    fn encode(chain: &ChainHarness, fact: impl Into<Fact>) -> Value {
        let fact = fact.into();
        let sender = *fact.sender();
        encode_operation(&chain.sign(fact, sender).unwrap()).unwrap()
    }

    #[test]
    fn test_full_lifecycle_over_wire() {
        let mut chain = ChainHarness::new().unwrap();

        for fact in [
            Fact::from(create_service(OWNER)),
            Fact::from(add_template("edu-degree")),
            Fact::from(assign(vec![assign_item(
                HOLDER,
                "edu-degree",
                "cred-1",
                (100, 200),
                "did:example:H",
            )])),
            Fact::from(revoke(HOLDER, "edu-degree", "cred-1")),
        ] {
            let json = encode(&chain, fact).to_string();
            chain.submit_json(&json).unwrap();
        }

        let credential = chain.credential("edu-degree", "cred-1").unwrap();
        assert!(!credential.is_active());
        assert_eq!(chain.balance(&OWNER), INITIAL_BALANCE - 4 * FEE);
    }

    #[test]
    fn test_fact_carries_hint() {
        let chain = ChainHarness::new().unwrap();

        let encoded = encode(&chain, create_service(OWNER));

        assert_eq!(
            encoded["fact"]["_hint"],
            json!("credential-create-service-fact-v0.0.1")
        );
        assert_eq!(encoded["signs"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_tampered_fact_is_refused_before_processing() {
        let mut chain = ChainHarness::new().unwrap();
        let mut encoded = encode(&chain, create_service(OWNER));
        encoded["fact"]["service_id"] = json!("svc2");

        let err = chain.submit_json(&encoded.to_string()).unwrap_err();

        assert!(matches!(
            err,
            HarnessError::Codec(CodecError::HashMismatch { .. })
        ));
        assert_eq!(chain.processors.stats().rejected, 0);
        assert!(chain.design().is_none());
    }

    #[test]
    fn test_rehashed_tampering_fails_signature_check() {
        let mut chain = ChainHarness::new().unwrap();
        let mut encoded = encode(&chain, create_service(OWNER));
        encoded["fact"]["service_id"] = json!("svc2");
        encoded
            .as_object_mut()
            .unwrap()
            .remove("hash");

        let err = chain.submit_json(&encoded.to_string()).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::InvalidSigning(SignError::VerificationFailed(_)))
        ));
    }

    #[test]
    fn test_unknown_hint_is_refused() {
        let mut chain = ChainHarness::new().unwrap();
        let mut encoded = encode(&chain, create_service(OWNER));
        encoded["fact"]["_hint"] = json!("credential-create-service-fact-v9.9.9");

        let err = chain.submit_json(&encoded.to_string()).unwrap_err();

        assert!(matches!(
            err,
            HarnessError::Codec(CodecError::UnknownHint(_))
        ));
    }
}
