//! # Credential Lifecycle Flows
//!
//! Drives a single credential service through its whole life on one chain:
//!
//! 1. **CreateCredentialService**: empty design under the contract account
//! 2. **AddTemplate**: template registered, design updated
//! 3. **Assign**: credentials issued, holder DIDs recorded
//! 4. **Revoke**: credentials flagged, never deleted
//!
//! Every accepted operation charges one fee to the sender; every rejected
//! operation leaves state and balances untouched.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use qc_18_credentials::prelude::*;

    // =============================================================================
    // CREATE CREDENTIAL SERVICE
    // =============================================================================

    #[test]
    fn test_create_service_on_empty_ledger() {
        let mut chain = ChainHarness::new().unwrap();

        let values = chain.sign_and_submit(create_service(OWNER)).unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(
            values[0].key,
            StateKey::design(&CONTRACT, &ServiceId::new(SERVICE))
        );
        assert_eq!(
            values[1].op,
            MergeOp::Debit(FEE),
            "fee delta comes last"
        );

        let design = chain.design().unwrap();
        assert!(design.policy().templates().is_empty());
        assert!(design.policy().holders().is_empty());
        assert_eq!(design.policy().credential_count(), 0);
        assert_eq!(chain.balance(&OWNER), INITIAL_BALANCE - FEE);
    }

    #[test]
    fn test_create_service_twice_is_rejected() {
        let mut chain = ChainHarness::new().unwrap();
        chain.sign_and_submit(create_service(OWNER)).unwrap();

        let err = chain.sign_and_submit(create_service(OWNER)).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::ServiceAlreadyExists { .. })
        ));
        assert_eq!(chain.balance(&OWNER), INITIAL_BALANCE - FEE);
    }

    #[test]
    fn test_create_service_by_non_owner_is_rejected() {
        let mut chain = ChainHarness::new().unwrap();

        let err = chain.sign_and_submit(create_service(STRANGER)).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::NotContractOwner { .. })
        ));
        assert!(chain.design().is_none());
        assert_eq!(chain.balance(&STRANGER), INITIAL_BALANCE);
    }

    #[test]
    fn test_signature_of_another_account_is_rejected() {
        let mut chain = ChainHarness::new().unwrap();

        let op = chain.sign(create_service(OWNER), STRANGER).unwrap();
        let err = chain.submit(&op).unwrap_err();
        assert!(matches!(
            err.reason(),
            Some(ReasonError::InvalidSigning(SignError::UnknownSigner(_)))
        ));

        let unsigned = chain.sign(create_service(OWNER), HOLDER).unwrap();
        assert!(unsigned.signs().is_empty());
        let err = chain.submit(&unsigned).unwrap_err();
        assert!(matches!(
            err.reason(),
            Some(ReasonError::InvalidSigning(SignError::NoSigns))
        ));
    }

    // =============================================================================
    // ADD TEMPLATE
    // =============================================================================

    #[test]
    fn test_add_template_updates_design() {
        let mut chain = ChainHarness::new().unwrap();
        chain.sign_and_submit(create_service(OWNER)).unwrap();

        let values = chain.sign_and_submit(add_template("edu-degree")).unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(
            chain.design().unwrap().policy().templates(),
            &["edu-degree".to_string()]
        );
        let template_key =
            StateKey::template(&CONTRACT, &ServiceId::new(SERVICE), "edu-degree");
        assert!(matches!(
            chain.ledger.get(&template_key),
            Some(StateValue::Template(t)) if t.metadata == metadata()
        ));
        assert_eq!(chain.balance(&OWNER), INITIAL_BALANCE - 2 * FEE);
    }

    #[test]
    fn test_add_template_requires_service() {
        let mut chain = ChainHarness::new().unwrap();

        let err = chain.sign_and_submit(add_template("edu-degree")).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::ServiceNotFound { .. })
        ));
    }

    #[test]
    fn test_add_template_twice_is_rejected() {
        let mut chain = harness_with_template().unwrap();

        let err = chain.sign_and_submit(add_template("edu-degree")).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::TemplateAlreadyExists { .. })
        ));
        assert_eq!(chain.design().unwrap().policy().templates().len(), 1);
    }

    #[test]
    fn test_templates_keep_insertion_order() {
        let mut chain = harness_with_template().unwrap();
        chain.sign_and_submit(add_template("awards")).unwrap();
        chain.sign_and_submit(add_template("bootcamp")).unwrap();

        assert_eq!(
            chain.design().unwrap().policy().templates(),
            &[
                "edu-degree".to_string(),
                "awards".to_string(),
                "bootcamp".to_string()
            ]
        );
    }

    // =============================================================================
    // ASSIGN
    // =============================================================================

    #[test]
    fn test_assign_issues_credential() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");

        let values = chain.sign_and_submit(assign(vec![item])).unwrap();

        // credential, holder DID, design, fee
        assert_eq!(values.len(), 4);
        assert!(matches!(values[3].op, MergeOp::Debit(FEE)));

        let credential = chain.credential("edu-degree", "cred-1").unwrap();
        assert_eq!(credential.holder, HOLDER);
        assert_eq!(credential.valid_from, 100);
        assert_eq!(credential.valid_until, 200);
        assert_eq!(credential.status, CredentialStatus::Active);

        assert_eq!(chain.holder_did(&HOLDER).unwrap().did, "did:example:H");

        let design = chain.design().unwrap();
        assert_eq!(design.policy().credential_count(), 1);
        assert_eq!(design.policy().holder(&HOLDER).unwrap().credential_count, 1);
    }

    #[test]
    fn test_assign_unknown_template_is_rejected() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "unknown", "cred-1", (100, 200), "did:example:H");

        let err = chain.sign_and_submit(assign(vec![item])).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::TemplateNotRegistered { .. })
        ));
    }

    #[test]
    fn test_assign_empty_or_inverted_window_is_invalid() {
        let mut chain = harness_with_template().unwrap();

        for (from, until) in [(150, 150), (200, 100)] {
            let item = assign_item(HOLDER, "edu-degree", "cred-1", (from, until), "did:example:H");
            let err = chain.sign_and_submit(assign(vec![item])).unwrap_err();
            assert!(matches!(
                err.process_error(),
                Some(ProcessError::InvalidOperation(
                    ValidationError::InvalidValidityWindow { .. }
                ))
            ));
        }
        assert!(chain.credential("edu-degree", "cred-1").is_none());
    }

    #[test]
    fn test_assign_to_contract_is_invalid() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(CONTRACT, "edu-degree", "cred-1", (100, 200), "did:example:C");

        let err = chain.sign_and_submit(assign(vec![item])).unwrap_err();

        assert!(matches!(
            err.process_error(),
            Some(ProcessError::InvalidOperation(
                ValidationError::HolderIsContract(_)
            ))
        ));
    }

    #[test]
    fn test_assign_existing_credential_is_rejected() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");
        chain.sign_and_submit(assign(vec![item.clone()])).unwrap();

        let err = chain.sign_and_submit(assign(vec![item])).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::CredentialAlreadyExists { .. })
        ));
        assert_eq!(chain.design().unwrap().policy().credential_count(), 1);
    }

    #[test]
    fn test_duplicate_items_in_batch_are_invalid() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");

        let err = chain
            .sign_and_submit(assign(vec![item.clone(), item]))
            .unwrap_err();

        assert!(matches!(
            err.process_error(),
            Some(ProcessError::InvalidOperation(ValidationError::DuplicateItem(_)))
        ));
    }

    #[test]
    fn test_batch_applies_all_or_nothing() {
        let mut chain = harness_with_template().unwrap();
        let state_before = chain.ledger.len();
        let balance_before = chain.balance(&OWNER);

        let good = assign_item(HOLDER, "edu-degree", "cred-2", (100, 200), "did:example:H");
        let bad = assign_item(OTHER_HOLDER, "missing", "cred-3", (100, 200), "did:example:O");
        let err = chain.sign_and_submit(assign(vec![good, bad])).unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::TemplateNotRegistered { .. })
        ));
        assert!(chain.credential("edu-degree", "cred-2").is_none());
        assert!(chain.holder_did(&HOLDER).is_none());
        assert_eq!(chain.ledger.len(), state_before);
        assert_eq!(chain.balance(&OWNER), balance_before);
    }

    #[test]
    fn test_batch_charges_one_fee() {
        let mut chain = harness_with_template().unwrap();
        let balance_before = chain.balance(&OWNER);
        let items = vec![
            assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H"),
            assign_item(OTHER_HOLDER, "edu-degree", "cred-2", (100, 200), "did:example:O"),
        ];

        chain.sign_and_submit(assign(items)).unwrap();

        assert_eq!(chain.balance(&OWNER), balance_before - FEE);
        let design = chain.design().unwrap();
        assert_eq!(design.policy().credential_count(), 2);
        assert_eq!(design.policy().holders().len(), 2);
    }

    #[test]
    fn test_insufficient_balance_is_rejected() {
        let mut chain = harness_with_template().unwrap();
        chain
            .ledger
            .set_balance(OWNER, CurrencyId::new(CURRENCY), FEE - 1);
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");

        let err = chain.sign_and_submit(assign(vec![item])).unwrap_err();

        assert_eq!(
            err.reason(),
            Some(&ReasonError::InsufficientBalance {
                required: FEE,
                available: FEE - 1,
            })
        );
        assert!(chain.credential("edu-degree", "cred-1").is_none());
        assert_eq!(chain.balance(&OWNER), FEE - 1);
    }

    // =============================================================================
    // REVOKE
    // =============================================================================

    #[test]
    fn test_revoke_marks_credential() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");
        chain.sign_and_submit(assign(vec![item])).unwrap();
        let revoked_at = chain.height();

        let values = chain
            .sign_and_submit(revoke(HOLDER, "edu-degree", "cred-1"))
            .unwrap();

        assert_eq!(values.len(), 2);
        let credential = chain.credential("edu-degree", "cred-1").unwrap();
        assert_eq!(
            credential.status,
            CredentialStatus::Revoked { height: revoked_at }
        );
        assert_eq!(credential.did, "did:example:H");
        // design counters are not rolled back
        assert_eq!(chain.design().unwrap().policy().credential_count(), 1);
    }

    #[test]
    fn test_revoke_twice_is_rejected() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");
        chain.sign_and_submit(assign(vec![item])).unwrap();
        let revoked_at = chain.height();
        chain
            .sign_and_submit(revoke(HOLDER, "edu-degree", "cred-1"))
            .unwrap();
        let balance = chain.balance(&OWNER);

        let err = chain
            .sign_and_submit(revoke(HOLDER, "edu-degree", "cred-1"))
            .unwrap_err();

        assert!(matches!(
            err.reason(),
            Some(ReasonError::AlreadyRevoked { .. })
        ));
        let credential = chain.credential("edu-degree", "cred-1").unwrap();
        assert_eq!(
            credential.status,
            CredentialStatus::Revoked { height: revoked_at }
        );
        assert_eq!(chain.balance(&OWNER), balance);
    }

    #[test]
    fn test_revoke_checks_holder_and_existence() {
        let mut chain = harness_with_template().unwrap();
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");
        chain.sign_and_submit(assign(vec![item])).unwrap();

        let err = chain
            .sign_and_submit(revoke(OTHER_HOLDER, "edu-degree", "cred-1"))
            .unwrap_err();
        assert!(matches!(
            err.reason(),
            Some(ReasonError::HolderMismatch { .. })
        ));

        let err = chain
            .sign_and_submit(revoke(HOLDER, "edu-degree", "cred-9"))
            .unwrap_err();
        assert!(matches!(
            err.reason(),
            Some(ReasonError::CredentialNotFound { .. })
        ));
        assert!(chain.credential("edu-degree", "cred-1").unwrap().is_active());
    }

    // =============================================================================
    // DIGEST & STATS
    // =============================================================================

    #[test]
    fn test_digest_follows_committed_state() {
        let mut chain = harness_with_template().unwrap();
        let service = ServiceId::new(SERVICE);
        let item = assign_item(HOLDER, "edu-degree", "cred-1", (100, 200), "did:example:H");
        let assigned_at = chain.height();
        chain.sign_and_submit(assign(vec![item])).unwrap();

        let indexed = chain
            .digest
            .credential(&CONTRACT, &service, "edu-degree", "cred-1")
            .unwrap();
        assert_eq!(indexed.height, assigned_at);
        assert!(indexed.value.is_active());

        let revoked_at = chain.height();
        chain
            .sign_and_submit(revoke(HOLDER, "edu-degree", "cred-1"))
            .unwrap();
        let indexed = chain
            .digest
            .credential(&CONTRACT, &service, "edu-degree", "cred-1")
            .unwrap();
        assert_eq!(indexed.height, revoked_at);
        assert!(!indexed.value.is_active());
        assert_eq!(chain.digest.last_height(), Some(revoked_at));

        assert_eq!(
            chain
                .digest
                .design(&CONTRACT, &service)
                .map(|d| d.value.clone()),
            chain.design()
        );
        assert!(chain
            .digest
            .template(&CONTRACT, &service, "edu-degree")
            .is_some());
        assert_eq!(
            chain
                .digest
                .holder_did(&CONTRACT, &service, &HOLDER)
                .map(|d| d.value.did.as_str()),
            Some("did:example:H")
        );
    }

    #[test]
    fn test_digest_pages_by_credential_id() {
        let config = CredentialConfig {
            digest: DigestConfig { max_page_size: 3 },
            ..CredentialConfig::default()
        };
        let mut chain = ChainHarness::with_config(config).unwrap();
        chain.sign_and_submit(create_service(OWNER)).unwrap();
        chain.sign_and_submit(add_template("edu-degree")).unwrap();
        let items = (1..=5)
            .map(|i| {
                assign_item(
                    HOLDER,
                    "edu-degree",
                    &format!("cred-{i}"),
                    (100, 200),
                    "did:example:H",
                )
            })
            .collect();
        chain.sign_and_submit(assign(items)).unwrap();

        let service = ServiceId::new(SERVICE);
        let ids = |page: PageRequest| -> Vec<String> {
            chain
                .digest
                .credentials_by_template(&CONTRACT, &service, "edu-degree", &page)
                .into_iter()
                .map(|c| c.value.credential_id.clone())
                .collect()
        };

        assert_eq!(
            ids(PageRequest {
                limit: Some(2),
                ..PageRequest::default()
            }),
            ["cred-1", "cred-2"]
        );
        assert_eq!(
            ids(PageRequest {
                offset: Some("cred-2".into()),
                limit: Some(2),
                reverse: false,
            }),
            ["cred-3", "cred-4"]
        );
        assert_eq!(
            ids(PageRequest {
                offset: Some("cred-4".into()),
                limit: Some(2),
                reverse: true,
            }),
            ["cred-3", "cred-2"]
        );
        // oversized limits clamp to the configured maximum
        assert_eq!(
            ids(PageRequest {
                limit: Some(50),
                ..PageRequest::default()
            })
            .len(),
            3
        );
    }

    #[test]
    fn test_stats_count_outcomes() {
        let mut chain = ChainHarness::new().unwrap();
        chain.sign_and_submit(create_service(OWNER)).unwrap();
        let _ = chain.sign_and_submit(create_service(OWNER));
        let _ = chain.sign_and_submit(create_service(STRANGER));

        let stats = chain.processors.stats();
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.fatal, 0);
    }
}
