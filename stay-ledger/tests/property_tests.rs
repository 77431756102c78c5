//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Linkage: every record points at its predecessor's hash
//! - Reproducibility: stored hashes recompute from stored fields
//! - Tamper evidence: any payload edit breaks validation
//! - Link evidence: removing or reordering records breaks validation
//! - Round trip: export then import yields an identical chain
//! - Distribution: shares follow round-half-up of amount × percentage

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use stay_ledger::{
    chain::{build_record, Chain},
    contract::{share_amount, transaction_fee},
    crypto::record_hash,
    types::{
        Currency, HostData, HostRegistration, Payload, PaymentRecord, StakeholderShare,
        VerificationRecord,
    },
    validate_wallet_address, Config, HashAlgorithm, Ledger, Stakeholder,
};

/// Strategy for generating whole-unit amounts
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(Decimal::from)
}

/// Strategy for generating currencies
fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::INR), Just(Currency::ETH), Just(Currency::BTC)]
}

/// Strategy for generating hash algorithms
fn algorithm_strategy() -> impl Strategy<Value = HashAlgorithm> {
    prop_oneof![
        Just(HashAlgorithm::Sha256),
        Just(HashAlgorithm::Blake3),
        Just(HashAlgorithm::Legacy),
    ]
}

/// Strategy for generating wallet addresses
fn address_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{40}".prop_map(|body| format!("0x{}", body))
}

/// Strategy for generating payments
fn payment_strategy() -> impl Strategy<Value = PaymentRecord> {
    (
        amount_strategy(),
        currency_strategy(),
        address_strategy(),
        address_strategy(),
        prop::collection::vec(("[a-z_]{3,12}", 0u32..50), 0..6),
    )
        .prop_map(|(amount, currency, from_address, to_address, shares)| {
            let stakeholder_distribution = shares
                .into_iter()
                .map(|(stakeholder_id, percentage)| StakeholderShare {
                    stakeholder_id,
                    amount: share_amount(amount, Decimal::from(percentage)).unwrap(),
                    wallet_address: to_address.clone(),
                })
                .collect();

            PaymentRecord {
                id: PaymentRecord::generate_id(),
                amount,
                currency,
                from_address,
                to_address,
                stakeholder_distribution,
                timestamp: Utc::now(),
                confirmations: 6,
                gas_used: None,
                transaction_fee: transaction_fee(amount, 100).unwrap(),
            }
        })
}

/// Strategy for generating registrations
fn registration_strategy() -> impl Strategy<Value = HostRegistration> {
    ("[A-Za-z ]{1,20}", "[A-Za-z]{1,12}", 1u32..20).prop_map(|(name, village, rooms)| {
        HostRegistration::new(HostData {
            personal_info: json!({ "name": name, "village": village }),
            property_info: json!({ "rooms": rooms }),
            ..HostData::default()
        })
    })
}

/// Strategy for generating record payloads of every submittable kind
fn payload_strategy() -> impl Strategy<Value = Payload> {
    prop_oneof![
        payment_strategy().prop_map(Payload::Payment),
        registration_strategy().prop_map(Payload::Registration),
        "[a-z]{1,10}".prop_map(|doc| Payload::Verification(VerificationRecord::new(
            format!("host_{}", doc),
            json!({ "document": doc }),
        ))),
    ]
}

/// Build a chain by appending payloads in order
fn build_chain(algorithm: HashAlgorithm, payloads: Vec<Payload>) -> Chain {
    let mut chain = Chain::new(algorithm, "VillageStay Genesis Block").unwrap();
    for payload in payloads {
        let record = build_record(algorithm, chain.latest_hash(), payload).unwrap();
        chain.push(record);
    }
    chain
}

/// Ledger with a short mining delay so properties run quickly
async fn create_test_ledger() -> Ledger {
    let mut config = Config::default();
    config.mining.delay_ms = 1;
    Ledger::open(config).await.unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: Every record links to its predecessor
    #[test]
    fn prop_records_link_to_predecessor(
        algorithm in algorithm_strategy(),
        payloads in prop::collection::vec(payload_strategy(), 0..20),
    ) {
        let count = payloads.len();
        let chain = build_chain(algorithm, payloads);

        prop_assert_eq!(chain.len(), count + 1);
        for pair in chain.records().windows(2) {
            prop_assert_eq!(&pair[1].previous_hash, &pair[0].linking_hash);
        }
        prop_assert!(chain.is_valid());
    }

    /// Property: Stored hashes recompute from stored fields
    #[test]
    fn prop_hashes_reproducible(
        algorithm in algorithm_strategy(),
        payloads in prop::collection::vec(payload_strategy(), 1..10),
    ) {
        let chain = build_chain(algorithm, payloads);
        for record in &chain.records()[1..] {
            prop_assert_eq!(record_hash(algorithm, record).unwrap(), record.linking_hash.clone());
        }
    }

    /// Property: Editing any payment amount is detected at its index
    #[test]
    fn prop_tampered_amount_detected(
        payments in prop::collection::vec(payment_strategy(), 1..10),
        victim in any::<prop::sample::Index>(),
        delta in 1i64..1000,
    ) {
        let payloads = payments.into_iter().map(Payload::Payment).collect();
        let chain = build_chain(HashAlgorithm::Sha256, payloads);

        let mut records = chain.records().to_vec();
        let index = 1 + victim.index(records.len() - 1);
        if let Payload::Payment(payment) = &mut records[index].payload {
            payment.amount += Decimal::from(delta);
        }

        let tampered = Chain::from_records(records, HashAlgorithm::Sha256).unwrap();
        prop_assert!(!tampered.is_valid());
        prop_assert_eq!(tampered.first_invalid(), Some(index));
    }

    /// Property: Dropping any record with a successor breaks the link there
    #[test]
    fn prop_removed_record_detected(
        algorithm in algorithm_strategy(),
        payloads in prop::collection::vec(payload_strategy(), 2..10),
        victim in any::<prop::sample::Index>(),
    ) {
        let chain = build_chain(algorithm, payloads);

        let mut records = chain.records().to_vec();
        let index = 1 + victim.index(records.len() - 2);
        records.remove(index);

        let truncated = Chain::from_records(records, algorithm).unwrap();
        prop_assert_eq!(truncated.first_invalid(), Some(index));
    }

    /// Property: Swapping adjacent records is detected at the first of them
    #[test]
    fn prop_swapped_records_detected(
        payloads in prop::collection::vec(payload_strategy(), 2..10),
        victim in any::<prop::sample::Index>(),
    ) {
        let chain = build_chain(HashAlgorithm::Sha256, payloads);

        let mut records = chain.records().to_vec();
        let index = 1 + victim.index(records.len() - 2);
        records.swap(index, index + 1);

        let reordered = Chain::from_records(records, HashAlgorithm::Sha256).unwrap();
        prop_assert_eq!(reordered.first_invalid(), Some(index));
    }

    /// Property: Export then parse yields the same records
    #[test]
    fn prop_export_parse_round_trip(
        algorithm in algorithm_strategy(),
        payloads in prop::collection::vec(payload_strategy(), 0..10),
    ) {
        let chain = build_chain(algorithm, payloads);
        let exported = chain.export().unwrap();
        let parsed = Chain::parse(&exported, algorithm).unwrap();

        prop_assert_eq!(parsed.records(), chain.records());
        prop_assert!(parsed.is_valid());
        prop_assert_eq!(parsed.export().unwrap(), exported);
    }

    /// Property: Stats count every kind and sum payment amounts
    #[test]
    fn prop_stats_match_contents(payloads in prop::collection::vec(payload_strategy(), 0..20)) {
        let payments = payloads.iter().filter(|p| matches!(p, Payload::Payment(_))).count();
        let registrations = payloads.iter().filter(|p| matches!(p, Payload::Registration(_))).count();
        let verifications = payloads.iter().filter(|p| matches!(p, Payload::Verification(_))).count();
        let value: Decimal = payloads
            .iter()
            .filter_map(|p| match p {
                Payload::Payment(payment) => Some(payment.amount),
                _ => None,
            })
            .sum();

        let chain = build_chain(HashAlgorithm::Sha256, payloads);
        let stats = chain.stats();

        prop_assert_eq!(stats.total_blocks, chain.len());
        prop_assert_eq!(stats.total_payments, payments);
        prop_assert_eq!(stats.total_registrations, registrations);
        prop_assert_eq!(stats.total_verifications, verifications);
        prop_assert_eq!(stats.total_value, value);
        prop_assert!(stats.is_valid);
        prop_assert_eq!(stats.latest_block_hash, chain.latest_hash().to_string());
    }

    /// Property: Each share is within half a unit of the exact split
    #[test]
    fn prop_share_within_half_unit(amount in amount_strategy(), percentage in 0u32..=100) {
        let percentage = Decimal::from(percentage);
        let exact = amount * percentage / Decimal::ONE_HUNDRED;
        let share = share_amount(amount, percentage).unwrap();

        prop_assert!(share.fract().is_zero());
        prop_assert!((share - exact).abs() <= Decimal::new(5, 1));
    }

    /// Property: Well-formed addresses validate, truncated ones do not
    #[test]
    fn prop_wallet_address_shape(address in address_strategy()) {
        prop_assert!(validate_wallet_address(&address));
        prop_assert!(validate_wallet_address(&address.to_uppercase().replacen("0X", "0x", 1)));
        prop_assert!(!validate_wallet_address(&address[..address.len() - 1]));
        prop_assert!(!validate_wallet_address(&address[2..]));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: Submissions are mined in order and the chain stays valid
    #[test]
    fn prop_submissions_mined_in_order(payments in prop::collection::vec(payment_strategy(), 1..8)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ledger = create_test_ledger().await;

            let mut hashes = Vec::new();
            for payment in payments {
                hashes.push(ledger.submit_payment(payment).await.unwrap());
            }

            let records = ledger.chain_snapshot().await.unwrap();
            prop_assert_eq!(records.len(), hashes.len() + 1);
            for (record, hash) in records[1..].iter().zip(&hashes) {
                prop_assert_eq!(&record.linking_hash, hash);
            }
            prop_assert!(ledger.is_chain_valid().await.unwrap());

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }

    /// Property: Importing an exported chain is a no-op
    #[test]
    fn prop_export_import_idempotent(registrations in prop::collection::vec(registration_strategy(), 1..6)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ledger = create_test_ledger().await;
            for registration in registrations {
                ledger.submit_registration(registration).await.unwrap();
            }

            let exported = ledger.export_chain().await.unwrap();
            prop_assert!(ledger.import_chain(&exported).await.unwrap());
            prop_assert_eq!(ledger.export_chain().await.unwrap(), exported);

            ledger.shutdown().await.unwrap();
            Ok(())
        })?;
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_host_onboarding_and_payment() {
        let ledger = create_test_ledger().await;

        // 1. Host applies
        let registration = HostRegistration::new(HostData {
            personal_info: json!({ "name": "Asha", "village": "Khonoma" }),
            property_info: json!({ "rooms": 3 }),
            ..HostData::default()
        });
        let registration_id = registration.id.clone();
        ledger.submit_registration(registration).await.unwrap();

        // 2. Admin verifies
        ledger
            .submit_verification(&registration_id, json!({ "aadhaar": "checked" }))
            .await
            .unwrap();

        // 3. Guest pays through the contract
        let contract = ledger.payment_contract();
        let receipt = contract
            .execute_payment(
                Decimal::from(5250),
                &[
                    Stakeholder::new("host", 25),
                    Stakeholder::new("guide", 30),
                    Stakeholder::new("artisan", 15),
                    Stakeholder::new("cook", 10),
                    Stakeholder::new("community_fund", 12),
                    Stakeholder::new("transport", 8),
                ],
            )
            .await
            .unwrap();

        let record = ledger
            .get_transaction(&receipt.linking_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.as_payment(), Some(&receipt.payment));

        let by_payer = ledger
            .get_transactions_by_address(&receipt.payment.from_address)
            .await
            .unwrap();
        assert_eq!(by_payer.len(), 1);

        let stats = ledger.get_stats().await.unwrap();
        assert_eq!(stats.total_blocks, 4);
        assert_eq!(stats.total_payments, 1);
        assert_eq!(stats.total_registrations, 1);
        assert_eq!(stats.total_verifications, 1);
        assert_eq!(stats.total_value, Decimal::from(5250));
        assert!(stats.is_valid);

        assert_eq!(ledger.shutdown().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_tampered_export_rejected_on_validation() {
        let ledger = create_test_ledger().await;
        ledger
            .submit_registration(HostRegistration::new(HostData::default()))
            .await
            .unwrap();

        let exported = ledger.export_chain().await.unwrap();
        let mut records: serde_json::Value = serde_json::from_str(&exported).unwrap();
        records[1]["data"]["verificationHash"] = json!("forged");
        let tampered = serde_json::to_string(&records).unwrap();

        assert!(!ledger.import_chain(&tampered).await.unwrap());
        assert!(!ledger.is_chain_valid().await.unwrap());

        ledger.shutdown().await.unwrap();
    }
}
