//! Ledger demo host
//!
//! Owns one engine for its lifetime: opens it, records a host application,
//! its verification and a distributed payment, prints the summary and
//! shuts the engine down.

use rust_decimal::Decimal;
use serde_json::json;
use stay_ledger::{Config, HostData, HostRegistration, Ledger, Stakeholder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting VillageStay ledger demo");

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let ledger = Ledger::open(config).await?;

    let registration = HostRegistration::new(HostData {
        personal_info: json!({ "fullName": "Asha Devi", "village": "Khonoma", "state": "Nagaland" }),
        property_info: json!({ "propertyType": "traditional house", "rooms": 2, "capacity": 4 }),
        cultural_offerings: json!({ "traditionalSkills": ["weaving"], "languages": ["Angami", "English"] }),
        verification: json!({ "idProof": "aadhaar.pdf", "propertyPhotos": ["front.jpg"] }),
    });
    let registration_id = registration.id.clone();

    let hash = ledger.submit_registration(registration).await?;
    tracing::info!(%registration_id, %hash, "Host application recorded");

    let hash = ledger
        .submit_verification(&registration_id, json!({ "documentsChecked": true }))
        .await?;
    tracing::info!(%registration_id, %hash, "Host application verified");

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
        .await?;
    tracing::info!(
        payment_id = %receipt.payment.id,
        fee = %receipt.payment.transaction_fee,
        drift = %receipt.payment.distribution_drift(),
        "Payment distributed"
    );

    let stats = ledger.get_stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    ledger.shutdown().await?;
    tracing::info!("Ledger demo finished");
    Ok(())
}
