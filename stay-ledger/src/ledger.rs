//! Main ledger orchestration layer
//!
//! This module ties together the chain, the mining actor and metrics
//! into the engine API used by the host application.
//!
//! # Example
//!
//! ```no_run
//! use stay_ledger::{Config, Ledger};
//! use stay_ledger::types::{HostData, HostRegistration};
//!
//! #[tokio::main]
//! async fn main() -> stay_ledger::Result<()> {
//!     let ledger = Ledger::open(Config::default()).await?;
//!
//!     let registration = HostRegistration::new(HostData::default());
//!     let hash = ledger.submit_registration(registration).await?;
//!     assert!(ledger.get_transaction(&hash).await?.is_some());
//!
//!     ledger.shutdown().await?;
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    chain::Chain,
    contract::PaymentContract,
    metrics::Metrics,
    types::{
        ChainStats, HostRegistration, Payload, PaymentRecord, Record, RegistrationStatus,
        VerificationRecord,
    },
    Config, Result,
};
use serde_json::Value;
use tokio::time::Duration;

/// Ledger engine
///
/// Owned by the host application; clone [`Ledger::handle`] to share it.
#[derive(Debug)]
pub struct Ledger {
    /// Actor handle for async operations
    handle: LedgerHandle,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration
    ///
    /// Creates the genesis record and spawns the mining actor; must be
    /// called inside a Tokio runtime.
    pub async fn open(config: Config) -> Result<Self> {
        let chain = Chain::new(config.hashing.algorithm, &config.genesis_message)?;
        let metrics = Metrics::new()?;

        let handle = spawn_ledger_actor(
            chain,
            Duration::from_millis(config.mining.delay_ms),
            config.mining.mailbox_capacity,
            metrics.clone(),
        );

        tracing::info!(
            service = %config.service_name,
            version = %config.service_version,
            algorithm = %config.hashing.algorithm,
            mining_delay_ms = config.mining.delay_ms,
            "Ledger opened"
        );

        Ok(Self {
            handle,
            metrics,
            config,
        })
    }

    /// Cloneable handle to the mining actor
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Payment contract bound to this ledger
    pub fn payment_contract(&self) -> PaymentContract {
        PaymentContract::new(self.handle(), self.config.contract.clone())
    }

    /// Record a payment; resolves with its linking hash once mined
    pub async fn submit_payment(&self, payment: PaymentRecord) -> Result<String> {
        self.handle.submit(Payload::Payment(payment)).await
    }

    /// Record a host registration; resolves with its linking hash once mined
    pub async fn submit_registration(&self, registration: HostRegistration) -> Result<String> {
        self.handle.submit(Payload::Registration(registration)).await
    }

    /// Record a verification of an earlier registration
    ///
    /// The registration record is never modified; see
    /// [`Ledger::registration_status`].
    pub async fn submit_verification(
        &self,
        registration_id: &str,
        verification_data: Value,
    ) -> Result<String> {
        let verification = VerificationRecord::new(registration_id, verification_data);
        self.handle.submit(Payload::Verification(verification)).await
    }

    /// Get record by linking hash
    pub async fn get_transaction(&self, hash: &str) -> Result<Option<Record>> {
        self.handle.get_transaction(hash).await
    }

    /// Payment records where the address is payer, payee or stakeholder
    pub async fn get_transactions_by_address(&self, address: &str) -> Result<Vec<Record>> {
        self.handle.get_transactions_by_address(address).await
    }

    /// Get registration record by registration id
    pub async fn get_host_registration(&self, registration_id: &str) -> Result<Option<Record>> {
        self.handle.get_host_registration(registration_id).await
    }

    /// Verification records for a registration, in chain order
    pub async fn get_verifications(&self, registration_id: &str) -> Result<Vec<Record>> {
        self.handle.get_verifications(registration_id).await
    }

    /// Current registration status, replayed from the chain
    pub async fn registration_status(
        &self,
        registration_id: &str,
    ) -> Result<Option<RegistrationStatus>> {
        self.handle.registration_status(registration_id).await
    }

    /// Walk the chain checking links and recomputing hashes
    pub async fn is_chain_valid(&self) -> Result<bool> {
        self.handle.is_chain_valid().await
    }

    /// Chain summary (full scan on every call)
    pub async fn get_stats(&self) -> Result<ChainStats> {
        self.handle.get_stats().await
    }

    /// Copy of the committed chain
    pub async fn chain_snapshot(&self) -> Result<Vec<Record>> {
        self.handle.get_chain().await
    }

    /// Records submitted but not yet mined
    pub async fn pending_count(&self) -> Result<usize> {
        self.handle.pending_count().await
    }

    /// Serialize the full chain as pretty-printed JSON
    pub async fn export_chain(&self) -> Result<String> {
        self.handle.export_chain().await
    }

    /// Replace the chain with an export and validate it
    ///
    /// `Ok(false)` when the text does not parse (state untouched), when
    /// records are still pending (state untouched), or when the imported
    /// chain fails validation (chain replaced).
    pub async fn import_chain(&self, data: &str) -> Result<bool> {
        self.handle.import_chain(data.to_string()).await
    }

    /// Mine every pending record now (for testing/shutdown)
    pub async fn flush_pending(&self) -> Result<usize> {
        self.handle.flush_pending().await
    }

    /// Shutdown ledger, mining whatever is still pending
    pub async fn shutdown(self) -> Result<usize> {
        self.handle.shutdown().await
    }
}
