//! Actor-based mining for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns both the chain and the pending queue
//! - Every submission is linked and enqueued in mailbox order
//! - Records move to the chain one at a time, each after its mining delay
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │      Callers (UI layer, PaymentContract, ...)         │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ Pending: VecDeque<PendingRecord>  (FIFO)       │  │
//! │  │ Timer: sleep until head.ready_at → mine_next() │  │
//! │  └────────────────────────────────────────────────┘  │
//! │                       │                               │
//! │                       ▼                               │
//! │                Chain::push()                          │
//! │       (answers the submitter with the hash)           │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::chain::{build_record, Chain};
use crate::metrics::Metrics;
use crate::types::{ChainStats, Payload, Record, RegistrationStatus};
use crate::{Error, Result};
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Duration, Instant};

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Link and enqueue a record; answered once it is mined
    Submit {
        payload: Payload,
        response: oneshot::Sender<Result<String>>,
    },

    /// Find a record by linking hash
    GetTransaction {
        hash: String,
        response: oneshot::Sender<Option<Record>>,
    },

    /// Payment records touching an address
    GetTransactionsByAddress {
        address: String,
        response: oneshot::Sender<Vec<Record>>,
    },

    /// Find a registration record by id
    GetHostRegistration {
        registration_id: String,
        response: oneshot::Sender<Option<Record>>,
    },

    /// Verification records for a registration
    GetVerifications {
        registration_id: String,
        response: oneshot::Sender<Vec<Record>>,
    },

    /// Replayed registration status
    GetRegistrationStatus {
        registration_id: String,
        response: oneshot::Sender<Option<RegistrationStatus>>,
    },

    /// Full validation pass
    ValidateChain {
        response: oneshot::Sender<bool>,
    },

    /// Chain summary
    GetStats {
        response: oneshot::Sender<ChainStats>,
    },

    /// Copy of every committed record
    GetChain {
        response: oneshot::Sender<Vec<Record>>,
    },

    /// Pending queue depth
    PendingCount {
        response: oneshot::Sender<usize>,
    },

    /// Serialize the chain
    ExportChain {
        response: oneshot::Sender<Result<String>>,
    },

    /// Replace the chain with an exported one
    ImportChain {
        data: String,
        response: oneshot::Sender<bool>,
    },

    /// Mine every pending record now, ignoring the delay
    FlushPending {
        response: oneshot::Sender<usize>,
    },

    /// Mine what is pending, then stop
    Shutdown {
        response: oneshot::Sender<usize>,
    },
}

/// Result of an import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportOutcome {
    /// Records still pending; chain untouched
    RefusedPending,
    /// Text did not parse or held no records; chain untouched
    RefusedUnparsable,
    /// Chain replaced
    Installed { valid: bool },
}

impl ImportOutcome {
    fn is_valid(self) -> bool {
        matches!(self, ImportOutcome::Installed { valid: true })
    }
}

/// Record waiting for its mining delay
#[derive(Debug)]
struct PendingRecord {
    record: Record,
    submitted_at: Instant,
    ready_at: Instant,
    response: oneshot::Sender<Result<String>>,
}

/// Actor that owns the chain and the pending queue
#[derive(Debug)]
pub struct LedgerActor {
    /// Committed records
    chain: Chain,

    /// Submitted, not yet committed
    pending: VecDeque<PendingRecord>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Delay between submission and append
    mining_delay: Duration,

    /// Metrics collector
    metrics: Metrics,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(
        chain: Chain,
        mailbox: mpsc::Receiver<LedgerMessage>,
        mining_delay: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            chain,
            pending: VecDeque::new(),
            mailbox,
            mining_delay,
            metrics,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        loop {
            let next_ready = self.pending.front().map(|p| p.ready_at);

            tokio::select! {
                msg = self.mailbox.recv() => {
                    match msg {
                        Some(LedgerMessage::Shutdown { response }) => {
                            let mined = self.mine_all();
                            tracing::info!(mined, "Ledger actor shutting down");
                            let _ = response.send(mined);
                            break;
                        }
                        Some(msg) => self.handle_message(msg),
                        None => {
                            // Every handle dropped
                            self.mine_all();
                            break;
                        }
                    }
                }

                // Head of the queue has waited out its delay
                _ = sleep_until(next_ready.unwrap_or_else(Instant::now)), if next_ready.is_some() => {
                    self.mine_next();
                }
            }
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Submit { payload, response } => self.enqueue(payload, response),

            LedgerMessage::GetTransaction { hash, response } => {
                let _ = response.send(self.chain.get_transaction(&hash).cloned());
            }

            LedgerMessage::GetTransactionsByAddress { address, response } => {
                let records = self
                    .chain
                    .transactions_by_address(&address)
                    .into_iter()
                    .cloned()
                    .collect();
                let _ = response.send(records);
            }

            LedgerMessage::GetHostRegistration {
                registration_id,
                response,
            } => {
                let _ = response.send(self.chain.host_registration(&registration_id).cloned());
            }

            LedgerMessage::GetVerifications {
                registration_id,
                response,
            } => {
                let records = self
                    .chain
                    .verifications(&registration_id)
                    .into_iter()
                    .cloned()
                    .collect();
                let _ = response.send(records);
            }

            LedgerMessage::GetRegistrationStatus {
                registration_id,
                response,
            } => {
                let _ = response.send(self.chain.registration_status(&registration_id));
            }

            LedgerMessage::ValidateChain { response } => {
                let valid = self.chain.is_valid();
                self.metrics.record_validation(valid);
                let _ = response.send(valid);
            }

            LedgerMessage::GetStats { response } => {
                let stats = self.chain.stats();
                self.metrics.record_validation(stats.is_valid);
                let _ = response.send(stats);
            }

            LedgerMessage::GetChain { response } => {
                let _ = response.send(self.chain.records().to_vec());
            }

            LedgerMessage::PendingCount { response } => {
                let _ = response.send(self.pending.len());
            }

            LedgerMessage::ExportChain { response } => {
                let _ = response.send(self.chain.export());
            }

            LedgerMessage::ImportChain { data, response } => {
                let _ = response.send(self.import(&data).is_valid());
            }

            LedgerMessage::FlushPending { response } => {
                let _ = response.send(self.mine_all());
            }

            LedgerMessage::Shutdown { .. } => {
                // Handled in main loop
            }
        }
    }

    /// Link a payload to the newest submitted record and queue it
    fn enqueue(&mut self, payload: Payload, response: oneshot::Sender<Result<String>>) {
        let previous_hash = self
            .pending
            .back()
            .map(|p| p.record.linking_hash.as_str())
            .unwrap_or_else(|| self.chain.latest_hash());

        let record = match build_record(self.chain.algorithm(), previous_hash, payload) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Failed to build record: {}", e);
                let _ = response.send(Err(e));
                return;
            }
        };

        tracing::debug!(
            hash = %record.linking_hash,
            kind = %record.kind,
            pending = self.pending.len() + 1,
            "Queued record for mining"
        );

        let now = Instant::now();
        self.pending.push_back(PendingRecord {
            record,
            submitted_at: now,
            ready_at: now + self.mining_delay,
            response,
        });
        self.metrics.record_submitted();
    }

    /// Move the oldest pending record to the chain
    fn mine_next(&mut self) -> bool {
        let Some(pending) = self.pending.pop_front() else {
            return false;
        };

        let hash = pending.record.linking_hash.clone();
        self.chain.push(pending.record);
        self.metrics
            .record_mined(pending.submitted_at.elapsed().as_secs_f64());

        tracing::debug!(hash = %hash, height = self.chain.len() - 1, "Mined record");

        // Submitter may have gone away; the record stays mined regardless
        let _ = pending.response.send(Ok(hash));
        true
    }

    /// Mine everything pending, returning how many records moved
    fn mine_all(&mut self) -> usize {
        let mut mined = 0;
        while self.mine_next() {
            mined += 1;
        }
        mined
    }

    /// Replace the chain wholesale, unless something is pending or the text is unusable
    fn import(&mut self, data: &str) -> ImportOutcome {
        if !self.pending.is_empty() {
            tracing::warn!(
                pending = self.pending.len(),
                reason = "pending",
                "Refusing chain import while records are pending"
            );
            return ImportOutcome::RefusedPending;
        }

        match Chain::parse(data, self.chain.algorithm()) {
            Ok(chain) => {
                let valid = chain.is_valid();
                self.metrics.record_validation(valid);
                if valid {
                    tracing::info!(records = chain.len(), "Imported chain");
                } else {
                    tracing::warn!(
                        records = chain.len(),
                        reason = "invalid",
                        "Imported chain failed validation"
                    );
                }
                self.chain = chain;
                ImportOutcome::Installed { valid }
            }
            Err(e) => {
                tracing::warn!(reason = "unparsable", "Failed to import chain: {}", e);
                ImportOutcome::RefusedUnparsable
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    /// Send a request and wait for its reply
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Submit a payload; resolves with its linking hash once mined
    pub async fn submit(&self, payload: Payload) -> Result<String> {
        self.request(|response| LedgerMessage::Submit { payload, response })
            .await?
    }

    /// Find a record by linking hash
    pub async fn get_transaction(&self, hash: &str) -> Result<Option<Record>> {
        let hash = hash.to_string();
        self.request(|response| LedgerMessage::GetTransaction { hash, response })
            .await
    }

    /// Payment records touching an address
    pub async fn get_transactions_by_address(&self, address: &str) -> Result<Vec<Record>> {
        let address = address.to_string();
        self.request(|response| LedgerMessage::GetTransactionsByAddress { address, response })
            .await
    }

    /// Find a registration record by id
    pub async fn get_host_registration(&self, registration_id: &str) -> Result<Option<Record>> {
        let registration_id = registration_id.to_string();
        self.request(|response| LedgerMessage::GetHostRegistration {
            registration_id,
            response,
        })
        .await
    }

    /// Verification records for a registration
    pub async fn get_verifications(&self, registration_id: &str) -> Result<Vec<Record>> {
        let registration_id = registration_id.to_string();
        self.request(|response| LedgerMessage::GetVerifications {
            registration_id,
            response,
        })
        .await
    }

    /// Replayed registration status
    pub async fn registration_status(
        &self,
        registration_id: &str,
    ) -> Result<Option<RegistrationStatus>> {
        let registration_id = registration_id.to_string();
        self.request(|response| LedgerMessage::GetRegistrationStatus {
            registration_id,
            response,
        })
        .await
    }

    /// Full validation pass
    pub async fn is_chain_valid(&self) -> Result<bool> {
        self.request(|response| LedgerMessage::ValidateChain { response })
            .await
    }

    /// Chain summary
    pub async fn get_stats(&self) -> Result<ChainStats> {
        self.request(|response| LedgerMessage::GetStats { response })
            .await
    }

    /// Copy of every committed record
    pub async fn get_chain(&self) -> Result<Vec<Record>> {
        self.request(|response| LedgerMessage::GetChain { response })
            .await
    }

    /// Pending queue depth
    pub async fn pending_count(&self) -> Result<usize> {
        self.request(|response| LedgerMessage::PendingCount { response })
            .await
    }

    /// Serialize the chain
    pub async fn export_chain(&self) -> Result<String> {
        self.request(|response| LedgerMessage::ExportChain { response })
            .await?
    }

    /// Replace the chain with an exported one
    pub async fn import_chain(&self, data: String) -> Result<bool> {
        self.request(|response| LedgerMessage::ImportChain { data, response })
            .await
    }

    /// Mine every pending record now (for testing/shutdown)
    pub async fn flush_pending(&self) -> Result<usize> {
        self.request(|response| LedgerMessage::FlushPending { response })
            .await
    }

    /// Shutdown actor after mining what is pending
    pub async fn shutdown(&self) -> Result<usize> {
        self.request(|response| LedgerMessage::Shutdown { response })
            .await
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(
    chain: Chain,
    mining_delay: Duration,
    mailbox_capacity: usize,
    metrics: Metrics,
) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1)); // Bounded channel for backpressure
    let actor = LedgerActor::new(chain, rx, mining_delay, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
