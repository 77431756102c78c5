//! VillageStay Ledger
//!
//! Append-only, hash-linked record ledger backing host registrations and
//! stakeholder payments.
//!
//! # Architecture
//!
//! - **Hash Linking**: Every record commits to its predecessor's hash
//! - **Single Writer**: One mining actor owns the chain and pending queue
//! - **Simulated Mining**: Records become visible one delay after submission
//! - **Replay Validation**: Integrity and registration status are derived by
//!   walking the chain, never stored
//!
//! # Invariants
//!
//! - Linking: `chain[i].previous_hash == chain[i - 1].linking_hash`
//! - Reproducibility: recomputing a record's hash yields its stored hash
//! - FIFO: records reach the chain in submission order
//! - Append-only: records are never modified or removed

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod crypto;
pub mod chain;
pub mod actor;
pub mod ledger;
pub mod wallet;
pub mod contract;
pub mod error;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    ChainStats, Currency, HostData, HostRegistration, Payload, PaymentRecord, Record, RecordKind,
    RegistrationStatus, StakeholderShare, VerificationRecord,
};
pub use crypto::HashAlgorithm;
pub use contract::{ContractReceipt, PaymentContract, Stakeholder};
pub use wallet::{generate_wallet_address, validate_wallet_address};
pub use ledger::Ledger;
pub use config::Config;
