//! In-memory hash-linked record sequence
//!
//! `Chain` is plain data: it never sleeps, never locks, and is owned by
//! exactly one mining actor at runtime. Every query here is a linear scan,
//! recomputed on each call.

use crate::crypto::{linking_hash, record_hash, sign_payload, HashAlgorithm};
use crate::types::{
    ChainStats, GenesisMarker, Payload, Record, RecordKind, RegistrationStatus,
};
use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::Decimal;

/// `previousHash` of the genesis record
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Signature of the genesis record
pub const GENESIS_SIGNATURE: &str = "genesis_signature";

/// Build a record linked to `previous_hash`, stamped now
pub fn build_record(
    algorithm: HashAlgorithm,
    previous_hash: &str,
    payload: Payload,
) -> Result<Record> {
    let created_at = Utc::now();
    let kind = payload.kind();
    let signature = sign_payload(algorithm, &payload)?;
    let linking_hash = linking_hash(
        algorithm,
        previous_hash,
        &created_at,
        kind,
        &payload,
        &signature,
    )?;

    Ok(Record {
        linking_hash,
        created_at,
        kind,
        payload,
        signature,
        previous_hash: previous_hash.to_string(),
    })
}

/// Append-only chain of records, starting at genesis
#[derive(Debug, Clone)]
pub struct Chain {
    records: Vec<Record>,
    algorithm: HashAlgorithm,
}

impl Chain {
    /// New chain holding only the genesis record
    pub fn new(algorithm: HashAlgorithm, genesis_message: &str) -> Result<Self> {
        let created_at = Utc::now();
        let payload = Payload::Genesis(GenesisMarker {
            message: genesis_message.to_string(),
        });
        let hash = linking_hash(
            algorithm,
            GENESIS_PREVIOUS_HASH,
            &created_at,
            RecordKind::Genesis,
            &payload,
            GENESIS_SIGNATURE,
        )?;

        tracing::info!(hash = %hash, %algorithm, "Created genesis record");

        Ok(Self {
            records: vec![Record {
                linking_hash: hash,
                created_at,
                kind: RecordKind::Genesis,
                payload,
                signature: GENESIS_SIGNATURE.to_string(),
                previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            }],
            algorithm,
        })
    }

    /// Wrap existing records without validating them
    pub fn from_records(records: Vec<Record>, algorithm: HashAlgorithm) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::InvalidRecord("Chain must contain a genesis record".to_string()));
        }
        Ok(Self { records, algorithm })
    }

    /// Parse an exported chain
    pub fn parse(text: &str, algorithm: HashAlgorithm) -> Result<Self> {
        let records: Vec<Record> = serde_json::from_str(text)?;
        Self::from_records(records, algorithm)
    }

    /// Pretty-printed JSON array of all records
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Digest used by this chain
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of records, genesis included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Never true for a constructed chain
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in chain order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Linking hash of the tail record
    pub fn latest_hash(&self) -> &str {
        self.records
            .last()
            .map(|r| r.linking_hash.as_str())
            .unwrap_or(GENESIS_PREVIOUS_HASH)
    }

    /// Append a record that was linked against the current tail
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// First record with the given linking hash
    pub fn get_transaction(&self, hash: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.linking_hash == hash)
    }

    /// Payment records touching `address`, in chain order
    pub fn transactions_by_address(&self, address: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.as_payment().is_some_and(|p| p.involves_address(address)))
            .collect()
    }

    /// First registration record with the given id
    pub fn host_registration(&self, registration_id: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.as_registration().is_some_and(|reg| reg.id == registration_id))
    }

    /// Verification records for a registration, in chain order
    pub fn verifications(&self, registration_id: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| {
                r.as_verification()
                    .is_some_and(|v| v.registration_id == registration_id)
            })
            .collect()
    }

    /// Current status of a registration, replayed from the chain
    ///
    /// Starts from the status carried by the registration record; every
    /// later verification for the same id overrides it.
    pub fn registration_status(&self, registration_id: &str) -> Option<RegistrationStatus> {
        let position = self.records.iter().position(|r| {
            r.as_registration()
                .is_some_and(|reg| reg.id == registration_id)
        })?;

        let mut status = self.records[position].as_registration()?.status;
        for record in &self.records[position + 1..] {
            if let Some(v) = record.as_verification() {
                if v.registration_id == registration_id {
                    status = v.status;
                }
            }
        }
        Some(status)
    }

    /// Index of the first record breaking linkage or hash reproduction
    pub fn first_invalid(&self) -> Option<usize> {
        for i in 1..self.records.len() {
            let current = &self.records[i];
            let previous = &self.records[i - 1];

            if current.previous_hash != previous.linking_hash {
                return Some(i);
            }

            if !current.is_consistent() {
                return Some(i);
            }

            match record_hash(self.algorithm, current) {
                Ok(hash) if hash == current.linking_hash => {}
                _ => return Some(i),
            }
        }
        None
    }

    /// Full replay validation
    pub fn is_valid(&self) -> bool {
        match self.first_invalid() {
            None => true,
            Some(index) => {
                tracing::warn!(index, "Chain validation failed");
                false
            }
        }
    }

    /// Aggregate counts and value; runs a full validation
    pub fn stats(&self) -> ChainStats {
        let mut stats = ChainStats {
            total_blocks: self.records.len(),
            total_payments: 0,
            total_registrations: 0,
            total_verifications: 0,
            total_value: Decimal::ZERO,
            is_valid: self.is_valid(),
            latest_block_hash: self.latest_hash().to_string(),
        };

        for record in &self.records {
            match record.kind {
                RecordKind::Payment => {
                    stats.total_payments += 1;
                    if let Some(payment) = record.as_payment() {
                        stats.total_value += payment.amount;
                    }
                }
                RecordKind::Registration => stats.total_registrations += 1,
                RecordKind::Verification => stats.total_verifications += 1,
                RecordKind::Genesis => {}
            }
        }

        stats
    }
}
