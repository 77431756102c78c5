//! Hashing for the ledger
//!
//! This module provides:
//! - The linking hash over `(previousHash, timestamp, type, data, signature)`
//! - The payload pseudo-signature
//! - A choice of digest: SHA-256, BLAKE3, or the legacy rolling checksum
//!
//! None of this involves keys. The signature only makes payload edits
//! visible; the linking hash covers it as well.

use crate::types::{Payload, Record, RecordKind};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix of every payload signature
pub const SIGNATURE_PREFIX: &str = "sig_";

/// Digest used for linking hashes and signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, lowercase hex
    #[default]
    Sha256,
    /// BLAKE3, lowercase hex
    Blake3,
    /// 32-bit rolling checksum, base 16; parity testing only
    Legacy,
}

impl HashAlgorithm {
    /// Parse from name (`sha256`, `blake3`, `legacy`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" => Some(HashAlgorithm::Sha256),
            "blake3" => Some(HashAlgorithm::Blake3),
            "legacy" => Some(HashAlgorithm::Legacy),
            _ => None,
        }
    }

    /// Digest text into a lowercase hex string
    pub fn digest(&self, text: &str) -> String {
        match self {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(text.as_bytes())),
            HashAlgorithm::Blake3 => blake3::hash(text.as_bytes()).to_hex().to_string(),
            HashAlgorithm::Legacy => legacy_checksum(text),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

/// Rolling checksum: `acc = acc * 31 + unit` over UTF-16 code units,
/// wrapped to `i32`, absolute value in base 16.
pub fn legacy_checksum(text: &str) -> String {
    let acc = text.encode_utf16().fold(0i32, |acc, unit| {
        (acc << 5).wrapping_sub(acc).wrapping_add(i32::from(unit))
    });
    format!("{:x}", i64::from(acc).abs())
}

/// Hash input in its fixed field order
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkInput<'a> {
    previous_hash: &'a str,
    timestamp: &'a DateTime<Utc>,
    #[serde(rename = "type")]
    kind: RecordKind,
    data: &'a Payload,
    signature: &'a str,
}

/// Linking hash over the five record inputs, in order
pub fn linking_hash(
    algorithm: HashAlgorithm,
    previous_hash: &str,
    created_at: &DateTime<Utc>,
    kind: RecordKind,
    payload: &Payload,
    signature: &str,
) -> Result<String> {
    let canonical = serde_json::to_string(&LinkInput {
        previous_hash,
        timestamp: created_at,
        kind,
        data: payload,
        signature,
    })?;
    Ok(algorithm.digest(&canonical))
}

/// Recompute the linking hash from a record's own fields
pub fn record_hash(algorithm: HashAlgorithm, record: &Record) -> Result<String> {
    linking_hash(
        algorithm,
        &record.previous_hash,
        &record.created_at,
        record.kind,
        &record.payload,
        &record.signature,
    )
}

/// Deterministic pseudo-signature over a payload
pub fn sign_payload(algorithm: HashAlgorithm, payload: &Payload) -> Result<String> {
    let serialized = serde_json::to_string(payload)?;
    let digest = algorithm.digest(&format!("signature:{serialized}"));
    Ok(format!("{SIGNATURE_PREFIX}{digest}"))
}
