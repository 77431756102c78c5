//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic JSON serialization (the linking hash is computed over it)
//! - Exact arithmetic (Decimal for money)
//! - Free-form host information kept as JSON values

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identity recorded on every verification record
pub const VERIFIER_ID: &str = "VillageStay_Admin";

/// Payment currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Indian Rupee
    INR,
    /// Ether
    ETH,
    /// Bitcoin
    BTC,
}

impl Currency {
    /// Currency code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::ETH => "ETH",
            Currency::BTC => "BTC",
        }
    }

    /// Parse from code
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "INR" => Some(Currency::INR),
            "ETH" => Some(Currency::ETH),
            "BTC" => Some(Currency::BTC),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind tag of a ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// First record of every chain
    Genesis,
    /// Payment with stakeholder distribution
    Payment,
    /// Host registration
    Registration,
    /// Verification of an earlier registration
    Verification,
}

impl RecordKind {
    /// Tag as written into the canonical hash input
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Genesis => "genesis",
            RecordKind::Payment => "payment",
            RecordKind::Registration => "registration",
            RecordKind::Verification => "verification",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stakeholder's cut of a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderShare {
    /// Stakeholder identifier
    pub stakeholder_id: String,
    /// Amount paid out to this stakeholder
    pub amount: Decimal,
    /// Receiving wallet
    pub wallet_address: String,
}

/// Payment payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Payment identifier
    pub id: String,

    /// Gross amount
    pub amount: Decimal,

    /// Currency
    pub currency: Currency,

    /// Payer wallet
    pub from_address: String,

    /// Payee (contract) wallet
    pub to_address: String,

    /// Ordered stakeholder shares
    pub stakeholder_distribution: Vec<StakeholderShare>,

    /// Payment creation time
    pub timestamp: DateTime<Utc>,

    /// Confirmation count reported to the caller
    pub confirmations: u32,

    /// Gas used, for on-chain currencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,

    /// Transaction fee
    pub transaction_fee: Decimal,
}

impl PaymentRecord {
    /// Fresh payment id (`payment_<uuid v7>`)
    pub fn generate_id() -> String {
        format!("payment_{}", Uuid::now_v7())
    }

    /// True if `address` is the payer, the payee or any stakeholder wallet
    pub fn involves_address(&self, address: &str) -> bool {
        self.from_address == address
            || self.to_address == address
            || self
                .stakeholder_distribution
                .iter()
                .any(|s| s.wallet_address == address)
    }

    /// Sum of all stakeholder shares
    pub fn distribution_total(&self) -> Decimal {
        self.stakeholder_distribution.iter().map(|s| s.amount).sum()
    }

    /// `amount - fee - Σ shares`
    ///
    /// Non-zero drift is expected when shares are rounded to whole units.
    pub fn distribution_drift(&self) -> Decimal {
        self.amount - self.transaction_fee - self.distribution_total()
    }
}

/// Registration lifecycle: `pending → verified → approved | rejected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Submitted, not yet reviewed
    Pending,
    /// Documents checked
    Verified,
    /// Accepted as host (terminal)
    Approved,
    /// Refused (terminal)
    Rejected,
}

impl RegistrationStatus {
    /// Check if status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, RegistrationStatus::Approved | RegistrationStatus::Rejected)
    }

    /// Whether moving from `self` to `next` follows the lifecycle
    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, next),
            (Pending, Verified) | (Verified, Approved) | (Verified, Rejected)
        )
    }
}

/// Free-form host application sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostData {
    /// Name, contact details, village, district, state
    #[serde(default)]
    pub personal_info: Value,
    /// Property type, rooms, capacity, amenities
    #[serde(default)]
    pub property_info: Value,
    /// Activities, skills, cuisine, languages
    #[serde(default)]
    pub cultural_offerings: Value,
    /// Document references
    #[serde(default)]
    pub verification: Value,
}

/// Host registration payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRegistration {
    /// Registration identifier
    pub id: String,

    /// Application sections
    pub host_data: HostData,

    /// Application time
    pub timestamp: DateTime<Utc>,

    /// Status at submission time
    pub status: RegistrationStatus,

    /// Caller-supplied verification reference (often empty)
    pub verification_hash: String,

    /// Content address of uploaded documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
}

impl HostRegistration {
    /// New pending registration with a generated `host_<uuid v7>` id
    pub fn new(host_data: HostData) -> Self {
        Self {
            id: format!("host_{}", Uuid::now_v7()),
            host_data,
            timestamp: Utc::now(),
            status: RegistrationStatus::Pending,
            verification_hash: String::new(),
            ipfs_hash: None,
        }
    }
}

/// Verification payload, referencing a registration by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    /// Registration being verified
    pub registration_id: String,
    /// Verifier-supplied evidence
    pub verification_data: Value,
    /// Verifier identity
    pub verified_by: String,
    /// Always `verified`
    pub status: RegistrationStatus,
}

impl VerificationRecord {
    /// Verification by the platform verifier
    pub fn new(registration_id: impl Into<String>, verification_data: Value) -> Self {
        Self {
            registration_id: registration_id.into(),
            verification_data,
            verified_by: VERIFIER_ID.to_string(),
            status: RegistrationStatus::Verified,
        }
    }
}

/// Genesis payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisMarker {
    /// Fixed marker text
    pub message: String,
}

/// Kind-specific record data
///
/// Serialized without a tag; the record's `type` field carries the kind and
/// [`Record::is_consistent`] checks that both agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Payment
    Payment(PaymentRecord),
    /// Host registration
    Registration(HostRegistration),
    /// Verification
    Verification(VerificationRecord),
    /// Genesis marker
    Genesis(GenesisMarker),
}

impl Payload {
    /// Kind implied by the payload shape
    pub fn kind(&self) -> RecordKind {
        match self {
            Payload::Payment(_) => RecordKind::Payment,
            Payload::Registration(_) => RecordKind::Registration,
            Payload::Verification(_) => RecordKind::Verification,
            Payload::Genesis(_) => RecordKind::Genesis,
        }
    }
}

/// One immutable ledger entry, linked to its predecessor by hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Linking hash identifying this record
    #[serde(rename = "hash")]
    pub linking_hash: String,

    /// Submission time (not append time)
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Kind tag
    #[serde(rename = "type")]
    pub kind: RecordKind,

    /// Kind-specific data
    #[serde(rename = "data")]
    pub payload: Payload,

    /// Pseudo-signature over the payload
    pub signature: String,

    /// Linking hash of the predecessor
    pub previous_hash: String,
}

impl Record {
    /// Kind tag agrees with payload shape
    pub fn is_consistent(&self) -> bool {
        self.kind == self.payload.kind()
    }

    /// Payment payload, if this is a payment record
    pub fn as_payment(&self) -> Option<&PaymentRecord> {
        match (&self.kind, &self.payload) {
            (RecordKind::Payment, Payload::Payment(p)) => Some(p),
            _ => None,
        }
    }

    /// Registration payload, if this is a registration record
    pub fn as_registration(&self) -> Option<&HostRegistration> {
        match (&self.kind, &self.payload) {
            (RecordKind::Registration, Payload::Registration(r)) => Some(r),
            _ => None,
        }
    }

    /// Verification payload, if this is a verification record
    pub fn as_verification(&self) -> Option<&VerificationRecord> {
        match (&self.kind, &self.payload) {
            (RecordKind::Verification, Payload::Verification(v)) => Some(v),
            _ => None,
        }
    }
}

/// Chain summary, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    /// Records in the chain, genesis included
    pub total_blocks: usize,
    /// Payment records
    pub total_payments: usize,
    /// Registration records
    pub total_registrations: usize,
    /// Verification records
    pub total_verifications: usize,
    /// Sum of payment amounts across currencies
    pub total_value: Decimal,
    /// Result of a full validation pass
    pub is_valid: bool,
    /// Linking hash of the chain tail
    pub latest_block_hash: String,
}
