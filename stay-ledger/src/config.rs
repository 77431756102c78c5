//! Configuration for the ledger

use crate::crypto::HashAlgorithm;
use crate::types::Currency;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Marker message stored in the genesis record
    pub genesis_message: String,

    /// Mining configuration
    pub mining: MiningConfig,

    /// Hashing configuration
    pub hashing: HashingConfig,

    /// Payment contract configuration
    pub contract: ContractConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "stay-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            genesis_message: "VillageStay Genesis Block".to_string(),
            mining: MiningConfig::default(),
            hashing: HashingConfig::default(),
            contract: ContractConfig::default(),
        }
    }
}

/// Mining configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Delay between submission and append (milliseconds)
    pub delay_ms: u64,

    /// Actor mailbox capacity
    pub mailbox_capacity: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            mailbox_capacity: 1000,
        }
    }
}

/// Hashing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Digest for linking hashes and signatures
    pub algorithm: HashAlgorithm,
}

/// Payment contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Transaction fee in basis points of the total
    pub fee_basis_points: u32,

    /// Confirmation count written into payment records
    pub confirmations: u32,

    /// Currency of contract payments
    pub currency: Currency,

    /// Reject distributions whose percentages do not sum to 100
    pub strict_distribution: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            fee_basis_points: 100, // 1%
            confirmations: 6,
            currency: Currency::INR,
            strict_distribution: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(delay) = std::env::var("STAY_LEDGER_MINING_DELAY_MS") {
            config.mining.delay_ms = delay.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid STAY_LEDGER_MINING_DELAY_MS: {}", e))
            })?;
        }

        if let Ok(name) = std::env::var("STAY_LEDGER_HASH_ALGORITHM") {
            config.hashing.algorithm = HashAlgorithm::from_name(&name).ok_or_else(|| {
                crate::Error::Config(format!("Unknown hash algorithm: {}", name))
            })?;
        }

        if let Ok(strict) = std::env::var("STAY_LEDGER_STRICT_DISTRIBUTION") {
            config.contract.strict_distribution = strict.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid STAY_LEDGER_STRICT_DISTRIBUTION: {}", e))
            })?;
        }

        Ok(config)
    }
}
