//! Payment distribution contract
//!
//! Splits a payment total across stakeholders by percentage, charges a flat
//! fee, and records the result on the ledger. Shares are rounded to whole
//! currency units, so `amount - fee` and the sum of shares may differ by a
//! few units; see [`PaymentRecord::distribution_drift`].

use crate::actor::LedgerHandle;
use crate::config::ContractConfig;
use crate::types::{Payload, PaymentRecord, StakeholderShare};
use crate::wallet::generate_wallet_address;
use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stakeholder entitled to a percentage of a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    /// Stakeholder identifier
    pub id: String,
    /// Share of the total, in percent
    pub percentage: Decimal,
}

impl Stakeholder {
    /// Create new stakeholder
    pub fn new(id: impl Into<String>, percentage: impl Into<Decimal>) -> Self {
        Self {
            id: id.into(),
            percentage: percentage.into(),
        }
    }
}

/// Payment as submitted, with its linking hash
#[derive(Debug, Clone)]
pub struct ContractReceipt {
    /// Submitted payment
    pub payment: PaymentRecord,
    /// Linking hash of the mined record
    pub linking_hash: String,
}

/// Round half away from zero to whole units
fn round_units(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `round(total × numerator / denominator)`, failing instead of overflowing
fn scaled_units(total: Decimal, numerator: Decimal, denominator: Decimal) -> Result<Decimal> {
    total
        .checked_mul(numerator)
        .and_then(|product| product.checked_div(denominator))
        .map(round_units)
        .ok_or_else(|| Error::InvalidPayment(format!("amount overflow: {} * {}", total, numerator)))
}

/// `round(total × percentage / 100)`
pub fn share_amount(total: Decimal, percentage: Decimal) -> Result<Decimal> {
    scaled_units(total, percentage, Decimal::ONE_HUNDRED)
}

/// `round(total × basis_points / 10000)`
pub fn transaction_fee(total: Decimal, basis_points: u32) -> Result<Decimal> {
    scaled_units(total, Decimal::from(basis_points), Decimal::from(10_000))
}

/// Contract that distributes payments and records them on the ledger
#[derive(Debug, Clone)]
pub struct PaymentContract {
    ledger: LedgerHandle,
    config: ContractConfig,
    contract_address: String,
    stakeholder_rules: BTreeMap<String, Decimal>,
}

impl PaymentContract {
    /// New contract with a freshly generated address
    pub fn new(ledger: LedgerHandle, config: ContractConfig) -> Self {
        Self {
            ledger,
            config,
            contract_address: generate_wallet_address(),
            stakeholder_rules: BTreeMap::new(),
        }
    }

    /// Address payments are sent to
    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    /// Replace the stored stakeholder percentages
    pub fn set_stakeholder_rules(&mut self, rules: impl IntoIterator<Item = (String, Decimal)>) {
        self.stakeholder_rules = rules.into_iter().collect();
    }

    /// Stored stakeholder percentages, ordered by id
    pub fn stakeholder_rules(&self) -> &BTreeMap<String, Decimal> {
        &self.stakeholder_rules
    }

    /// Build the payment record without submitting it
    pub fn build_payment(&self, total: Decimal, stakeholders: &[Stakeholder]) -> Result<PaymentRecord> {
        if self.config.strict_distribution {
            self.check_percentages(stakeholders)?;
        }

        let stakeholder_distribution = stakeholders
            .iter()
            .map(|s| {
                Ok(StakeholderShare {
                    stakeholder_id: s.id.clone(),
                    amount: share_amount(total, s.percentage)?,
                    wallet_address: generate_wallet_address(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PaymentRecord {
            id: PaymentRecord::generate_id(),
            amount: total,
            currency: self.config.currency,
            from_address: generate_wallet_address(),
            to_address: self.contract_address.clone(),
            stakeholder_distribution,
            timestamp: Utc::now(),
            confirmations: self.config.confirmations,
            gas_used: None,
            transaction_fee: transaction_fee(total, self.config.fee_basis_points)?,
        })
    }

    /// Distribute `total` across `stakeholders` and record it
    pub async fn execute_payment(
        &self,
        total: Decimal,
        stakeholders: &[Stakeholder],
    ) -> Result<ContractReceipt> {
        let payment = self.build_payment(total, stakeholders)?;

        let drift = payment.distribution_drift();
        if !drift.is_zero() {
            tracing::debug!(
                payment_id = %payment.id,
                drift = %drift,
                "Stakeholder shares do not reconcile with amount minus fee"
            );
        }

        let linking_hash = self.ledger.submit(Payload::Payment(payment.clone())).await?;

        tracing::info!(
            payment_id = %payment.id,
            amount = %payment.amount,
            stakeholders = payment.stakeholder_distribution.len(),
            hash = %linking_hash,
            "Executed contract payment"
        );

        Ok(ContractReceipt {
            payment,
            linking_hash,
        })
    }

    /// Distribute `total` using the stored stakeholder rules
    pub async fn execute_with_rules(&self, total: Decimal) -> Result<ContractReceipt> {
        let stakeholders: Vec<Stakeholder> = self
            .stakeholder_rules
            .iter()
            .map(|(id, percentage)| Stakeholder::new(id.clone(), *percentage))
            .collect();
        self.execute_payment(total, &stakeholders).await
    }

    fn check_percentages(&self, stakeholders: &[Stakeholder]) -> Result<()> {
        if let Some(s) = stakeholders.iter().find(|s| s.percentage.is_sign_negative()) {
            return Err(Error::InvalidPayment(format!(
                "Negative percentage for stakeholder {}",
                s.id
            )));
        }

        let sum: Decimal = stakeholders.iter().map(|s| s.percentage).sum();
        if sum != Decimal::ONE_HUNDRED {
            return Err(Error::InvalidPayment(format!(
                "Stakeholder percentages sum to {}, expected 100",
                sum
            )));
        }
        Ok(())
    }
}
