//! Portfolio totals across deposits

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Totals shown above a list of deposits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositSummary {
    pub deposit_count: usize,
    pub status_counts: BTreeMap<DepositStatus, usize>,
    /// Sum of amounts of deposits currently held
    pub total_held: BigDecimal,
    /// Sum of deductions across all deposits
    pub total_deductions: BigDecimal,
    /// Sum of refunds paid out on settled deposits
    pub total_refunded: BigDecimal,
}

impl DepositSummary {
    pub fn from_deposits(deposits: &[SecurityDeposit]) -> Self {
        let mut status_counts: BTreeMap<DepositStatus, usize> =
            DepositStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut total_held = BigDecimal::from(0);
        let mut total_deductions = BigDecimal::from(0);
        let mut total_refunded = BigDecimal::from(0);

        for deposit in deposits {
            *status_counts.entry(deposit.status).or_insert(0) += 1;
            if deposit.status == DepositStatus::Held {
                total_held += &deposit.amount;
            }
            total_deductions += deposit.total_deductions();
            if let Some(refund) = &deposit.refund_amount {
                total_refunded += refund;
            }
        }

        Self {
            deposit_count: deposits.len(),
            status_counts,
            total_held,
            total_deductions,
            total_refunded,
        }
    }

    pub fn count(&self, status: DepositStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}
