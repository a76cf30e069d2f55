//! Deduction ledger: validates and accumulates charges against a deposit

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::DepositPolicy;
use crate::deposit::status::DepositStatusMachine;
use crate::types::*;
use crate::utils::validation::validate_deduction_request;

/// Advisory conditions that do not block a deduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeductionWarning {
    /// The deduction consumes more than the configured share of the remaining balance
    LargeShareOfRemaining {
        amount: BigDecimal,
        remaining: BigDecimal,
        threshold_percent: u32,
    },
}

impl fmt::Display for DeductionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeductionWarning::LargeShareOfRemaining {
                amount,
                remaining,
                threshold_percent,
            } => write!(
                f,
                "Deduction of {} is more than {}% of the remaining balance of {}",
                amount, threshold_percent, remaining
            ),
        }
    }
}

/// Result of a successful deduction
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionOutcome {
    /// The deposit with the deduction appended
    pub deposit: SecurityDeposit,
    /// The deduction that was recorded
    pub deduction: Deduction,
    pub warnings: Vec<DeductionWarning>,
}

impl DeductionOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validates deductions against a deposit's remaining balance
#[derive(Debug, Clone, Default)]
pub struct DeductionLedger {
    policy: DepositPolicy,
}

impl DeductionLedger {
    /// Create a ledger with the given policy
    pub fn new(policy: DepositPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DepositPolicy {
        &self.policy
    }

    /// Sum of all deductions recorded against the deposit
    pub fn total_deductions(&self, deposit: &SecurityDeposit) -> BigDecimal {
        deposit.total_deductions()
    }

    /// Deposit amount minus deductions recorded so far
    pub fn remaining_balance(&self, deposit: &SecurityDeposit) -> BigDecimal {
        deposit.remaining_balance()
    }

    /// Deduction totals per category, for categories that have any
    pub fn totals_by_category(
        &self,
        deposit: &SecurityDeposit,
    ) -> BTreeMap<DeductionCategory, BigDecimal> {
        let mut totals: BTreeMap<DeductionCategory, BigDecimal> = BTreeMap::new();
        for deduction in &deposit.deductions {
            *totals
                .entry(deduction.category)
                .or_insert_with(|| BigDecimal::from(0)) += &deduction.amount;
        }
        totals
    }

    /// Advisory warnings for a prospective deduction amount
    pub fn assess(&self, deposit: &SecurityDeposit, amount: &BigDecimal) -> Vec<DeductionWarning> {
        let remaining = deposit.remaining_balance();
        let mut warnings = Vec::new();

        // amount > remaining * threshold / 100, kept in integers
        let scaled_amount = amount * BigDecimal::from(100);
        let scaled_limit = &remaining * BigDecimal::from(self.policy.warning_threshold_percent);
        if remaining > BigDecimal::from(0) && scaled_amount > scaled_limit {
            warnings.push(DeductionWarning::LargeShareOfRemaining {
                amount: amount.clone(),
                remaining,
                threshold_percent: self.policy.warning_threshold_percent,
            });
        }

        warnings
    }

    /// Record a deduction against a held deposit.
    ///
    /// Returns an updated copy of the deposit; the input is never modified, so
    /// a rejected deduction leaves the caller's deposit exactly as it was.
    pub fn add_deduction(
        &self,
        deposit: &SecurityDeposit,
        request: &AddDeductionRequest,
        today: NaiveDate,
    ) -> DepositResult<DeductionOutcome> {
        DepositStatusMachine::ensure_held(deposit.status, DepositOperation::AddDeduction)?;
        validate_deduction_request(request, &self.policy)?;

        let remaining = deposit.remaining_balance();
        if request.amount > remaining {
            return Err(DepositError::ExceedsRemainingBalance {
                requested: request.amount.clone(),
                remaining,
            });
        }

        let warnings = self.assess(deposit, &request.amount);
        let deduction = Deduction::from_request(request, today);

        let mut updated = deposit.clone();
        updated.push_deduction(deduction.clone());

        Ok(DeductionOutcome {
            deposit: updated,
            deduction,
            warnings,
        })
    }
}
