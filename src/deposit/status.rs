//! Deposit lifecycle transitions

use bigdecimal::BigDecimal;

use crate::types::*;

/// Enforces the deposit lifecycle `unpaid -> held -> (partial_refunded | refunded)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DepositStatusMachine;

impl DepositStatusMachine {
    /// Whether `from -> to` is a permitted transition
    pub fn can_transition(from: DepositStatus, to: DepositStatus) -> bool {
        matches!(
            (from, to),
            (DepositStatus::Unpaid, DepositStatus::Held)
                | (DepositStatus::Held, DepositStatus::PartialRefunded)
                | (DepositStatus::Held, DepositStatus::Refunded)
        )
    }

    /// Perform a transition on behalf of `operation`
    pub fn transition(
        from: DepositStatus,
        to: DepositStatus,
        operation: DepositOperation,
    ) -> DepositResult<DepositStatus> {
        if Self::can_transition(from, to) {
            Ok(to)
        } else {
            Err(DepositError::InvalidState {
                operation,
                status: from,
            })
        }
    }

    /// Fail unless the deposit is currently held
    pub fn ensure_held(status: DepositStatus, operation: DepositOperation) -> DepositResult<()> {
        if status == DepositStatus::Held {
            Ok(())
        } else {
            Err(DepositError::InvalidState { operation, status })
        }
    }

    /// Terminal status for a settlement.
    ///
    /// Only deductions decide the outcome: accrued interest never turns a
    /// partial refund into a full one, nor the other way round.
    pub fn settlement_status(total_deductions: &BigDecimal) -> DepositStatus {
        if *total_deductions == BigDecimal::from(0) {
            DepositStatus::Refunded
        } else {
            DepositStatus::PartialRefunded
        }
    }
}
