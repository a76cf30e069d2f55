//! Deposit manager that coordinates the repository, ledger, and refund settlement

use tracing::{debug, info, warn};

use crate::config::DepositPolicy;
use crate::deposit::{
    DeductionLedger, DeductionOutcome, DepositStatusMachine, DepositSummary, RefundCalculator,
    RefundOutcome, RefundPreview,
};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_new_deposit;

/// Main deposit service that orchestrates all deposit operations
///
/// Every mutation is validated and computed in memory first; the repository
/// is only called once the result is known to be valid, and receives exactly
/// the values returned to the caller.
pub struct DepositManager<R: DepositRepository> {
    repository: R,
    clock: Box<dyn Clock>,
    ledger: DeductionLedger,
    calculator: RefundCalculator,
}

impl<R: DepositRepository> DepositManager<R> {
    /// Create a new manager with the default policy and the system clock
    pub fn new(repository: R) -> Self {
        Self::with_policy(repository, DepositPolicy::default())
    }

    /// Create a new manager with a custom policy
    pub fn with_policy(repository: R, policy: DepositPolicy) -> Self {
        Self::with_clock(repository, policy, Box::new(SystemClock))
    }

    /// Create a new manager with a custom policy and clock
    pub fn with_clock(repository: R, policy: DepositPolicy, clock: Box<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            ledger: DeductionLedger::new(policy.clone()),
            calculator: RefundCalculator::new(policy),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn policy(&self) -> &DepositPolicy {
        self.ledger.policy()
    }

    pub fn ledger(&self) -> &DeductionLedger {
        &self.ledger
    }

    pub fn calculator(&self) -> &RefundCalculator {
        &self.calculator
    }

    /// Create and persist a new deposit
    pub async fn create_deposit(&mut self, params: NewDeposit) -> DepositResult<SecurityDeposit> {
        validate_new_deposit(&params)?;

        if let Some(id) = &params.id {
            if self.repository.get_deposit(id).await?.is_some() {
                return Err(DepositError::Validation(format!(
                    "Deposit with ID '{}' already exists",
                    id
                )));
            }
        }

        let deposit = SecurityDeposit::new(params);
        self.repository.save_deposit(&deposit).await?;

        info!(
            deposit_id = %deposit.id,
            lease_id = %deposit.lease_id,
            amount = %deposit.amount,
            status = %deposit.status,
            "deposit created"
        );
        Ok(deposit)
    }

    /// Get a deposit by ID
    pub async fn get_deposit(&self, deposit_id: &str) -> DepositResult<Option<SecurityDeposit>> {
        debug!(deposit_id, "loading deposit");
        self.repository.get_deposit(deposit_id).await
    }

    /// Get a deposit by ID, returning an error if not found
    pub async fn get_deposit_required(&self, deposit_id: &str) -> DepositResult<SecurityDeposit> {
        self.get_deposit(deposit_id)
            .await?
            .ok_or_else(|| DepositError::DepositNotFound(deposit_id.to_string()))
    }

    /// List deposits, optionally filtered by status
    pub async fn list_deposits(
        &self,
        status: Option<DepositStatus>,
    ) -> DepositResult<Vec<SecurityDeposit>> {
        self.repository.list_deposits(status).await
    }

    /// Record that an unpaid deposit has been collected
    pub async fn mark_held(&mut self, deposit_id: &str) -> DepositResult<SecurityDeposit> {
        let mut deposit = self.get_deposit_required(deposit_id).await?;

        deposit.status = DepositStatusMachine::transition(
            deposit.status,
            DepositStatus::Held,
            DepositOperation::MarkHeld,
        )
        .inspect_err(|e| warn!(deposit_id, error = %e, "mark held rejected"))?;
        deposit.updated_at = chrono::Utc::now().naive_utc();

        self.repository
            .update_status(deposit_id, deposit.status)
            .await?;

        info!(deposit_id, "deposit marked as held");
        Ok(deposit)
    }

    /// Record a deduction against a held deposit
    pub async fn add_deduction(
        &mut self,
        deposit_id: &str,
        request: AddDeductionRequest,
    ) -> DepositResult<DeductionOutcome> {
        let deposit = self.get_deposit_required(deposit_id).await?;

        let outcome = self
            .ledger
            .add_deduction(&deposit, &request, self.clock.today())
            .inspect_err(|e| {
                warn!(deposit_id, amount = %request.amount, error = %e, "deduction rejected")
            })?;

        for warning in &outcome.warnings {
            warn!(deposit_id, "{}", warning);
        }

        self.repository
            .add_deduction(deposit_id, &outcome.deduction)
            .await?;

        info!(
            deposit_id,
            deduction_id = %outcome.deduction.id,
            amount = %outcome.deduction.amount,
            category = %outcome.deduction.category,
            remaining = %outcome.deposit.remaining_balance(),
            "deduction recorded"
        );
        Ok(outcome)
    }

    /// Breakdown of the refund the deposit would settle for now
    pub async fn preview_refund(&self, deposit_id: &str) -> DepositResult<RefundPreview> {
        let deposit = self.get_deposit_required(deposit_id).await?;
        let preview = self.calculator.preview(&deposit);

        debug!(
            deposit_id,
            refund_amount = %preview.refund_amount,
            resulting_status = %preview.resulting_status,
            "refund preview"
        );
        Ok(preview)
    }

    /// Settle a held deposit
    pub async fn process_refund(
        &mut self,
        deposit_id: &str,
        request: ProcessRefundRequest,
    ) -> DepositResult<RefundOutcome> {
        let deposit = self.get_deposit_required(deposit_id).await?;

        let outcome = self
            .calculator
            .process_refund(&deposit, &request, self.clock.today())
            .inspect_err(|e| warn!(deposit_id, error = %e, "refund rejected"))?;

        self.repository
            .process_refund(deposit_id, &outcome.settlement)
            .await?;

        info!(
            deposit_id,
            refund_amount = %outcome.settlement.refund_amount,
            refund_method = %outcome.settlement.refund_method,
            status = %outcome.settlement.status,
            "deposit settled"
        );
        Ok(outcome)
    }

    /// Totals across deposits, optionally filtered by status
    pub async fn summarize(&self, status: Option<DepositStatus>) -> DepositResult<DepositSummary> {
        let deposits = self.list_deposits(status).await?;
        Ok(DepositSummary::from_deposits(&deposits))
    }
}
