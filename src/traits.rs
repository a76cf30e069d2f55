//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for security deposits
///
/// This trait allows the deposit core to work with any persistence backend
/// (a REST API client, a database, in-memory, etc.) by implementing these
/// methods. Mutating calls receive values that have already been validated
/// and computed by the core, and should persist them as-is.
#[async_trait]
pub trait DepositRepository: Send + Sync {
    /// Save a new deposit
    async fn save_deposit(&mut self, deposit: &SecurityDeposit) -> DepositResult<()>;

    /// Get a deposit by ID
    async fn get_deposit(&self, deposit_id: &str) -> DepositResult<Option<SecurityDeposit>>;

    /// List deposits, optionally filtered by status
    async fn list_deposits(
        &self,
        status: Option<DepositStatus>,
    ) -> DepositResult<Vec<SecurityDeposit>>;

    /// Persist a status change outside settlement (`unpaid -> held`).
    ///
    /// Terminal statuses are only reached through [`DepositRepository::process_refund`].
    async fn update_status(&mut self, deposit_id: &str, status: DepositStatus)
        -> DepositResult<()>;

    /// Append a deduction to a held deposit
    async fn add_deduction(&mut self, deposit_id: &str, deduction: &Deduction)
        -> DepositResult<()>;

    /// Record the final settlement of a held deposit in a single update
    async fn process_refund(
        &mut self,
        deposit_id: &str,
        settlement: &RefundSettlement,
    ) -> DepositResult<()>;
}

/// Source of the current date for defaulting and date checks
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system time in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
