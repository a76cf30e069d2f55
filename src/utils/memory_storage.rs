//! In-memory repository implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::deposit::DepositStatusMachine;
use crate::traits::*;
use crate::types::*;

/// In-memory repository for testing and development
///
/// Mirrors the checks a backend performs on persistence: deductions and
/// settlements are only accepted for deposits that are still held.
#[derive(Debug, Clone)]
pub struct MemoryDepositRepository {
    deposits: Arc<RwLock<HashMap<String, SecurityDeposit>>>,
}

impl MemoryDepositRepository {
    /// Create a new memory repository instance
    pub fn new() -> Self {
        Self {
            deposits: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> DepositResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Number of stored deposits
    pub fn len(&self) -> DepositResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> DepositResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> DepositResult<RwLockReadGuard<'_, HashMap<String, SecurityDeposit>>> {
        self.deposits
            .read()
            .map_err(|_| DepositError::Storage("deposit store lock poisoned".to_string()))
    }

    fn write(&self) -> DepositResult<RwLockWriteGuard<'_, HashMap<String, SecurityDeposit>>> {
        self.deposits
            .write()
            .map_err(|_| DepositError::Storage("deposit store lock poisoned".to_string()))
    }
}

impl Default for MemoryDepositRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DepositRepository for MemoryDepositRepository {
    async fn save_deposit(&mut self, deposit: &SecurityDeposit) -> DepositResult<()> {
        self.write()?.insert(deposit.id.clone(), deposit.clone());
        Ok(())
    }

    async fn get_deposit(&self, deposit_id: &str) -> DepositResult<Option<SecurityDeposit>> {
        Ok(self.read()?.get(deposit_id).cloned())
    }

    async fn list_deposits(
        &self,
        status: Option<DepositStatus>,
    ) -> DepositResult<Vec<SecurityDeposit>> {
        let deposits = self.read()?;
        let mut filtered: Vec<SecurityDeposit> = deposits
            .values()
            .filter(|deposit| status.is_none_or(|s| deposit.status == s))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| {
            a.deposit_date
                .cmp(&b.deposit_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(filtered)
    }

    async fn update_status(
        &mut self,
        deposit_id: &str,
        status: DepositStatus,
    ) -> DepositResult<()> {
        let mut deposits = self.write()?;
        let deposit = deposits
            .get_mut(deposit_id)
            .ok_or_else(|| DepositError::DepositNotFound(deposit_id.to_string()))?;

        // Terminal statuses are only reached through `process_refund`
        if status != DepositStatus::Held {
            return Err(DepositError::Validation(format!(
                "Status '{}' can only be set by processing a refund",
                status
            )));
        }

        deposit.status =
            DepositStatusMachine::transition(deposit.status, status, DepositOperation::MarkHeld)?;
        deposit.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }

    async fn add_deduction(
        &mut self,
        deposit_id: &str,
        deduction: &Deduction,
    ) -> DepositResult<()> {
        let mut deposits = self.write()?;
        let deposit = deposits
            .get_mut(deposit_id)
            .ok_or_else(|| DepositError::DepositNotFound(deposit_id.to_string()))?;

        DepositStatusMachine::ensure_held(deposit.status, DepositOperation::AddDeduction)?;

        let remaining = deposit.remaining_balance();
        if deduction.amount > remaining {
            return Err(DepositError::ExceedsRemainingBalance {
                requested: deduction.amount.clone(),
                remaining,
            });
        }

        deposit.push_deduction(deduction.clone());
        Ok(())
    }

    async fn process_refund(
        &mut self,
        deposit_id: &str,
        settlement: &RefundSettlement,
    ) -> DepositResult<()> {
        let mut deposits = self.write()?;
        let deposit = deposits
            .get_mut(deposit_id)
            .ok_or_else(|| DepositError::DepositNotFound(deposit_id.to_string()))?;

        DepositStatusMachine::transition(
            deposit.status,
            settlement.status,
            DepositOperation::ProcessRefund,
        )?;

        deposit.apply_settlement(settlement);
        Ok(())
    }
}
