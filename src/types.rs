//! Core types and data structures for the deposit system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a security deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Deposit has been agreed but not yet collected from the tenant
    Unpaid,
    /// Deposit is held by the landlord pending lease-end settlement
    Held,
    /// Deposit was settled with deductions taken
    PartialRefunded,
    /// Deposit was settled in full
    Refunded,
}

impl DepositStatus {
    /// All statuses in lifecycle order
    pub const ALL: [DepositStatus; 4] = [
        DepositStatus::Unpaid,
        DepositStatus::Held,
        DepositStatus::PartialRefunded,
        DepositStatus::Refunded,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Unpaid => "unpaid",
            DepositStatus::Held => "held",
            DepositStatus::PartialRefunded => "partial_refunded",
            DepositStatus::Refunded => "refunded",
        }
    }

    /// Statuses a deposit may be created in
    pub fn is_initial(&self) -> bool {
        matches!(self, DepositStatus::Unpaid | DepositStatus::Held)
    }

    /// Statuses from which no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DepositStatus::PartialRefunded | DepositStatus::Refunded
        )
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositStatus {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unpaid" => Ok(DepositStatus::Unpaid),
            "held" => Ok(DepositStatus::Held),
            "partial_refunded" => Ok(DepositStatus::PartialRefunded),
            "refunded" => Ok(DepositStatus::Refunded),
            other => Err(DepositError::Validation(format!(
                "Unknown deposit status '{}'",
                other
            ))),
        }
    }
}

/// Category of a charge taken against a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionCategory {
    /// Repairs for damage beyond normal wear and tear
    Damage,
    /// Cleaning costs at move-out
    Cleaning,
    /// Rent left unpaid at the end of the lease
    UnpaidRent,
    /// Fees for late rent payments
    LateFees,
    /// Anything else
    Other,
}

impl DeductionCategory {
    pub const ALL: [DeductionCategory; 5] = [
        DeductionCategory::Damage,
        DeductionCategory::Cleaning,
        DeductionCategory::UnpaidRent,
        DeductionCategory::LateFees,
        DeductionCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeductionCategory::Damage => "damage",
            DeductionCategory::Cleaning => "cleaning",
            DeductionCategory::UnpaidRent => "unpaid_rent",
            DeductionCategory::LateFees => "late_fees",
            DeductionCategory::Other => "other",
        }
    }
}

impl fmt::Display for DeductionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeductionCategory {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeductionCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| DepositError::Validation(format!("Unknown deduction category '{}'", s)))
    }
}

/// How a refund is paid out to the tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethod {
    Check,
    BankTransfer,
    Cash,
}

impl RefundMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundMethod::Check => "check",
            RefundMethod::BankTransfer => "bank_transfer",
            RefundMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for RefundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundMethod {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "check" => Ok(RefundMethod::Check),
            "bank_transfer" => Ok(RefundMethod::BankTransfer),
            "cash" => Ok(RefundMethod::Cash),
            other => Err(DepositError::Validation(format!(
                "Unknown refund method '{}'",
                other
            ))),
        }
    }
}

/// A single charge against a deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    /// Unique identifier for the deduction
    pub id: String,
    /// Date the charge applies to
    pub date: NaiveDate,
    /// Amount charged, always positive
    pub amount: BigDecimal,
    /// What the charge is for
    pub description: String,
    /// Category of the charge
    pub category: DeductionCategory,
    /// Optional receipt or invoice reference
    pub receipt: Option<String>,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// When the deduction was recorded
    pub created_at: NaiveDateTime,
}

impl Deduction {
    /// Build a deduction from a request, defaulting the date to `today`
    pub fn from_request(request: &AddDeductionRequest, today: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: request.date.unwrap_or(today),
            amount: request.amount.clone(),
            description: request.description.trim().to_string(),
            category: request.category,
            receipt: request.receipt.clone(),
            notes: crate::utils::validation::normalize_notes(request.notes.as_deref()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Parameters for creating a deposit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDeposit {
    /// Explicit identifier; a uuid is generated when absent
    pub id: Option<String>,
    pub lease_id: String,
    pub tenant_id: String,
    pub property_id: String,
    pub amount: BigDecimal,
    pub deposit_date: NaiveDate,
    pub status: DepositStatus,
    pub interest_accrued: Option<BigDecimal>,
}

impl NewDeposit {
    /// Parameters for a deposit that has already been collected
    pub fn held(
        lease_id: String,
        tenant_id: String,
        property_id: String,
        amount: BigDecimal,
        deposit_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            lease_id,
            tenant_id,
            property_id,
            amount,
            deposit_date,
            status: DepositStatus::Held,
            interest_accrued: None,
        }
    }

    /// Parameters for a deposit that is still awaiting payment
    pub fn unpaid(
        lease_id: String,
        tenant_id: String,
        property_id: String,
        amount: BigDecimal,
        deposit_date: NaiveDate,
    ) -> Self {
        Self {
            status: DepositStatus::Unpaid,
            ..Self::held(lease_id, tenant_id, property_id, amount, deposit_date)
        }
    }

    /// Set an explicit identifier
    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    /// Set interest accrued on the deposit
    pub fn with_interest(mut self, interest: BigDecimal) -> Self {
        self.interest_accrued = Some(interest);
        self
    }
}

/// A tenant's security deposit tied to a lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityDeposit {
    /// Unique identifier for the deposit
    pub id: String,
    pub lease_id: String,
    pub tenant_id: String,
    pub property_id: String,
    /// Original deposit amount, immutable after creation
    pub amount: BigDecimal,
    /// Date the deposit was collected or recorded
    pub deposit_date: NaiveDate,
    /// Current lifecycle status
    pub status: DepositStatus,
    /// Charges taken against the deposit, in insertion order
    pub deductions: Vec<Deduction>,
    /// Interest accrued while held, paid out with the refund
    pub interest_accrued: Option<BigDecimal>,
    /// Final payout, set once on settlement
    pub refund_amount: Option<BigDecimal>,
    pub refund_date: Option<NaiveDate>,
    pub refund_method: Option<RefundMethod>,
    pub refund_notes: Option<String>,
    /// When the deposit was created
    pub created_at: NaiveDateTime,
    /// When the deposit was last updated
    pub updated_at: NaiveDateTime,
}

impl SecurityDeposit {
    /// Create a new deposit record
    pub fn new(params: NewDeposit) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: params
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            lease_id: params.lease_id,
            tenant_id: params.tenant_id,
            property_id: params.property_id,
            amount: params.amount,
            deposit_date: params.deposit_date,
            status: params.status,
            deductions: Vec::new(),
            interest_accrued: params.interest_accrued,
            refund_amount: None,
            refund_date: None,
            refund_method: None,
            refund_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of all deduction amounts
    pub fn total_deductions(&self) -> BigDecimal {
        self.deductions.iter().map(|d| &d.amount).sum()
    }

    /// Deposit amount minus deductions recorded so far
    pub fn remaining_balance(&self) -> BigDecimal {
        &self.amount - self.total_deductions()
    }

    /// Interest accrued, zero when absent or negative
    pub fn interest(&self) -> BigDecimal {
        let zero = BigDecimal::from(0);
        match &self.interest_accrued {
            Some(interest) if *interest > zero => interest.clone(),
            _ => zero,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    /// Append a deduction without validation.
    ///
    /// Callers are expected to have gone through [`crate::DeductionLedger`].
    pub fn push_deduction(&mut self, deduction: Deduction) {
        self.deductions.push(deduction);
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Apply a computed settlement to the record without validation
    pub fn apply_settlement(&mut self, settlement: &RefundSettlement) {
        self.refund_amount = Some(settlement.refund_amount.clone());
        self.refund_date = Some(settlement.refund_date);
        self.refund_method = Some(settlement.refund_method);
        self.refund_notes = settlement.refund_notes.clone();
        self.status = settlement.status;
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// Request to record a deduction against a held deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDeductionRequest {
    /// Date of the charge; defaults to the current date
    pub date: Option<NaiveDate>,
    pub amount: BigDecimal,
    pub description: String,
    pub category: DeductionCategory,
    pub receipt: Option<String>,
    pub notes: Option<String>,
}

impl AddDeductionRequest {
    /// Create a request dated today with no receipt or notes
    pub fn new(amount: BigDecimal, description: String, category: DeductionCategory) -> Self {
        Self {
            date: None,
            amount,
            description,
            category,
            receipt: None,
            notes: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn receipt(mut self, receipt: String) -> Self {
        self.receipt = Some(receipt);
        self
    }

    pub fn notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }
}

/// Request to settle a held deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRefundRequest {
    pub refund_date: NaiveDate,
    pub refund_method: RefundMethod,
    pub refund_notes: Option<String>,
}

impl ProcessRefundRequest {
    pub fn new(refund_date: NaiveDate, refund_method: RefundMethod) -> Self {
        Self {
            refund_date,
            refund_method,
            refund_notes: None,
        }
    }

    pub fn notes(mut self, notes: String) -> Self {
        self.refund_notes = Some(notes);
        self
    }
}

/// The computed refund, persisted as one atomic update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundSettlement {
    pub refund_amount: BigDecimal,
    pub refund_date: NaiveDate,
    pub refund_method: RefundMethod,
    pub refund_notes: Option<String>,
    /// Terminal status the deposit moves into
    pub status: DepositStatus,
}

/// Operations that depend on the deposit's lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositOperation {
    MarkHeld,
    AddDeduction,
    ProcessRefund,
}

impl fmt::Display for DepositOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DepositOperation::MarkHeld => "mark as held",
            DepositOperation::AddDeduction => "add a deduction",
            DepositOperation::ProcessRefund => "process a refund",
        })
    }
}

/// Errors that can occur in the deposit system
#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    #[error("Cannot {operation} on a deposit with status '{status}'")]
    InvalidState {
        operation: DepositOperation,
        status: DepositStatus,
    },
    #[error("Deduction of {requested} exceeds remaining balance of {remaining}")]
    ExceedsRemainingBalance {
        requested: BigDecimal,
        remaining: BigDecimal,
    },
    #[error("Refund date {refund_date} cannot be later than {today}")]
    InvalidDate {
        refund_date: NaiveDate,
        today: NaiveDate,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Deposit not found: {0}")]
    DepositNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DepositError {
    /// Stable code for presenting the error to callers
    pub fn error_code(&self) -> &'static str {
        match self {
            DepositError::InvalidState { .. } => "INVALID_STATE",
            DepositError::ExceedsRemainingBalance { .. } => "EXCEEDS_REMAINING_BALANCE",
            DepositError::InvalidDate { .. } => "INVALID_DATE",
            DepositError::Validation(_) => "VALIDATION_ERROR",
            DepositError::DepositNotFound(_) => "DEPOSIT_NOT_FOUND",
            DepositError::Storage(_) => "STORAGE_ERROR",
            DepositError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Business rule violations the user can correct
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DepositError::InvalidState { .. }
                | DepositError::ExceedsRemainingBalance { .. }
                | DepositError::InvalidDate { .. }
                | DepositError::Validation(_)
        )
    }
}

/// Result type for deposit operations
pub type DepositResult<T> = Result<T, DepositError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deposit() -> SecurityDeposit {
        SecurityDeposit::new(NewDeposit::held(
            "lease-1".to_string(),
            "tenant-1".to_string(),
            "property-1".to_string(),
            BigDecimal::from(1000),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ))
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&DepositStatus::PartialRefunded).unwrap(),
            "\"partial_refunded\""
        );
        assert_eq!(
            serde_json::from_str::<DeductionCategory>("\"unpaid_rent\"").unwrap(),
            DeductionCategory::UnpaidRent
        );
        assert_eq!(
            serde_json::to_string(&RefundMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
    }

    #[test]
    fn test_parse_enums() {
        for status in DepositStatus::ALL {
            assert_eq!(status.as_str().parse::<DepositStatus>().unwrap(), status);
        }
        for category in DeductionCategory::ALL {
            assert_eq!(
                category.as_str().parse::<DeductionCategory>().unwrap(),
                category
            );
        }
        assert_eq!("cash".parse::<RefundMethod>().unwrap(), RefundMethod::Cash);

        let err = "painting".parse::<DeductionCategory>().unwrap_err();
        assert!(matches!(err, DepositError::Validation(_)));
        assert!("wire".parse::<RefundMethod>().is_err());
        assert!("closed".parse::<DepositStatus>().is_err());
    }

    #[test]
    fn test_initial_and_terminal_statuses() {
        assert!(DepositStatus::Unpaid.is_initial());
        assert!(DepositStatus::Held.is_initial());
        assert!(!DepositStatus::Held.is_terminal());
        assert!(DepositStatus::PartialRefunded.is_terminal());
        assert!(DepositStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_new_deposit_defaults() {
        let deposit = sample_deposit();
        assert_eq!(deposit.status, DepositStatus::Held);
        assert!(deposit.deductions.is_empty());
        assert!(deposit.refund_amount.is_none());
        assert_eq!(deposit.total_deductions(), BigDecimal::from(0));
        assert_eq!(deposit.remaining_balance(), BigDecimal::from(1000));
        assert_eq!(deposit.interest(), BigDecimal::from(0));
        assert!(uuid::Uuid::parse_str(&deposit.id).is_ok());
    }

    #[test]
    fn test_negative_interest_counts_as_zero() {
        let mut deposit = sample_deposit();
        deposit.interest_accrued = Some(BigDecimal::from(-25));
        assert_eq!(deposit.interest(), BigDecimal::from(0));

        deposit.interest_accrued = Some(BigDecimal::from(25));
        assert_eq!(deposit.interest(), BigDecimal::from(25));
    }

    #[test]
    fn test_deduction_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let request = AddDeductionRequest::new(
            BigDecimal::from(50),
            "  Carpet cleaning ".to_string(),
            DeductionCategory::Cleaning,
        );
        let deduction = Deduction::from_request(&request, today);
        assert_eq!(deduction.date, today);
        assert_eq!(deduction.description, "Carpet cleaning");
        assert!(deduction.notes.is_none());

        let noted = request.clone().notes("  Receipt in folder  ".to_string());
        let deduction = Deduction::from_request(&noted, today);
        assert_eq!(deduction.notes.as_deref(), Some("Receipt in folder"));

        let blank = request.clone().notes("   ".to_string());
        assert!(Deduction::from_request(&blank, today).notes.is_none());

        let dated = request.on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let deduction = Deduction::from_request(&dated, today);
        assert_eq!(deduction.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_error_codes_and_messages() {
        let err = DepositError::InvalidState {
            operation: DepositOperation::AddDeduction,
            status: DepositStatus::Refunded,
        };
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert_eq!(
            err.to_string(),
            "Cannot add a deduction on a deposit with status 'refunded'"
        );
        assert!(err.is_user_facing());

        let err = DepositError::ExceedsRemainingBalance {
            requested: BigDecimal::from(1100),
            remaining: BigDecimal::from(1000),
        };
        assert_eq!(
            err.to_string(),
            "Deduction of 1100 exceeds remaining balance of 1000"
        );

        assert!(!DepositError::Storage("down".to_string()).is_user_facing());
        assert_eq!(
            DepositError::DepositNotFound("d1".to_string()).error_code(),
            "DEPOSIT_NOT_FOUND"
        );
    }
}
