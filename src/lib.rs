//! # Deposit Core
//!
//! Security deposit management for property management systems: the deposit
//! lifecycle, a deduction ledger, and refund settlement.
//!
//! ## Features
//!
//! - **Lifecycle**: `unpaid -> held -> partial_refunded | refunded`, with terminal states enforced
//! - **Deduction ledger**: deductions are validated against the remaining balance
//! - **Refund settlement**: refund = amount - deductions + accrued interest, settled exactly once
//! - **Storage abstraction**: backend-agnostic design with trait-based repositories
//!
//! ## Quick Start
//!
//! ```rust
//! use deposit_core::{
//!     AddDeductionRequest, DeductionCategory, DeductionLedger, NewDeposit, RefundCalculator,
//!     SecurityDeposit,
//! };
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//! let deposit = SecurityDeposit::new(NewDeposit::held(
//!     "lease-1".to_string(),
//!     "tenant-1".to_string(),
//!     "property-1".to_string(),
//!     BigDecimal::from(1000),
//!     today,
//! ));
//!
//! let outcome = DeductionLedger::default()
//!     .add_deduction(
//!         &deposit,
//!         &AddDeductionRequest::new(
//!             BigDecimal::from(300),
//!             "Move-out cleaning".to_string(),
//!             DeductionCategory::Cleaning,
//!         ),
//!         today,
//!     )
//!     .unwrap();
//!
//! let refund = RefundCalculator::default().compute_refund(&outcome.deposit);
//! assert_eq!(refund, BigDecimal::from(700));
//! ```

pub mod config;
pub mod deposit;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use crate::config::DepositPolicy;
pub use deposit::*;
pub use traits::*;
pub use types::*;
