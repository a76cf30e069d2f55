//! Deposit module containing the lifecycle, deduction ledger, and refund settlement

pub mod core;
pub mod deduction;
pub mod refund;
pub mod status;
pub mod summary;

pub use self::core::*;
pub use deduction::*;
pub use refund::*;
pub use status::*;
pub use summary::*;
