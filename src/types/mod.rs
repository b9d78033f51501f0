//! Type definitions for transaction analysis

pub mod score;
pub mod summary;
pub mod transaction;

pub use score::{RiskLevel, ScoredTransaction};
pub use transaction::{MonthName, Status, Transaction, TransactionTable};
