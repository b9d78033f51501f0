//! Transaction Analytics Library
//!
//! Loads a table of payment transactions, summarises spend along time,
//! category, merchant, geography and payment channel, breaks down flagged
//! transactions, and assigns each transaction a rule-based anomaly score.

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod report;
pub mod types;
pub mod validation;

pub use analysis::AnomalyScorer;
pub use config::AppConfig;
pub use error::{AnalysisError, Result};
pub use loader::{load_transactions, load_with_report, read_transactions};
pub use report::AnalysisReport;
pub use types::{ScoredTransaction, Transaction, TransactionTable};
