//! Summaries and scoring over a loaded transaction table

pub mod aggregator;
pub mod fraud;
pub mod scorer;
pub mod stats;

pub use scorer::AnomalyScorer;
