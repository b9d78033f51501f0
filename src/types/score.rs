//! Anomaly score data structures

use crate::types::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Risk level classification of an anomaly score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine risk level from a 0-100 score and thresholds
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Lower bounds (inclusive) of each risk band on the 0-100 score scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 40.0,
            high: 60.0,
            critical: 80.0,
        }
    }
}

/// Points contributed by each scoring rule, before clipping and rounding
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreComponents {
    /// Amount percentile rank scaled to the percentile budget
    pub amount_percentile: f64,
    /// Awarded when the transaction happened in the odd-hour window
    pub odd_hour: f64,
    /// Awarded when the amount is above the high-value quantile
    pub high_value: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.amount_percentile + self.odd_hour + self.high_value
    }

    /// Names of the binary rules that fired
    pub fn triggered_rules(&self) -> Vec<&'static str> {
        let mut rules = Vec::new();
        if self.odd_hour > 0.0 {
            rules.push("odd_hour");
        }
        if self.high_value > 0.0 {
            rules.push("high_value");
        }
        rules
    }
}

/// A transaction together with its anomaly score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    /// Combined score in [0, 100], one decimal place
    pub anomaly_score: f64,

    pub risk_level: RiskLevel,

    pub components: ScoreComponents,
}
