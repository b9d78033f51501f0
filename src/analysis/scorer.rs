//! Rule-based anomaly scoring.
//!
//! A score is the sum of three rules, clipped to [0, 100] and rounded to one
//! decimal:
//!
//! * amount percentile rank over the whole table, times `percentile_points`
//! * `odd_hour_points` when the hour falls in the half-open odd-hour window
//! * `high_value_points` when the amount is strictly above the configured
//!   quantile of all amounts
//!
//! Both the rank and the quantile are computed over the table being scored,
//! so scores are relative to that table and change if it is filtered first.

use crate::analysis::stats::{self, round_to};
use crate::config::ScoringConfig;
use crate::types::score::{RiskLevel, ScoreComponents, ScoredTransaction};
use crate::types::transaction::TransactionTable;
use tracing::debug;

/// Upper bound of the combined score
pub const MAX_SCORE: f64 = 100.0;

/// Scores every transaction of a table against the table as a whole.
#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer {
    config: ScoringConfig,
}

impl AnomalyScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Return a scored copy of `table`, in the same row order.
    pub fn score(&self, table: &TransactionTable) -> Vec<ScoredTransaction> {
        let amounts = table.amounts();
        let ranks = stats::percentile_ranks(&amounts);
        let Some(high_value_threshold) = stats::quantile(&amounts, self.config.high_value_quantile)
        else {
            return Vec::new();
        };

        debug!(
            rows = table.len(),
            high_value_threshold,
            quantile = self.config.high_value_quantile,
            "Scoring transactions"
        );

        table
            .iter()
            .zip(ranks)
            .map(|(tx, rank)| {
                let components = ScoreComponents {
                    amount_percentile: rank * self.config.percentile_points,
                    odd_hour: if self.config.is_odd_hour(tx.hour) {
                        self.config.odd_hour_points
                    } else {
                        0.0
                    },
                    high_value: if tx.amount > high_value_threshold {
                        self.config.high_value_points
                    } else {
                        0.0
                    },
                };
                let anomaly_score = round_to(components.total().clamp(0.0, MAX_SCORE), 1);

                ScoredTransaction {
                    transaction: tx.clone(),
                    anomaly_score,
                    risk_level: RiskLevel::from_score(anomaly_score, &self.config.risk_levels),
                    components,
                }
            })
            .collect()
    }
}

/// The `n` highest-scoring transactions, highest first. Equal scores keep
/// their input order.
pub fn top_risky(scored: &[ScoredTransaction], n: usize) -> Vec<ScoredTransaction> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| b.anomaly_score.total_cmp(&a.anomaly_score));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::fixtures::{sample_table, tx};
    use std::collections::HashMap;

    fn scores_by_id(scored: &[ScoredTransaction]) -> HashMap<String, f64> {
        scored
            .iter()
            .map(|s| (s.transaction.transaction_id.clone(), s.anomaly_score))
            .collect()
    }

    #[test]
    fn test_three_row_scores() {
        let table = TransactionTable::from(vec![
            tx("a", "2024-05-01 10:00:00", "Shopping", "Amazon", 100.0, false),
            tx("b", "2024-05-01 02:00:00", "Travel", "OYO", 5000.0, true),
            tx("c", "2024-05-01 14:00:00", "Travel", "Goibibo", 8000.0, false),
        ]);
        let scored = AnomalyScorer::default().score(&table);

        // q95 = 5000 + 0.9 * 3000 = 7700, so only c is high value
        assert_eq!(scored[0].anomaly_score, 13.3);
        assert_eq!(scored[1].anomaly_score, 56.7);
        assert_eq!(scored[2].anomaly_score, 60.0);
        assert_eq!(scored[1].components.triggered_rules(), vec!["odd_hour"]);
        assert_eq!(scored[2].components.triggered_rules(), vec!["high_value"]);
        assert_eq!(scored[2].risk_level, RiskLevel::High);
        assert_eq!(scored[0].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_equal_amounts_get_equal_percentile_points() {
        let table = TransactionTable::from(vec![
            tx("a", "2024-05-01 10:00:00", "Shopping", "Amazon", 700.0, false),
            tx("b", "2024-05-01 11:00:00", "Shopping", "Myntra", 250.0, false),
            tx("c", "2024-05-01 12:00:00", "Shopping", "Ajio", 700.0, false),
        ]);
        let scored = AnomalyScorer::default().score(&table);

        assert_eq!(
            scored[0].components.amount_percentile,
            scored[2].components.amount_percentile
        );
        assert_eq!(scored[0].anomaly_score, scored[2].anomaly_score);
    }

    #[test]
    fn test_odd_hour_boundaries() {
        let table = TransactionTable::from(vec![
            tx("h0", "2024-05-01 00:30:00", "Shopping", "Amazon", 500.0, false),
            tx("h1", "2024-05-01 01:00:00", "Shopping", "Amazon", 500.0, false),
            tx("h4", "2024-05-01 04:59:59", "Shopping", "Amazon", 500.0, false),
            tx("h5", "2024-05-01 05:00:00", "Shopping", "Amazon", 500.0, false),
        ]);
        let scored = AnomalyScorer::default().score(&table);
        let odd: Vec<f64> = scored.iter().map(|s| s.components.odd_hour).collect();

        assert_eq!(odd, vec![0.0, 30.0, 30.0, 0.0]);
    }

    #[test]
    fn test_scores_within_bounds_and_deterministic() {
        let table = sample_table();
        let scorer = AnomalyScorer::default();
        let first = scorer.score(&table);
        let second = scorer.score(&table);

        assert_eq!(first, second);
        for s in &first {
            assert!((0.0..=MAX_SCORE).contains(&s.anomaly_score));
        }
    }

    #[test]
    fn test_scores_ignore_row_order() {
        let table = sample_table();
        let mut shuffled = table.rows().to_vec();
        shuffled.rotate_left(3);
        shuffled.swap(0, 4);

        let scorer = AnomalyScorer::default();
        assert_eq!(
            scores_by_id(&scorer.score(&table)),
            scores_by_id(&scorer.score(&TransactionTable::from(shuffled)))
        );
    }

    #[test]
    fn test_score_leaves_input_untouched() {
        let table = sample_table();
        let before = table.clone();
        let scored = AnomalyScorer::default().score(&table);

        assert_eq!(table, before);
        assert_eq!(scored.len(), table.len());
        for (s, t) in scored.iter().zip(table.iter()) {
            assert_eq!(&s.transaction, t);
        }
    }

    #[test]
    fn test_clipping_with_oversized_points() {
        let config = ScoringConfig {
            percentile_points: 80.0,
            odd_hour_points: 50.0,
            high_value_points: 40.0,
            ..ScoringConfig::default()
        };
        let table = TransactionTable::from(vec![
            tx("a", "2024-05-01 02:00:00", "Travel", "OYO", 100.0, false),
            tx("b", "2024-05-01 03:00:00", "Travel", "OYO", 9000.0, true),
        ]);
        let scored = AnomalyScorer::new(config).score(&table);

        assert_eq!(scored[1].anomaly_score, MAX_SCORE);
        assert_eq!(scored[1].risk_level, RiskLevel::Critical);
        assert!(scored[1].components.total() > MAX_SCORE);
    }

    #[test]
    fn test_empty_table() {
        assert!(AnomalyScorer::default()
            .score(&TransactionTable::default())
            .is_empty());
    }

    #[test]
    fn test_top_risky() {
        let scored = AnomalyScorer::default().score(&sample_table());
        let top = top_risky(&scored, 3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].transaction.transaction_id, "T3");
        assert!(top
            .windows(2)
            .all(|w| w[0].anomaly_score >= w[1].anomaly_score));
        assert_eq!(top_risky(&scored, 100).len(), scored.len());
    }
}
