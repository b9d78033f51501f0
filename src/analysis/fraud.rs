//! Breakdowns of flagged transactions

use crate::analysis::aggregator::group_by;
use crate::types::summary::{FraudByCategory, FraudByHour, FraudByMonth};
use crate::types::transaction::TransactionTable;

/// Flagged rows, largest amount first. Equal amounts keep input order.
pub fn flagged_transactions(table: &TransactionTable) -> TransactionTable {
    let mut rows = table.filter(|t| t.is_fraud).rows().to_vec();
    rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    TransactionTable::new(rows)
}

/// Flagged and total counts for every hour present, ascending.
pub fn fraud_by_hour(table: &TransactionTable) -> Vec<FraudByHour> {
    group_by(table, |t| t.hour)
        .into_iter()
        .map(|(hour, g)| FraudByHour {
            hour,
            fraud: g.flagged,
            total: g.count,
        })
        .collect()
}

/// Per-category fraud counts and flagged spend, most flagged first.
pub fn fraud_by_category(table: &TransactionTable) -> Vec<FraudByCategory> {
    let mut rows: Vec<FraudByCategory> = group_by(table, |t| t.category.clone())
        .into_iter()
        .map(|(category, g)| FraudByCategory {
            category,
            fraud_count: g.flagged,
            total: g.count,
            fraud_amount: g.flagged_spend,
        })
        .collect();
    rows.sort_by(|a, b| b.fraud_count.cmp(&a.fraud_count));
    rows
}

/// Flagged and total counts per month, in calendar order.
pub fn fraud_by_month(table: &TransactionTable) -> Vec<FraudByMonth> {
    group_by(table, |t| t.month_name)
        .into_iter()
        .map(|(month_name, g)| FraudByMonth {
            month_name,
            fraud: g.flagged,
            total: g.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::fixtures::{sample_table, tx};
    use crate::types::transaction::MonthName;

    #[test]
    fn test_fraud_by_hour_scenario() {
        let table = TransactionTable::from(vec![
            tx("a", "2024-05-01 10:00:00", "Shopping", "Amazon", 100.0, false),
            tx("b", "2024-05-01 02:00:00", "Travel", "OYO", 5000.0, true),
            tx("c", "2024-05-01 14:00:00", "Travel", "Goibibo", 8000.0, false),
        ]);
        let rows = fraud_by_hour(&table);

        assert_eq!(
            rows,
            vec![
                FraudByHour { hour: 2, fraud: 1, total: 1 },
                FraudByHour { hour: 10, fraud: 0, total: 1 },
                FraudByHour { hour: 14, fraud: 0, total: 1 },
            ]
        );
    }

    #[test]
    fn test_flagged_transactions_sorted_desc() {
        let table = sample_table();
        let flagged = flagged_transactions(&table);

        let ids: Vec<&str> = flagged.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T3", "T5"]);
        assert!(flagged.iter().all(|t| t.is_fraud));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_flagged_transactions_ties_keep_input_order() {
        let table = TransactionTable::from(vec![
            tx("first", "2024-05-01 02:00:00", "Travel", "OYO", 6000.0, true),
            tx("second", "2024-05-02 03:00:00", "Travel", "OYO", 6000.0, true),
        ]);
        let ids: Vec<String> = flagged_transactions(&table)
            .iter()
            .map(|t| t.transaction_id.clone())
            .collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_fraud_by_category_uses_flagged_amount_only() {
        let table = TransactionTable::from(vec![
            tx("a", "2024-05-01 02:00:00", "Travel", "OYO", 5000.0, true),
            tx("b", "2024-05-01 12:00:00", "Travel", "OYO", 1000.0, false),
            tx("c", "2024-05-01 03:00:00", "Shopping", "Amazon", 7500.0, true),
            tx("d", "2024-05-01 03:30:00", "Shopping", "Amazon", 4100.0, true),
            tx("e", "2024-05-01 09:00:00", "Utilities", "Jio", 600.0, false),
        ]);
        let rows = fraud_by_category(&table);

        assert_eq!(rows[0].category, "Shopping");
        assert_eq!(rows[0].fraud_count, 2);
        assert_eq!(rows[0].fraud_amount, 11600.0);
        assert_eq!(rows[1].category, "Travel");
        assert_eq!(rows[1].total, 2);
        assert_eq!(rows[1].fraud_amount, 5000.0);
        assert_eq!(rows[2].fraud_count, 0);
        assert_eq!(rows[2].fraud_amount, 0.0);
    }

    #[test]
    fn test_fraud_by_month_calendar_order() {
        let rows = fraud_by_month(&sample_table());
        let months: Vec<MonthName> = rows.iter().map(|r| r.month_name).collect();
        assert_eq!(
            months,
            vec![
                MonthName::January,
                MonthName::February,
                MonthName::April,
                MonthName::November
            ]
        );
        assert_eq!(rows[1].fraud, 1);
        assert_eq!(rows[1].total, 2);
        assert_eq!(rows[0].fraud, 0);
    }

    #[test]
    fn test_empty_table_gives_empty_breakdowns() {
        let empty = TransactionTable::default();
        assert!(flagged_transactions(&empty).is_empty());
        assert!(fraud_by_hour(&empty).is_empty());
        assert!(fraud_by_category(&empty).is_empty());
        assert!(fraud_by_month(&empty).is_empty());
    }

    #[test]
    fn test_breakdowns_are_idempotent() {
        let table = sample_table();
        let before = table.clone();

        assert_eq!(flagged_transactions(&table), flagged_transactions(&table));
        assert_eq!(fraud_by_hour(&table), fraud_by_hour(&table));
        assert_eq!(fraud_by_category(&table), fraud_by_category(&table));
        assert_eq!(fraud_by_month(&table), fraud_by_month(&table));
        assert_eq!(table, before);
    }
}
