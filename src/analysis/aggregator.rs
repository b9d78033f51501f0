//! Spend aggregation over a transaction table.
//!
//! Every function takes the table by reference and returns a fresh summary.
//! Groups are collected in key order (`BTreeMap`) and then stably sorted, so
//! rows with equal sort metrics keep their key order and output is
//! deterministic for identical input.

use crate::analysis::stats::{self, round_to};
use crate::error::{AnalysisError, Result};
use crate::types::summary::{
    BankSummary, BasicInfo, CategorySummary, DayOfWeekSummary, HeatmapRow, HourlySummary,
    MerchantSummary, MonthlySummary, PaymentModeSummary, StateSummary, StatusCount,
};
use crate::types::transaction::{Transaction, TransactionTable, WEEK};
use std::collections::{BTreeMap, HashSet};

/// Default number of rows returned by [`top_merchants`].
pub const DEFAULT_TOP_MERCHANTS: usize = 10;

/// Running totals for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct GroupTotals {
    pub total_spend: f64,
    pub count: usize,
    pub flagged: usize,
    pub flagged_spend: f64,
}

impl GroupTotals {
    fn add(&mut self, tx: &Transaction) {
        self.total_spend += tx.amount;
        self.count += 1;
        if tx.is_fraud {
            self.flagged += 1;
            self.flagged_spend += tx.amount;
        }
    }

    pub fn mean(&self) -> f64 {
        self.total_spend / self.count as f64
    }
}

/// Group rows by `key`, accumulating totals in row order.
pub(crate) fn group_by<K, F>(table: &TransactionTable, key: F) -> BTreeMap<K, GroupTotals>
where
    K: Ord,
    F: Fn(&Transaction) -> K,
{
    let mut groups: BTreeMap<K, GroupTotals> = BTreeMap::new();
    for tx in table {
        groups.entry(key(tx)).or_default().add(tx);
    }
    groups
}

/// Headline statistics. Fails on an empty table, where mean and median
/// are undefined.
pub fn basic_info(table: &TransactionTable) -> Result<BasicInfo> {
    let amounts = table.amounts();
    let mean = stats::mean(&amounts).ok_or(AnalysisError::EmptyDataset("mean"))?;
    let median = stats::median(&amounts).ok_or(AnalysisError::EmptyDataset("median"))?;

    let first_date = table
        .iter()
        .map(|t| t.date)
        .min()
        .ok_or(AnalysisError::EmptyDataset("date range"))?;
    let last_date = table
        .iter()
        .map(|t| t.date)
        .max()
        .ok_or(AnalysisError::EmptyDataset("date range"))?;

    let merchants: HashSet<&str> = table.iter().map(|t| t.merchant.as_str()).collect();
    let categories: HashSet<&str> = table.iter().map(|t| t.category.as_str()).collect();
    let flagged_count = table.iter().filter(|t| t.is_fraud).count();

    Ok(BasicInfo {
        total_transactions: table.len(),
        total_spend: amounts.iter().sum(),
        avg_transaction: round_to(mean, 2),
        median_transaction: median,
        first_date,
        last_date,
        unique_merchants: merchants.len(),
        unique_categories: categories.len(),
        flagged_count,
        fraud_rate_pct: round_to(flagged_count as f64 / table.len() as f64 * 100.0, 2),
    })
}

/// Spend per month present in the data, in calendar order.
pub fn monthly_summary(table: &TransactionTable) -> Vec<MonthlySummary> {
    group_by(table, |t| t.month_name)
        .into_iter()
        .map(|(month_name, g)| MonthlySummary {
            month_name,
            total_spend: g.total_spend,
            transaction_count: g.count,
            avg_spend: g.mean(),
            flagged: g.flagged,
        })
        .collect()
}

/// Spend per category, highest total first.
pub fn category_summary(table: &TransactionTable) -> Vec<CategorySummary> {
    let mut rows: Vec<CategorySummary> = group_by(table, |t| t.category.clone())
        .into_iter()
        .map(|(category, g)| CategorySummary {
            category,
            total_spend: g.total_spend,
            transaction_count: g.count,
            avg_spend: g.mean(),
            flagged: g.flagged,
        })
        .collect();
    rows.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    rows
}

/// The `n` merchants with the highest total spend.
pub fn top_merchants(table: &TransactionTable, n: usize) -> Vec<MerchantSummary> {
    let mut rows: Vec<MerchantSummary> = group_by(table, |t| t.merchant.clone())
        .into_iter()
        .map(|(merchant, g)| MerchantSummary {
            merchant,
            total_spend: g.total_spend,
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    rows.truncate(n);
    rows
}

/// Monday through Sunday, always seven rows.
pub fn day_of_week_summary(table: &TransactionTable) -> Vec<DayOfWeekSummary> {
    let groups = group_by(table, |t| t.day_of_week.num_days_from_monday());

    WEEK.iter()
        .map(|&day| match groups.get(&day.num_days_from_monday()) {
            Some(g) => DayOfWeekSummary {
                day_of_week: day,
                total_spend: g.total_spend,
                count: g.count,
                avg_spend: Some(g.mean()),
            },
            None => DayOfWeekSummary {
                day_of_week: day,
                total_spend: 0.0,
                count: 0,
                avg_spend: None,
            },
        })
        .collect()
}

/// Activity per hour present in the data, ascending.
pub fn hourly_summary(table: &TransactionTable) -> Vec<HourlySummary> {
    group_by(table, |t| t.hour)
        .into_iter()
        .map(|(hour, g)| HourlySummary {
            hour,
            count: g.count,
            flagged: g.flagged,
            total_spend: g.total_spend,
        })
        .collect()
}

/// Spend per payment mode, in key order.
pub fn payment_mode_summary(table: &TransactionTable) -> Vec<PaymentModeSummary> {
    group_by(table, |t| t.payment_mode.clone())
        .into_iter()
        .map(|(payment_mode, g)| PaymentModeSummary {
            payment_mode,
            count: g.count,
            total_spend: g.total_spend,
            avg_spend: g.mean(),
        })
        .collect()
}

/// Spend per state, highest total first.
pub fn state_summary(table: &TransactionTable) -> Vec<StateSummary> {
    let mut rows: Vec<StateSummary> = group_by(table, |t| t.state.clone())
        .into_iter()
        .map(|(state, g)| StateSummary {
            state,
            total_spend: g.total_spend,
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    rows
}

/// Spend per sender bank, highest total first.
pub fn sender_bank_summary(table: &TransactionTable) -> Vec<BankSummary> {
    let mut rows: Vec<BankSummary> = group_by(table, |t| t.sender_bank.clone())
        .into_iter()
        .map(|(sender_bank, g)| BankSummary {
            sender_bank,
            total_spend: g.total_spend,
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    rows
}

/// Number of transactions per recorded status, most common first.
pub fn status_split(table: &TransactionTable) -> Vec<StatusCount> {
    let mut rows: Vec<StatusCount> = group_by(table, |t| t.status)
        .into_iter()
        .map(|(status, g)| StatusCount {
            status,
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

/// Transaction counts per weekday and hour. Only weekdays with at least one
/// transaction are listed, Monday first.
pub fn activity_heatmap(table: &TransactionTable) -> Vec<HeatmapRow> {
    let mut grid: BTreeMap<u32, [usize; 24]> = BTreeMap::new();
    for tx in table {
        let row = grid
            .entry(tx.day_of_week.num_days_from_monday())
            .or_insert([0; 24]);
        if let Some(cell) = row.get_mut(tx.hour as usize) {
            *cell += 1;
        }
    }

    WEEK.iter()
        .filter_map(|&day| {
            grid.get(&day.num_days_from_monday()).map(|hours| HeatmapRow {
                day_of_week: day,
                hours: *hours,
            })
        })
        .collect()
}



#[cfg(test)]
mod proptests {
    use super::*;
    use super::fixtures::at;
    use crate::types::transaction::Transaction;
    use proptest::prelude::*;

    const CATEGORIES: [&str; 4] = ["Shopping", "Travel", "Utilities", "Healthcare"];

    /// (whole-rupee amount, month, day, hour, category index, fraud)
    fn row() -> impl Strategy<Value = (u32, u32, u32, u32, usize, bool)> {
        (1u32..50_000, 1u32..=12, 1u32..=28, 0u32..24, 0..CATEGORIES.len(), any::<bool>())
    }

    fn table_of(rows: &[(u32, u32, u32, u32, usize, bool)]) -> TransactionTable {
        rows.iter()
            .enumerate()
            .map(|(i, &(amount, month, day, hour, cat, fraud))| {
                let when = at(&format!("2024-{month:02}-{day:02} {hour:02}:00:00"));
                Transaction::new(format!("T{i}"), when, CATEGORIES[cat], "Amazon", f64::from(amount), fraud)
            })
            .collect::<Vec<_>>()
            .into()
    }

    proptest! {
        #[test]
        fn category_totals_add_up_to_table_total(rows in prop::collection::vec(row(), 0..60)) {
            let table = table_of(&rows);
            let summed: f64 = category_summary(&table).iter().map(|r| r.total_spend).sum();
            let expected: f64 = table.amounts().iter().sum();
            prop_assert_eq!(summed, expected);

            let counted: usize = category_summary(&table).iter().map(|r| r.transaction_count).sum();
            prop_assert_eq!(counted, table.len());
        }

        #[test]
        fn monthly_rows_follow_the_calendar(rows in prop::collection::vec(row(), 0..60)) {
            let months: Vec<u32> = monthly_summary(&table_of(&rows))
                .iter()
                .map(|r| r.month_name.number())
                .collect();
            prop_assert!(months.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn summaries_ignore_row_order(
            (rows, shuffled) in prop::collection::vec(row(), 1..40)
                .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
        ) {
            let (a, b) = (table_of(&rows), table_of(&shuffled));
            prop_assert_eq!(monthly_summary(&a), monthly_summary(&b));
            prop_assert_eq!(hourly_summary(&a), hourly_summary(&b));
            prop_assert_eq!(activity_heatmap(&a), activity_heatmap(&b));
        }
    }
}
