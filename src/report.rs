//! Bundles every summary of a run and writes it out for the rendering layer.

use crate::analysis::{aggregator, fraud, scorer};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::types::score::{RiskLevel, ScoredTransaction};
use crate::types::summary::{
    BankSummary, BasicInfo, CategorySummary, DayOfWeekSummary, FraudByCategory, FraudByHour,
    FraudByMonth, HeatmapRow, HourlySummary, MerchantSummary, MonthlySummary,
    PaymentModeSummary, StateSummary, StatusCount,
};
use crate::types::transaction::{weekday_name, TransactionTable};
use crate::validation::ValidationReport;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Header of the scored CSV export
pub const SCORED_CSV_HEADER: [&str; 19] = [
    "transaction_id",
    "date",
    "time",
    "datetime",
    "month",
    "month_name",
    "day_of_week",
    "hour",
    "category",
    "merchant",
    "amount",
    "payment_mode",
    "sender_bank",
    "receiver_bank",
    "state",
    "status",
    "is_fraud",
    "anomaly_score",
    "risk_level",
];

/// Fraud-only breakdowns
#[derive(Debug, Clone, Serialize)]
pub struct FraudReport {
    pub flagged: TransactionTable,
    pub by_hour: Vec<FraudByHour>,
    pub by_category: Vec<FraudByCategory>,
    pub by_month: Vec<FraudByMonth>,
}

/// Every table produced by one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub basic_info: BasicInfo,
    pub monthly: Vec<MonthlySummary>,
    pub categories: Vec<CategorySummary>,
    pub top_merchants: Vec<MerchantSummary>,
    pub day_of_week: Vec<DayOfWeekSummary>,
    pub hourly: Vec<HourlySummary>,
    pub payment_modes: Vec<PaymentModeSummary>,
    pub states: Vec<StateSummary>,
    pub sender_banks: Vec<BankSummary>,
    pub status_split: Vec<StatusCount>,
    pub activity_heatmap: Vec<HeatmapRow>,
    pub fraud: FraudReport,
    pub top_risky: Vec<ScoredTransaction>,
    pub validation: ValidationReport,
}

impl AnalysisReport {
    /// Run every summary over `table`. Fails only when the table is empty.
    pub fn build(
        table: &TransactionTable,
        scored: &[ScoredTransaction],
        validation: ValidationReport,
        limits: &AnalysisConfig,
    ) -> Result<Self> {
        Ok(Self {
            basic_info: aggregator::basic_info(table)?,
            monthly: aggregator::monthly_summary(table),
            categories: aggregator::category_summary(table),
            top_merchants: aggregator::top_merchants(table, limits.top_merchants),
            day_of_week: aggregator::day_of_week_summary(table),
            hourly: aggregator::hourly_summary(table),
            payment_modes: aggregator::payment_mode_summary(table),
            states: aggregator::state_summary(table),
            sender_banks: aggregator::sender_bank_summary(table),
            status_split: aggregator::status_split(table),
            activity_heatmap: aggregator::activity_heatmap(table),
            fraud: FraudReport {
                flagged: fraud::flagged_transactions(table),
                by_hour: fraud::fraud_by_hour(table),
                by_category: fraud::fraud_by_category(table),
                by_month: fraud::fraud_by_month(table),
            },
            top_risky: scorer::top_risky(scored, limits.top_risky),
            validation,
        })
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }

    /// Log a boxed summary of the run
    pub fn log_summary(&self, scored: &[ScoredTransaction]) {
        let info_row = &self.basic_info;
        let levels = risk_level_counts(scored);

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             TRANSACTION ANALYSIS - RUN SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions: {:>8}  │  Total Spend: {:>14.2}        ║",
            info_row.total_transactions, info_row.total_spend
        );
        info!(
            "║ Average: {:>10.2}  Median: {:>10.2}  Flagged: {:>5} ({:>5.2}%) ║",
            info_row.avg_transaction,
            info_row.median_transaction,
            info_row.flagged_count,
            info_row.fraud_rate_pct
        );
        info!("║ Period: {:<52} ║", info_row.date_range());
        info!(
            "║ Merchants: {:>5}  │  Categories: {:>3}                          ║",
            info_row.unique_merchants, info_row.unique_categories
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Top Categories:                                              ║");
        for row in self.categories.iter().take(5) {
            info!(
                "║   {:<20} {:>14.2} ({:>5} tx, {:>3} flagged)        ║",
                row.category, row.total_spend, row.transaction_count, row.flagged
            );
        }
        if let Some(busiest) = self.day_of_week.iter().max_by_key(|d| d.count) {
            info!(
                "║ Busiest Day: {:<10} ({} tx)                                ║",
                weekday_name(busiest.day_of_week),
                busiest.count
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Anomaly Risk Levels:                                         ║");
        let total = scored.len().max(1);
        for (level, count) in &levels {
            let pct = *count as f64 / total as f64 * 100.0;
            let bar: String = "█".repeat(((pct / 5.0) as usize).min(20));
            info!("║   {:10}: {:>6} ({:>5.1}%) {}", format!("{level:?}"), count, pct, bar);
        }
        info!("╚══════════════════════════════════════════════════════════════╝");

        if !self.top_risky.is_empty() {
            info!("Highest anomaly scores:");
            for s in self.top_risky.iter().take(5) {
                info!(
                    "  {} {} {:.2} -> {:.1} ({:?})",
                    s.transaction.transaction_id,
                    s.transaction.merchant,
                    s.transaction.amount,
                    s.anomaly_score,
                    s.risk_level
                );
            }
        }
    }
}

/// Count of scored transactions per risk level, Low to Critical
pub fn risk_level_counts(scored: &[ScoredTransaction]) -> Vec<(RiskLevel, usize)> {
    [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High, RiskLevel::Critical]
        .into_iter()
        .map(|level| (level, scored.iter().filter(|s| s.risk_level == level).count()))
        .collect()
}

/// Write the scored table as CSV: the input columns plus score and level.
pub fn write_scored_csv<P: AsRef<Path>>(scored: &[ScoredTransaction], path: P) -> Result<()> {
    let path = path.as_ref();
    write_scored_csv_to(scored, File::create(path)?)?;
    info!(path = %path.display(), rows = scored.len(), "Scored table written");
    Ok(())
}

pub fn write_scored_csv_to<W: Write>(scored: &[ScoredTransaction], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCORED_CSV_HEADER)?;

    for s in scored {
        let t = &s.transaction;
        wtr.write_record([
            t.transaction_id.clone(),
            t.date.to_string(),
            t.time.to_string(),
            t.datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            t.month.to_string(),
            t.month_name.to_string(),
            weekday_name(t.day_of_week).to_string(),
            t.hour.to_string(),
            t.category.clone(),
            t.merchant.clone(),
            t.amount.to_string(),
            t.payment_mode.clone(),
            t.sender_bank.clone(),
            t.receiver_bank.clone(),
            t.state.clone(),
            t.status.to_string(),
            u8::from(t.is_fraud).to_string(),
            format!("{:.1}", s.anomaly_score),
            format!("{:?}", s.risk_level).to_lowercase(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
