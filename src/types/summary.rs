//! Row types of the summary tables handed to the rendering layer.
//!
//! Field names are the column names consumers rely on.

use crate::types::transaction::{serialize_weekday, MonthName, Status};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;

/// Whole-table headline statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub total_transactions: usize,
    pub total_spend: f64,
    /// Mean amount, rounded to 2 decimals
    pub avg_transaction: f64,
    pub median_transaction: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub unique_merchants: usize,
    pub unique_categories: usize,
    pub flagged_count: usize,
    /// Percentage of flagged rows, rounded to 2 decimals
    pub fraud_rate_pct: f64,
}

impl BasicInfo {
    /// "first → last" label for the covered period
    pub fn date_range(&self) -> String {
        format!("{} → {}", self.first_date, self.last_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month_name: MonthName,
    pub total_spend: f64,
    pub transaction_count: usize,
    pub avg_spend: f64,
    pub flagged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total_spend: f64,
    pub transaction_count: usize,
    pub avg_spend: f64,
    pub flagged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantSummary {
    pub merchant: String,
    pub total_spend: f64,
    pub count: usize,
}

/// One weekday. Days without transactions keep `count == 0` and no mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOfWeekSummary {
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub total_spend: f64,
    pub count: usize,
    pub avg_spend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySummary {
    pub hour: u32,
    pub count: usize,
    pub flagged: usize,
    pub total_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentModeSummary {
    pub payment_mode: String,
    pub count: usize,
    pub total_spend: f64,
    pub avg_spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub state: String,
    pub total_spend: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankSummary {
    pub sender_bank: String,
    pub total_spend: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Transaction counts for one weekday, indexed by hour (0-23)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub hours: [usize; 24],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudByHour {
    pub hour: u32,
    pub fraud: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudByCategory {
    pub category: String,
    pub fraud_count: usize,
    pub total: usize,
    /// Sum of amounts over flagged rows only
    pub fraud_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudByMonth {
    pub month_name: MonthName,
    pub fraud: usize,
    pub total: usize,
}
