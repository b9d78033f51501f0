//! Advisory validation of loaded transactions.
//!
//! Nothing here rejects a row. Findings are collected into a
//! [`ValidationReport`] so the caller can decide what to do with them.

use crate::types::transaction::{Status, Transaction};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Expected categories and the merchants usually seen under each.
pub const CATEGORY_MERCHANTS: [(&str, &[&str]); 8] = [
    (
        "Food & Dining",
        &["Swiggy", "Zomato", "McDonald's", "Domino's", "Cafe Coffee Day", "Blinkit", "BigBasket"],
    ),
    (
        "Shopping",
        &["Amazon", "Flipkart", "Myntra", "Meesho", "Nykaa", "Ajio", "Snapdeal"],
    ),
    (
        "Transport",
        &["Ola", "Uber", "Rapido", "Metro Card", "IRCTC", "RedBus", "InDrive"],
    ),
    (
        "Utilities",
        &["BESCOM", "Airtel", "Jio", "BWSSB", "Gas Agency", "Vi", "BSNL"],
    ),
    (
        "Entertainment",
        &["Netflix", "Hotstar", "BookMyShow", "Spotify", "YouTube Premium", "ZEE5", "SonyLIV"],
    ),
    (
        "Healthcare",
        &["PharmEasy", "1mg", "Apollo Pharmacy", "Medlife", "Netmeds", "Practo"],
    ),
    (
        "Education",
        &["Coursera", "Udemy", "BYJU'S", "Unacademy", "WhiteHat Jr", "Vedantu"],
    ),
    (
        "Travel",
        &["MakeMyTrip", "Goibibo", "OYO", "Airbnb", "Cleartrip", "EaseMyTrip"],
    ),
];

/// Merchants expected for `category`, or `None` for an unknown category.
pub fn expected_merchants(category: &str) -> Option<&'static [&'static str]> {
    CATEGORY_MERCHANTS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, merchants)| *merchants)
}

/// Non-fatal findings from a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub rows: usize,
    /// Category -> rows, for categories outside the known set
    pub unknown_categories: BTreeMap<String, usize>,
    /// "category / merchant" -> rows, for merchants outside their category's list
    pub unexpected_merchants: BTreeMap<String, usize>,
    /// Ids whose status disagrees with the fraud flag
    pub status_mismatches: Vec<String>,
    /// Ids that occur more than once (listed once each)
    pub duplicate_ids: Vec<String>,
    pub non_positive_amounts: usize,
    /// Rows whose stored calendar columns disagreed with `datetime`
    pub derived_field_mismatches: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_categories.is_empty()
            && self.unexpected_merchants.is_empty()
            && self.status_mismatches.is_empty()
            && self.duplicate_ids.is_empty()
            && self.non_positive_amounts == 0
            && self.derived_field_mismatches == 0
    }

    /// Emit one warning per kind of finding.
    pub fn log_findings(&self) {
        if !self.unknown_categories.is_empty() {
            warn!(categories = ?self.unknown_categories, "Unrecognised categories");
        }
        if !self.unexpected_merchants.is_empty() {
            warn!(
                merchants = self.unexpected_merchants.len(),
                "Merchants outside their category's expected list"
            );
        }
        if !self.status_mismatches.is_empty() {
            warn!(
                count = self.status_mismatches.len(),
                first = %self.status_mismatches[0],
                "Status disagrees with is_fraud"
            );
        }
        if !self.duplicate_ids.is_empty() {
            warn!(count = self.duplicate_ids.len(), "Duplicate transaction ids");
        }
        if self.non_positive_amounts > 0 {
            warn!(count = self.non_positive_amounts, "Non-positive amounts");
        }
        if self.derived_field_mismatches > 0 {
            warn!(
                rows = self.derived_field_mismatches,
                "Stored calendar columns disagree with datetime; derived values used"
            );
        }
    }
}

/// Check loaded rows against the catalogue and the status invariant.
pub fn validate(rows: &[Transaction], derived_field_mismatches: usize) -> ValidationReport {
    let mut report = ValidationReport {
        rows: rows.len(),
        derived_field_mismatches,
        ..ValidationReport::default()
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicates: HashSet<&str> = HashSet::new();

    for tx in rows {
        match expected_merchants(&tx.category) {
            None => *report.unknown_categories.entry(tx.category.clone()).or_insert(0) += 1,
            Some(merchants) if !merchants.contains(&tx.merchant.as_str()) => {
                *report
                    .unexpected_merchants
                    .entry(format!("{} / {}", tx.category, tx.merchant))
                    .or_insert(0) += 1
            }
            Some(_) => {}
        }

        if tx.status != Status::from_fraud_flag(tx.is_fraud) {
            report.status_mismatches.push(tx.transaction_id.clone());
        }
        if tx.amount <= 0.0 {
            report.non_positive_amounts += 1;
        }
        if !seen.insert(tx.transaction_id.as_str()) && duplicates.insert(tx.transaction_id.as_str()) {
            report.duplicate_ids.push(tx.transaction_id.clone());
        }
    }

    report
}
