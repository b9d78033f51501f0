//! Payment transaction records and the in-memory table they live in

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar month with a fixed January..December ordering.
///
/// Declaration order is calendar order, so the derived `Ord` sorts
/// chronologically instead of alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MonthName {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl MonthName {
    /// All months in calendar order.
    pub const ALL: [MonthName; 12] = [
        MonthName::January,
        MonthName::February,
        MonthName::March,
        MonthName::April,
        MonthName::May,
        MonthName::June,
        MonthName::July,
        MonthName::August,
        MonthName::September,
        MonthName::October,
        MonthName::November,
        MonthName::December,
    ];

    /// Month for a 1-based calendar number.
    pub fn from_number(month: u32) -> Option<Self> {
        month
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize))
            .copied()
    }

    /// 1-based calendar number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            MonthName::January => "January",
            MonthName::February => "February",
            MonthName::March => "March",
            MonthName::April => "April",
            MonthName::May => "May",
            MonthName::June => "June",
            MonthName::July => "July",
            MonthName::August => "August",
            MonthName::September => "September",
            MonthName::October => "October",
            MonthName::November => "November",
            MonthName::December => "December",
        }
    }
}

impl fmt::Display for MonthName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MonthName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown month name {trimmed:?}"))
    }
}

/// Outcome recorded for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    Success,
    Flagged,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::Flagged => "Flagged",
        }
    }

    /// Status implied by a fraud flag.
    pub fn from_fraud_flag(is_fraud: bool) -> Self {
        if is_fraud {
            Status::Flagged
        } else {
            Status::Success
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("success") => Ok(Status::Success),
            v if v.eq_ignore_ascii_case("flagged") => Ok(Status::Flagged),
            other => Err(format!("expected Success or Flagged, got {other:?}")),
        }
    }
}

/// Full English name for a weekday ("Monday", not chrono's "Mon").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday through Sunday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub(crate) fn serialize_weekday<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(weekday_name(*day))
}

/// A single payment transaction.
///
/// `datetime` is authoritative; the calendar fields next to it are derived
/// from it when the record is built and never disagree with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub transaction_id: String,

    pub date: NaiveDate,
    pub time: NaiveTime,
    pub datetime: NaiveDateTime,

    /// Calendar month number (1-12)
    pub month: u32,
    pub month_name: MonthName,
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    /// Hour of day (0-23)
    pub hour: u32,

    pub category: String,
    pub merchant: String,

    /// Transaction amount in rupees
    pub amount: f64,

    pub payment_mode: String,
    pub sender_bank: String,
    pub receiver_bank: String,
    pub state: String,

    pub status: Status,
    #[serde(serialize_with = "serialize_flag")]
    pub is_fraud: bool,
}

fn serialize_flag<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*flag))
}

impl Transaction {
    /// Create a transaction, deriving the calendar fields and status from
    /// `datetime` and `is_fraud`. Channel, bank and state fields start with
    /// placeholder values; use the `with_*` methods to set them.
    pub fn new(
        transaction_id: impl Into<String>,
        datetime: NaiveDateTime,
        category: impl Into<String>,
        merchant: impl Into<String>,
        amount: f64,
        is_fraud: bool,
    ) -> Self {
        let date = datetime.date();
        let month = date.month();

        Self {
            transaction_id: transaction_id.into(),
            date,
            time: datetime.time(),
            datetime,
            month,
            month_name: MonthName::from_number(month).unwrap_or(MonthName::January),
            day_of_week: date.weekday(),
            hour: datetime.hour(),
            category: category.into(),
            merchant: merchant.into(),
            amount,
            payment_mode: "UPI ID".to_string(),
            sender_bank: "SBI".to_string(),
            receiver_bank: "HDFC".to_string(),
            state: "Maharashtra".to_string(),
            status: Status::from_fraud_flag(is_fraud),
            is_fraud,
        }
    }

    pub fn with_payment_mode(mut self, payment_mode: impl Into<String>) -> Self {
        self.payment_mode = payment_mode.into();
        self
    }

    pub fn with_banks(mut self, sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        self.sender_bank = sender.into();
        self.receiver_bank = receiver.into();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Override the recorded status without touching `is_fraud`.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// An immutable, fully loaded set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    /// Amount column, in row order.
    pub fn amounts(&self) -> Vec<f64> {
        self.rows.iter().map(|t| t.amount).collect()
    }

    /// A new table holding only the rows matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Transaction) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|t| predicate(t)).cloned().collect(),
        }
    }
}

impl From<Vec<Transaction>> for TransactionTable {
    fn from(rows: Vec<Transaction>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a TransactionTable {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_month_order_is_calendar_order() {
        let mut months = vec![MonthName::December, MonthName::April, MonthName::August];
        months.sort();
        assert_eq!(
            months,
            vec![MonthName::April, MonthName::August, MonthName::December]
        );
        assert_eq!(MonthName::from_number(2), Some(MonthName::February));
        assert_eq!(MonthName::from_number(0), None);
        assert_eq!(MonthName::from_number(13), None);
        assert_eq!(MonthName::September.number(), 9);
    }

    #[test]
    fn test_month_parse() {
        assert_eq!("march".parse::<MonthName>(), Ok(MonthName::March));
        assert_eq!(" October ".parse::<MonthName>(), Ok(MonthName::October));
        assert!("Smarch".parse::<MonthName>().is_err());
    }

    #[test]
    fn test_new_derives_calendar_fields() {
        let tx = Transaction::new("TXN00001", at("2024-03-17 02:45:10"), "Travel", "OYO", 4200.0, true);

        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
        assert_eq!(tx.month, 3);
        assert_eq!(tx.month_name, MonthName::March);
        assert_eq!(tx.day_of_week, Weekday::Sun);
        assert_eq!(tx.hour, 2);
        assert_eq!(tx.status, Status::Flagged);
    }

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction::new("TXN00002", at("2024-01-01 10:00:00"), "Shopping", "Amazon", 1200.0, false);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["month_name"], "January");
        assert_eq!(json["day_of_week"], "Monday");
        assert_eq!(json["status"], "Success");
        assert_eq!(json["is_fraud"], 0);
    }

    #[test]
    fn test_filter_leaves_source_intact() {
        let table = TransactionTable::from(vec![
            Transaction::new("a", at("2024-01-01 10:00:00"), "Shopping", "Amazon", 10.0, false),
            Transaction::new("b", at("2024-01-02 10:00:00"), "Shopping", "Amazon", 20.0, true),
        ]);
        let flagged = table.filter(|t| t.is_fraud);

        assert_eq!(flagged.len(), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.amounts(), vec![10.0, 20.0]);
    }
}
