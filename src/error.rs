//! Error types for loading and analysing transaction tables

use thiserror::Error;

/// Errors surfaced by the analysis library.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required column is missing or a field could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A whole-table statistic was requested on a table with no rows.
    #[error("dataset is empty: {0} is undefined without transactions")]
    EmptyDataset(&'static str),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Build a `MalformedInput` for a single unparseable cell.
    pub fn bad_field(row: usize, column: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        AnalysisError::MalformedInput(format!(
            "row {row}: column `{column}` has invalid value {value:?} ({reason})"
        ))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_field_message() {
        let err = AnalysisError::bad_field(3, "datetime", "yesterday", "not a timestamp");
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("`datetime`"));
        assert!(msg.contains("\"yesterday\""));
    }

    #[test]
    fn test_empty_dataset_message() {
        let err = AnalysisError::EmptyDataset("median");
        assert_eq!(
            err.to_string(),
            "dataset is empty: median is undefined without transactions"
        );
    }
}
