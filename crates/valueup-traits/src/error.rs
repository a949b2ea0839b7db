//! Error types for the Value-Up pipeline.
//!
//! Every library crate in the workspace reports failures through
//! [`ValueUpError`]. Most variants are recoverable at the year level: the
//! funnel and the calculators log them and continue with the next year.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Value-Up operations.
#[derive(Debug, Error)]
pub enum ValueUpError {
    /// A year's source file does not exist.
    #[error("Missing input file for {year:?}: {}", path.display())]
    MissingInputFile {
        /// Path that was probed.
        path: PathBuf,
        /// Year the file belongs to, if the table is yearly.
        year: Option<i32>,
    },

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from a table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error when a date is out of range or invalid.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error fetching data from external sources.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error when a screening stage name is unknown.
    #[error("Stage not found: {0}")]
    StageNotFound(String),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl ValueUpError {
    /// Shorthand for a [`ValueUpError::MissingInputFile`] on a yearly table.
    pub fn missing_year_file(path: impl Into<PathBuf>, year: i32) -> Self {
        Self::MissingInputFile {
            path: path.into(),
            year: Some(year),
        }
    }

    /// Whether the error means "the input does not exist", as opposed to
    /// "the input exists but could not be used".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingInputFile { .. })
    }
}

impl From<String> for ValueUpError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ValueUpError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for Value-Up operations.
pub type Result<T> = std::result::Result<T, ValueUpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValueUpError::MissingColumn("avg_marcap".to_string());
        assert_eq!(err.to_string(), "Missing required column: avg_marcap");

        let err = ValueUpError::missing_year_file("data/cap_2021.csv", 2021);
        assert_eq!(
            err.to_string(),
            "Missing input file for Some(2021): data/cap_2021.csv"
        );
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ValueUpError::missing_year_file("x.csv", 2020).is_not_found());
        assert!(!ValueUpError::InvalidData("bad".into()).is_not_found());
    }

    #[test]
    fn test_error_from_str() {
        let err: ValueUpError = "fail".into();
        assert!(matches!(err, ValueUpError::Other(_)));
    }
}
