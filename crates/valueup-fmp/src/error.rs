//! Errors raised while fetching benchmark prices.

use chrono::NaiveDate;
use thiserror::Error;
use valueup_traits::ValueUpError;

/// Failures of the price client.
#[derive(Debug, Error)]
pub enum FmpError {
    /// `FMP_API_KEY` is unset and no `.env` file provides it.
    #[error("FMP_API_KEY is not set")]
    MissingApiKey,

    /// Transport failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was not the expected price list.
    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status or an error payload.
    #[error("price API rejected the request ({status}): {message}")]
    Api {
        /// HTTP status, or 200 when the error came in the body
        status: u16,
        /// Response text
        message: String,
    },

    /// HTTP 429.
    #[error("price API rate limit reached")]
    RateLimitExceeded,

    /// The symbol has no closes in the requested window.
    #[error("no closes for {symbol} between {from} and {to}")]
    NoData {
        /// Requested symbol
        symbol: String,
        /// First requested date
        from: NaiveDate,
        /// Last requested date
        to: NaiveDate,
    },
}

impl From<FmpError> for ValueUpError {
    fn from(e: FmpError) -> Self {
        Self::DataFetch(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_fetch_error() {
        let err = FmpError::NoData {
            symbol: "^KS11".to_string(),
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        };
        let converted: ValueUpError = err.into();
        assert!(matches!(
            converted,
            ValueUpError::DataFetch(ref msg) if msg == "no closes for ^KS11 between 2024-01-01 and 2024-12-31"
        ));
    }
}
