//! Data types for FMP API responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use valueup_traits::TimeSeries;

/// End-of-day price from the `historical-price-eod/full` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPrice {
    /// Symbol.
    #[serde(default)]
    pub symbol: String,
    /// Date.
    pub date: String,
    /// Open price.
    #[serde(default)]
    pub open: f64,
    /// High price.
    #[serde(default)]
    pub high: f64,
    /// Low price.
    #[serde(default)]
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Volume.
    #[serde(default)]
    pub volume: f64,
}

impl HistoricalPrice {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Closing prices as a date-ordered series.
///
/// Rows with an unparsable date or a non-positive close are skipped.
pub fn closes_to_series(prices: &[HistoricalPrice]) -> TimeSeries {
    prices
        .iter()
        .filter(|p| p.close > 0.0 && p.close.is_finite())
        .filter_map(|p| p.parsed_date().map(|d| (d, p.close)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_historical_prices() {
        let json = r#"[
            {"symbol": "^KS11", "date": "2024-01-03", "open": 2650.0, "high": 2660.0,
             "low": 2600.0, "close": 2607.31, "volume": 512000000, "change": -62.5},
            {"symbol": "^KS11", "date": "2024-01-02", "close": 2669.81}
        ]"#;

        let prices: Vec<HistoricalPrice> = serde_json::from_str(json).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[1].volume, 0.0);

        // The API returns newest first
        let series = closes_to_series(&prices);
        assert_eq!(series.first().unwrap().1, 2669.81);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_closes_skip_bad_rows() {
        let prices = vec![
            HistoricalPrice {
                symbol: String::new(),
                date: "not a date".to_string(),
                open: 0.0,
                high: 0.0,
                low: 0.0,
                close: 1.0,
                volume: 0.0,
            },
            HistoricalPrice {
                symbol: String::new(),
                date: "2024-01-02".to_string(),
                open: 0.0,
                high: 0.0,
                low: 0.0,
                close: 0.0,
                volume: 0.0,
            },
        ];
        assert!(closes_to_series(&prices).is_empty());
    }
}
