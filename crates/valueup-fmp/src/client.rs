//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    types::{HistoricalPrice, closes_to_series},
};
use chrono::NaiveDate;
use reqwest::Client;
use std::env;
use tracing::{debug, warn};
use valueup_eval::Benchmark;
use valueup_traits::TimeSeries;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// GET `endpoint` and decode the JSON body.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.client.get(self.url(endpoint)).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        let text = response.text().await?;
        // Errors can also arrive with a 200 status
        if !status.is_success() || is_error_payload(&text) {
            return Err(FmpError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Get historical daily prices for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Ticker or index symbol (e.g., "^KS11")
    /// * `from` - First date
    /// * `to` - Last date
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn historical_prices(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalPrice>> {
        let endpoint = format!(
            "historical-price-eod/full?symbol={}&from={}&to={}",
            encode_symbol(symbol),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        );
        // The stable API returns a flat array, not a wrapped response
        self.get(&endpoint).await
    }

    /// Closing prices for a symbol as a series.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::NoData`] if the response holds no usable close.
    pub async fn closes(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Result<TimeSeries> {
        let prices = self.historical_prices(symbol, from, to).await?;
        let series = closes_to_series(&prices);
        if series.is_empty() {
            return Err(FmpError::NoData {
                symbol: symbol.to_string(),
                from,
                to,
            });
        }
        debug!(symbol, days = series.len(), "fetched closes");
        Ok(series)
    }

    /// Closing prices for several benchmarks, keyed by benchmark name.
    ///
    /// Benchmarks that fail to load are skipped with a warning.
    ///
    /// # Arguments
    ///
    /// * `benchmarks` - Benchmarks to fetch
    /// * `from` - First date
    /// * `to` - Last date
    pub async fn benchmark_closes(
        &self,
        benchmarks: &[Benchmark],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<(String, TimeSeries)> {
        let mut results = Vec::with_capacity(benchmarks.len());

        for benchmark in benchmarks {
            match self.closes(&benchmark.symbol, from, to).await {
                Ok(series) => results.push((benchmark.name.clone(), series)),
                Err(e) => {
                    warn!(benchmark = %benchmark.name, symbol = %benchmark.symbol, error = %e, "failed to fetch benchmark");
                }
            }
        }

        results
    }
}

fn is_error_payload(text: &str) -> bool {
    text.contains("\"Error Message\"") || text.contains("\"error\"")
}

/// Percent-encode the caret used by index symbols.
fn encode_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('^', "%5E")
}
