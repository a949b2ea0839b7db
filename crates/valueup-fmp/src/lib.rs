//! Financial Modeling Prep (FMP) API client for Value-Up.
//!
//! This crate fetches benchmark index closes from the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) API for
//! comparison against the computed index.
//!
//! # Usage
//!
//! ```rust,ignore
//! use valueup_eval::default_benchmarks;
//! use valueup_fmp::FmpClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FmpClient::from_env()?;
//!
//!     // One symbol
//!     let kospi = client.closes("^KS11", start, end).await?;
//!
//!     // KOSPI, KOSDAQ and KOSPI 200, skipping any that fail
//!     let closes = client.benchmark_closes(&default_benchmarks(), start, end).await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
