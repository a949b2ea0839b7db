//! Constituent weighting for the Value-Up index.
//!
//! This crate turns the raw market values of a day's constituents into
//! portfolio weights. The index uses [`CapWeighter`], which limits every
//! constituent to 15% of the portfolio; [`MarketCapWeighter`] gives the
//! uncapped weights for comparison.
//!
//! # Examples
//!
//! ```rust,no_run
//! use valueup_weight::{CapWeighter, MarketValues, Weighter};
//!
//! let weighter = CapWeighter::default();
//! let values: MarketValues = vec![
//!     ("005930".to_string(), 4.7e14),
//!     ("000660".to_string(), 1.0e14),
//!     ("035420".to_string(), 3.2e13),
//! ]
//! .into_iter()
//! .collect();
//!
//! let weights = weighter.weigh(&values).unwrap();
//! ```

mod cap;
mod market_cap;
mod weighter;

// Re-export main types
pub use cap::{CapConfig, CapWeighter};
pub use market_cap::MarketCapWeighter;
pub use weighter::{MarketValues, WeightVector, Weighter};
