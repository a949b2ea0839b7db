#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait seams for the Value-Up index pipeline.
//!
//! This crate provides the shared error type, the company and constituent
//! types, the rank statistics used by every screening stage, and the two
//! seams the rest of the workspace is built around: [`ScreeningStage`] and
//! [`YearTableSource`].

/// The version of the valueup-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod series;
pub mod source;
pub mod stage;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, ValueUpError};
pub use series::TimeSeries;
pub use source::{InMemorySource, YearInputs, YearTableSource};
pub use stage::ScreeningStage;
pub use stats::RankOrder;
pub use types::{
    Candidate, ConstituentSet, DailyQuote, Date, FundamentalRow, IndustryMap, Market,
    MarketCapRow, MarketPanel, ShareholderReturnFlags, ShareholderReturnRow, StockCode,
    normalize_stock_code,
};
