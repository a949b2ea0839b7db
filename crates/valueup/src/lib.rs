#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Crate Organization
//!
//! - [`traits`] - Shared types and trait seams ([`ScreeningStage`], [`YearTableSource`])
//! - [`screen`] - The screening funnel
//! - [`weight`] - Capped market-cap weighting
//! - [`eval`] - Index levels, portfolio returns and benchmark comparison
//! - [`data`] - CSV input and output
//! - [`fmp`] - Benchmark closes over HTTP

/// Version information for the valueup crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Traits
// ============================================================================

/// Shared types and trait seams.
///
/// - [`ScreeningStage`] - One funnel stage
/// - [`YearTableSource`] - Supplies one year's screening tables
pub mod traits {
    pub use valueup_traits::*;
}

pub use valueup_traits::{ScreeningStage, YearTableSource};
pub use valueup_weight::Weighter;

// Re-export error types
pub use valueup_traits::{Result, ValueUpError};

// Re-export common types
pub use valueup_traits::{Candidate, ConstituentSet, Date, MarketPanel, StockCode, TimeSeries};

// ============================================================================
// Screening
// ============================================================================

/// The four screening stages and the funnel that runs them.
///
/// # Example
///
/// ```ignore
/// use valueup::screen::{Funnel, ScreeningConfig};
///
/// let funnel = Funnel::new(&ScreeningConfig::default());
/// let (set, report) = funnel.screen(&inputs)?;
/// println!("{} constituents", set.len());
/// ```
pub mod screen {
    pub use valueup_screen::*;
}

// ============================================================================
// Weighting
// ============================================================================

/// Capped market-cap weighting.
///
/// ```text
/// w_i = min(cap, basis_i / sum(basis))   with the excess redistributed
/// ```
pub mod weight {
    pub use valueup_weight::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Index levels, portfolio returns, metrics and benchmark comparison.
///
/// ## Index level
///
/// ```text
/// I_t = capped_total_t / capped_total_base * base_value
/// ```
///
/// ## Portfolio return
///
/// ```text
/// r_t = sum(w_i * (p_i,t / p_i,t-1 - 1)) / sum(w_i)   over names priced on both days
/// ```
pub mod eval {
    pub use valueup_eval::*;
}

// ============================================================================
// Data
// ============================================================================

/// CSV loaders and writers.
pub mod data {
    pub use valueup_data::*;
}

/// Financial Modeling Prep client for benchmark closes.
///
/// Set `FMP_API_KEY` in the environment or a `.env` file.
pub mod fmp {
    pub use valueup_fmp::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use valueup::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::*;
    pub use crate::{ScreeningStage, Weighter, YearTableSource};
    pub use valueup_data::{CsvTableSource, DataLayout, load_panel};
    pub use valueup_eval::{
        Annualization, BenchmarkComparator, ComparisonConfig, IndexCalculator, IndexConfig,
        PerformanceSummary, PortfolioConfig, PortfolioSimulator, ScheduleConfig,
        UniverseSchedule,
    };
    pub use valueup_screen::{Funnel, ScreeningConfig};
    pub use valueup_weight::{CapConfig, CapWeighter};
}

// ============================================================================
// Tests
// ============================================================================
