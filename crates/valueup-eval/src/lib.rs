//! Index calculation and evaluation for the Value-Up index.
//!
//! This crate turns yearly constituent sets into daily series and reports on
//! them:
//! - Business-day calendar and the selection-lag schedule
//! - Index levels from capped market value against a base date
//! - Cumulative portfolio returns with yearly rebalancing
//! - Performance metrics and benchmark comparison
//!
//! # Example
//!
//! ```rust,ignore
//! use valueup_eval::{IndexCalculator, IndexConfig, ScheduleConfig, UniverseSchedule};
//!
//! let schedule = UniverseSchedule::new(run.sets, ScheduleConfig::default());
//! let levels = IndexCalculator::new(IndexConfig::default()).compute(&panel, &schedule)?;
//! let summary = PerformanceSummary::calculate(&levels, &Annualization::default())?;
//! ```

pub mod benchmark;
pub mod calendar;
pub mod index;
pub mod metrics;
pub mod portfolio;
pub mod schedule;

// Re-export main types
pub use benchmark::{
    Benchmark, BenchmarkComparator, Comparison, ComparisonConfig, ComparisonRow,
    default_benchmarks,
};
pub use calendar::{business_days, is_business_day};
pub use index::{IndexCalculator, IndexConfig};
pub use metrics::{
    Annualization, PerformanceSummary, TRADING_DAYS_PER_YEAR, annualized_volatility,
    max_drawdown, yearly_returns,
};
pub use portfolio::{PortfolioConfig, PortfolioResult, PortfolioSimulator, daily_return};
pub use schedule::{ScheduleConfig, UniverseSchedule};
