//! Constituent screening for the Value-Up index.
//!
//! This crate implements the four screening stages and the funnel that runs
//! them for each selection year:
//! - Universe: market-cap rank and traded-value liquidity
//! - Profitability: two profitable years and shareholder return in both
//! - Valuation: PBR rank ratio, market-wide or within the industry
//! - Efficiency: top companies by ROE rank within the industry
//!
//! Incumbency buffers are available as an explicit opt-in.
//!
//! # Example
//!
//! ```ignore
//! use valueup_screen::{Funnel, ScreeningConfig};
//! use valueup_screen::registry::available_stages;
//!
//! let funnel = Funnel::new(&ScreeningConfig::default());
//! let run = funnel.screen_years(&source, 2020..=2024);
//!
//! // Discover the stages
//! let stages = available_stages();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod efficiency;
pub mod funnel;
pub mod incumbency;
pub mod profitability;
pub mod registry;
pub mod universe;
pub mod valuation;

// Re-export key types
pub use efficiency::{EfficiencyConfig, EfficiencyStage};
pub use funnel::{Funnel, FunnelReport, FunnelRun, ScreeningConfig, StageCount};
pub use incumbency::IncumbencyPolicy;
pub use profitability::{JoinDrops, ProfitabilityStage};
pub use registry::{StageCategory, StageInfo};
pub use universe::{UniverseConfig, UniverseStage};
pub use valuation::{ValuationConfig, ValuationStage};
