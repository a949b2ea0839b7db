//! Stage registry for discovering and building funnel stages.
//!
//! This module provides metadata about the screening stages and builds
//! stage instances by name.

use serde::{Deserialize, Serialize};
use valueup_traits::{Result, ScreeningStage, ValueUpError};

use crate::efficiency::EfficiencyStage;
use crate::funnel::ScreeningConfig;
use crate::profitability::ProfitabilityStage;
use crate::universe::UniverseStage;
use crate::valuation::ValuationStage;

/// What a stage looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageCategory {
    /// Size and liquidity
    Universe,
    /// Earnings and capital returned to shareholders
    Quality,
    /// Price relative to book value
    Value,
    /// Return on equity
    Efficiency,
}

impl StageCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Universe => "Market representativeness and liquidity",
            Self::Quality => "Profitability and shareholder return",
            Self::Value => "Market valuation against peers",
            Self::Efficiency => "Capital efficiency within the industry",
        }
    }
}

/// Metadata about a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInfo {
    /// Unique identifier for the stage
    pub name: &'static str,

    /// Position in the funnel, starting at 1
    pub position: usize,

    /// Category classification
    pub category: StageCategory,

    /// Pass criterion with default thresholds
    pub criterion: &'static str,

    /// Whether the stage honours an incumbency policy
    pub incumbency_aware: bool,
}

/// Get information about all stages, in funnel order.
#[must_use]
pub fn available_stages() -> Vec<StageInfo> {
    vec![
        StageInfo {
            name: UniverseStage::NAME,
            position: 1,
            category: StageCategory::Universe,
            criterion: "market-cap rank <= 400 and traded-value percentile >= 0.20",
            incumbency_aware: true,
        },
        StageInfo {
            name: ProfitabilityStage::NAME,
            position: 2,
            category: StageCategory::Quality,
            criterion: "positive EPS in both years and their sum; dividend or buyback in both years",
            incumbency_aware: false,
        },
        StageInfo {
            name: ValuationStage::NAME,
            position: 3,
            category: StageCategory::Value,
            criterion: "average PBR rank ratio <= 0.50 overall or within industry",
            incumbency_aware: true,
        },
        StageInfo {
            name: EfficiencyStage::NAME,
            position: 4,
            category: StageCategory::Efficiency,
            criterion: "top 100 by average ROE rank within industry",
            incumbency_aware: true,
        },
    ]
}

/// Get information about a specific stage by name.
#[must_use]
pub fn get_stage_info(name: &str) -> Option<StageInfo> {
    available_stages().into_iter().find(|info| info.name == name)
}

/// Build one stage by name.
///
/// # Errors
///
/// Returns [`ValueUpError::StageNotFound`] for an unknown name.
pub fn build_stage(name: &str, config: &ScreeningConfig) -> Result<Box<dyn ScreeningStage>> {
    let policy = config.incumbency;
    let stage: Box<dyn ScreeningStage> = match name {
        UniverseStage::NAME => {
            let stage = UniverseStage::new(config.universe.clone());
            Box::new(match policy {
                Some(p) => stage.with_incumbency(p),
                None => stage,
            })
        }
        ProfitabilityStage::NAME => Box::new(ProfitabilityStage),
        ValuationStage::NAME => {
            let stage = ValuationStage::new(config.valuation.clone());
            Box::new(match policy {
                Some(p) => stage.with_incumbency(p),
                None => stage,
            })
        }
        EfficiencyStage::NAME => {
            let stage = EfficiencyStage::new(config.efficiency.clone());
            Box::new(match policy {
                Some(p) => stage.with_incumbency(p),
                None => stage,
            })
        }
        other => return Err(ValueUpError::StageNotFound(other.to_string())),
    };
    Ok(stage)
}

/// Build the stages of the funnel up to and including `last`.
///
/// # Errors
///
/// Returns [`ValueUpError::StageNotFound`] for an unknown name.
pub fn stages_through(last: &str, config: &ScreeningConfig) -> Result<Vec<Box<dyn ScreeningStage>>> {
    let info = get_stage_info(last).ok_or_else(|| ValueUpError::StageNotFound(last.to_string()))?;
    available_stages()
        .into_iter()
        .take_while(|s| s.position <= info.position)
        .map(|s| build_stage(s.name, config))
        .collect()
}
