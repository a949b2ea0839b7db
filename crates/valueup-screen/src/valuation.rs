//! Stage 3: valuation.

use serde::{Deserialize, Serialize};
use tracing::debug;
use valueup_traits::stats::{group_percentile_ranks, percentile_ranks};
use valueup_traits::{Candidate, RankOrder, Result, ScreeningStage, YearInputs};

use crate::incumbency::IncumbencyPolicy;

/// Configuration for the valuation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Largest market-wide PBR rank ratio that passes.
    pub max_pbr_rank_ratio: f64,

    /// Largest within-industry PBR rank ratio that passes.
    pub max_industry_pbr_rank_ratio: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            max_pbr_rank_ratio: 0.5,
            max_industry_pbr_rank_ratio: 0.5,
        }
    }
}

/// Keeps companies that are cheap on price-to-book, either against the
/// whole candidate set or against their own industry.
///
/// Rank ratios are ascending percentiles of the two-year average PBR, so
/// the cheapest company has the smallest ratio. Companies without an
/// average PBR are not ranked and do not pass. Input order is preserved.
#[derive(Debug, Clone, Default)]
pub struct ValuationStage {
    config: ValuationConfig,
    incumbency: Option<IncumbencyPolicy>,
}

impl ValuationStage {
    /// Stage name used in reports and the registry.
    pub const NAME: &'static str = "valuation";

    /// Create a new valuation stage with the given configuration.
    #[must_use]
    pub const fn new(config: ValuationConfig) -> Self {
        Self {
            config,
            incumbency: None,
        }
    }

    /// Let incumbents pass at the policy's looser rank ratio.
    #[must_use]
    pub fn with_incumbency(mut self, policy: IncumbencyPolicy) -> Self {
        self.incumbency = Some(policy);
        self
    }

    fn thresholds(&self, code: &str, tables: &YearInputs) -> (f64, f64) {
        let base = (
            self.config.max_pbr_rank_ratio,
            self.config.max_industry_pbr_rank_ratio,
        );
        match &self.incumbency {
            Some(policy) if tables.is_incumbent(code) => (
                base.0.max(policy.max_pbr_rank_ratio),
                base.1.max(policy.max_pbr_rank_ratio),
            ),
            _ => base,
        }
    }
}

impl ScreeningStage for ValuationStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn screen(&self, input: Vec<Candidate>, tables: &YearInputs) -> Result<Vec<Candidate>> {
        let input_len = input.len();
        let mut candidates = input;

        let pbr: Vec<Option<f64>> = candidates.iter().map(|c| c.avg_pbr).collect();
        let industries: Vec<Option<&str>> = candidates.iter().map(|c| c.industry.as_deref()).collect();
        let overall = percentile_ranks(&pbr, RankOrder::Ascending);
        let within = group_percentile_ranks(&pbr, &industries, RankOrder::Ascending);

        for ((candidate, overall), within) in candidates.iter_mut().zip(overall).zip(within) {
            candidate.pbr_rank_ratio = overall;
            candidate.industry_pbr_rank_ratio = within;
        }

        candidates.retain(|c| {
            let (max_overall, max_within) = self.thresholds(&c.code, tables);
            c.pbr_rank_ratio.is_some_and(|r| r <= max_overall)
                || c.industry_pbr_rank_ratio.is_some_and(|r| r <= max_within)
        });

        debug!(
            year = tables.year,
            stage = Self::NAME,
            input = input_len,
            output = candidates.len(),
            "screened"
        );
        Ok(candidates)
    }
}
