//! Stage 4: capital efficiency.

use serde::{Deserialize, Serialize};
use tracing::debug;
use valueup_traits::stats::group_average_ranks;
use valueup_traits::{Candidate, RankOrder, Result, ScreeningStage, YearInputs};

use crate::incumbency::IncumbencyPolicy;

/// Configuration for the efficiency stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    /// Number of constituents to select.
    pub target_size: usize,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self { target_size: 100 }
    }
}

/// Selects the companies with the best ROE relative to their industry.
///
/// The two-year average ROE is ranked within each industry, highest first,
/// and the companies with the smallest rank numbers are kept. Ties are
/// broken by stock code so the selection is deterministic. Companies
/// without an average ROE are not ranked and are never selected.
#[derive(Debug, Clone, Default)]
pub struct EfficiencyStage {
    config: EfficiencyConfig,
    incumbency: Option<IncumbencyPolicy>,
}

impl EfficiencyStage {
    /// Stage name used in reports and the registry.
    pub const NAME: &'static str = "efficiency";

    /// Create a new efficiency stage with the given configuration.
    #[must_use]
    pub const fn new(config: EfficiencyConfig) -> Self {
        Self {
            config,
            incumbency: None,
        }
    }

    /// Retain and admit by the policy's ROE position buffers.
    #[must_use]
    pub fn with_incumbency(mut self, policy: IncumbencyPolicy) -> Self {
        self.incumbency = Some(policy);
        self
    }

    /// Target number of constituents.
    #[must_use]
    pub const fn target_size(&self) -> usize {
        self.config.target_size
    }
}

impl ScreeningStage for EfficiencyStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn screen(&self, input: Vec<Candidate>, tables: &YearInputs) -> Result<Vec<Candidate>> {
        let input_len = input.len();
        let mut candidates = input;

        let roe: Vec<Option<f64>> = candidates.iter().map(|c| c.avg_roe).collect();
        let industries: Vec<Option<&str>> = candidates.iter().map(|c| c.industry.as_deref()).collect();
        let ranks = group_average_ranks(&roe, &industries, RankOrder::Descending);

        for (candidate, rank) in candidates.iter_mut().zip(ranks) {
            candidate.industry_roe_rank = rank;
        }

        candidates.retain(|c| c.industry_roe_rank.is_some());
        candidates.sort_by(|a, b| {
            let ra = a.industry_roe_rank.unwrap_or(f64::INFINITY);
            let rb = b.industry_roe_rank.unwrap_or(f64::INFINITY);
            ra.total_cmp(&rb).then_with(|| a.code.cmp(&b.code))
        });

        let selected = match &self.incumbency {
            Some(policy) => policy.select(candidates, self.config.target_size, tables),
            None => {
                candidates.truncate(self.config.target_size);
                candidates
            }
        };

        debug!(
            year = tables.year,
            stage = Self::NAME,
            input = input_len,
            output = selected.len(),
            "screened"
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use valueup_traits::Market;

    fn company(code: &str, industry: &str, roe: Option<f64>) -> Candidate {
        Candidate {
            industry: Some(industry.to_string()),
            avg_roe: roe,
            ..Candidate::new(code, code, Market::Kospi)
        }
    }

    fn input() -> Vec<Candidate> {
        vec![
            company("000001", "Banks", Some(0.08)),
            company("000002", "Banks", Some(0.12)),
            company("000003", "Banks", Some(0.10)),
            company("000004", "Tech", Some(0.30)),
            company("000005", "Tech", Some(0.05)),
            company("000006", "Tech", None),
        ]
    }

    #[test]
    fn test_ranks_within_industry() {
        let out = EfficiencyStage::default()
            .screen(input(), &YearInputs::empty(2022))
            .unwrap();
        assert_eq!(out.len(), 5);

        let codes: Vec<_> = out.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["000002", "000004", "000003", "000005", "000001"]);
        assert_relative_eq!(out[0].industry_roe_rank.unwrap(), 1.0);
        assert_relative_eq!(out[4].industry_roe_rank.unwrap(), 3.0);
    }

    #[test]
    fn test_boundary_ties_keep_lower_code() {
        let stage = EfficiencyStage::new(EfficiencyConfig { target_size: 1 });
        let out = stage.screen(input(), &YearInputs::empty(2022)).unwrap();
        // 000002 and 000004 both rank first in their industry
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "000002");
    }

    #[test]
    fn test_fewer_than_target_selects_all() {
        let out = EfficiencyStage::default()
            .screen(input()[..2].to_vec(), &YearInputs::empty(2022))
            .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_incumbent_retained() {
        let stage = EfficiencyStage::new(EfficiencyConfig { target_size: 2 }).with_incumbency(
            IncumbencyPolicy {
                retain_within: 5,
                admit_within: 1,
                ..Default::default()
            },
        );
        let tables = YearInputs::empty(2022).with_incumbents(["000001".to_string()].into_iter().collect());
        let out = stage.screen(input(), &tables).unwrap();
        let codes: Vec<_> = out.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["000002", "000001"]);
    }
}
