//! Stage 1: market representativeness and liquidity.

use serde::{Deserialize, Serialize};
use tracing::debug;
use valueup_traits::stats::{average_ranks, percentile_ranks};
use valueup_traits::{Candidate, Market, RankOrder, Result, ScreeningStage, YearInputs};

use crate::incumbency::IncumbencyPolicy;

/// Configuration for the universe stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Largest market-cap rank that passes (rank 1 = largest company).
    pub max_cap_rank: f64,

    /// Smallest traded-value percentile that passes. 0.2 keeps the most
    /// liquid 80%.
    pub min_traded_value_percentile: f64,

    /// Remove KONEX listings before ranking.
    pub exclude_konex: bool,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            max_cap_rank: 400.0,
            min_traded_value_percentile: 0.2,
            exclude_konex: true,
        }
    }
}

/// Keeps large, liquid companies.
///
/// Companies are ranked by average market cap (descending) and by the
/// percentile of average traded value (ascending). A company passes when
/// both its cap rank and its liquidity percentile clear the thresholds.
/// Rows missing either value are not ranked and do not pass.
///
/// Output is sorted by market cap, largest first.
///
/// # Example
///
/// ```ignore
/// use valueup_screen::UniverseStage;
///
/// let stage = UniverseStage::default();
/// let survivors = stage.screen(candidates, &tables)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct UniverseStage {
    config: UniverseConfig,
    incumbency: Option<IncumbencyPolicy>,
}

impl UniverseStage {
    /// Stage name used in reports and the registry.
    pub const NAME: &'static str = "universe";

    /// Create a new universe stage with the given configuration.
    #[must_use]
    pub const fn new(config: UniverseConfig) -> Self {
        Self {
            config,
            incumbency: None,
        }
    }

    /// Let incumbents pass at the policy's looser cap rank.
    #[must_use]
    pub fn with_incumbency(mut self, policy: IncumbencyPolicy) -> Self {
        self.incumbency = Some(policy);
        self
    }

    fn cap_rank_limit(&self, code: &str, tables: &YearInputs) -> f64 {
        match &self.incumbency {
            Some(policy) if tables.is_incumbent(code) => {
                policy.max_cap_rank.max(self.config.max_cap_rank)
            }
            _ => self.config.max_cap_rank,
        }
    }
}

impl ScreeningStage for UniverseStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn screen(&self, input: Vec<Candidate>, tables: &YearInputs) -> Result<Vec<Candidate>> {
        let input_len = input.len();
        let mut universe: Vec<Candidate> = if self.config.exclude_konex {
            input.into_iter().filter(|c| c.market != Market::Konex).collect()
        } else {
            input
        };

        let caps: Vec<Option<f64>> = universe.iter().map(|c| c.avg_market_cap).collect();
        let traded: Vec<Option<f64>> = universe.iter().map(|c| c.avg_traded_value).collect();
        let cap_ranks = average_ranks(&caps, RankOrder::Descending);
        let traded_pct = percentile_ranks(&traded, RankOrder::Ascending);

        for ((candidate, rank), pct) in universe.iter_mut().zip(cap_ranks).zip(traded_pct) {
            candidate.cap_rank = rank;
            candidate.traded_value_percentile = pct;
        }

        universe.retain(|c| match (c.cap_rank, c.traded_value_percentile) {
            (Some(rank), Some(pct)) => {
                rank <= self.cap_rank_limit(&c.code, tables)
                    && pct >= self.config.min_traded_value_percentile
            }
            _ => false,
        });

        universe.sort_by(|a, b| {
            let a = a.avg_market_cap.unwrap_or(f64::NEG_INFINITY);
            let b = b.avg_market_cap.unwrap_or(f64::NEG_INFINITY);
            b.total_cmp(&a)
        });

        debug!(
            year = tables.year,
            stage = Self::NAME,
            input = input_len,
            output = universe.len(),
            "screened"
        );
        Ok(universe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn company(code: &str, market: Market, cap: Option<f64>, traded: Option<f64>) -> Candidate {
        Candidate {
            avg_market_cap: cap,
            avg_traded_value: traded,
            ..Candidate::new(code, code, market)
        }
    }

    fn universe(n: usize) -> Vec<Candidate> {
        (1..=n)
            .map(|i| {
                company(
                    &format!("{i:06}"),
                    Market::Kospi,
                    Some(1000.0 * i as f64),
                    Some(10.0 * i as f64),
                )
            })
            .collect()
    }

    #[test]
    fn test_liquidity_cutoff() {
        let stage = UniverseStage::default();
        let out = stage.screen(universe(10), &YearInputs::empty(2022)).unwrap();

        // Percentiles are 0.1..=1.0; only the least-traded company falls below 0.2
        assert_eq!(out.len(), 9);
        assert!(out.iter().all(|c| c.code != "000001"));
        assert_eq!(out[0].code, "000010");
        assert_relative_eq!(out[0].cap_rank.unwrap(), 1.0);
    }

    #[test]
    fn test_cap_rank_cutoff() {
        let config = UniverseConfig {
            max_cap_rank: 3.0,
            ..Default::default()
        };
        let stage = UniverseStage::new(config);
        let out = stage.screen(universe(10), &YearInputs::empty(2022)).unwrap();
        let codes: Vec<_> = out.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["000010", "000009", "000008"]);
    }

    #[test]
    fn test_konex_and_missing_values_excluded() {
        let mut input = universe(5);
        input.push(company("900001", Market::Konex, Some(1.0e9), Some(1.0e9)));
        input.push(company("900002", Market::Kosdaq, None, Some(1.0e9)));

        let out = UniverseStage::default()
            .screen(input, &YearInputs::empty(2022))
            .unwrap();
        assert!(out.iter().all(|c| c.code != "900001" && c.code != "900002"));
        // KONEX is removed before ranking, so six rows share the percentile denominator
        assert_relative_eq!(
            out.last().unwrap().traded_value_percentile.unwrap(),
            2.0 / 6.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_incumbent_cap_buffer() {
        let config = UniverseConfig {
            max_cap_rank: 3.0,
            ..Default::default()
        };
        let policy = IncumbencyPolicy {
            max_cap_rank: 5.0,
            ..Default::default()
        };
        let tables = YearInputs::empty(2022).with_incumbents(["000006".to_string()].into_iter().collect());
        let out = UniverseStage::new(config)
            .with_incumbency(policy)
            .screen(universe(10), &tables)
            .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out[3].code, "000006");
    }

    #[test]
    fn test_empty_input() {
        let out = UniverseStage::default()
            .screen(Vec::new(), &YearInputs::empty(2022))
            .unwrap();
        assert!(out.is_empty());
    }
}
