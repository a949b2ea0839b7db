//! Stage 2: profitability and shareholder return.
//!
//! Joins the survivors of stage 1 with two years of fundamentals, the
//! dividend/buyback table and the industry map. A company needs a row in
//! every table; missing rows drop it and are counted in [`JoinDrops`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use valueup_traits::stats::finite;
use valueup_traits::{
    Candidate, FundamentalRow, Result, ScreeningStage, ShareholderReturnFlags, YearInputs,
};

/// Companies removed by the stage-2 joins, by reason.
///
/// A company is counted under the first table it is missing from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDrops {
    /// No fundamentals row for the screening year.
    pub missing_current_fundamentals: usize,
    /// No fundamentals row for the year before.
    pub missing_prior_fundamentals: usize,
    /// No dividend/buyback row.
    pub missing_shareholder_return: usize,
    /// No industry classification.
    pub missing_industry: usize,
    /// Repeated stock codes in the input; the first occurrence is kept.
    pub duplicates: usize,
}

impl JoinDrops {
    /// Total number of dropped rows.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.missing_current_fundamentals
            + self.missing_prior_fundamentals
            + self.missing_shareholder_return
            + self.missing_industry
            + self.duplicates
    }
}

/// Whether both years were profitable.
///
/// Both EPS values must be positive and so must their sum. Missing values
/// fail.
#[must_use]
pub fn is_profitable(eps_current: Option<f64>, eps_prior: Option<f64>) -> bool {
    match (eps_current, eps_prior) {
        (Some(cur), Some(prev)) => cur > 0.0 && prev > 0.0 && (cur + prev) > 0.0,
        _ => false,
    }
}

/// Two-year average PBR.
#[must_use]
pub fn average_pbr(current: &FundamentalRow, prior: &FundamentalRow) -> Option<f64> {
    match (current.pbr, prior.pbr) {
        (Some(cur), Some(prev)) => finite((cur + prev) / 2.0),
        _ => None,
    }
}

/// Two-year average ROE, computed as EPS / BPS for each year.
///
/// A zero BPS makes the ratio non-finite and the average missing.
#[must_use]
pub fn average_roe(current: &FundamentalRow, prior: &FundamentalRow) -> Option<f64> {
    match (current.eps, current.bps, prior.eps, prior.bps) {
        (Some(eps), Some(bps), Some(eps_prev), Some(bps_prev)) => {
            finite((eps / bps + eps_prev / bps_prev) / 2.0)
        }
        _ => None,
    }
}

/// Keeps profitable companies that returned capital in both years.
///
/// # Example
///
/// ```ignore
/// use valueup_screen::ProfitabilityStage;
///
/// let stage = ProfitabilityStage;
/// let (joined, drops) = stage.join(stage1_survivors, &tables);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitabilityStage;

impl ProfitabilityStage {
    /// Stage name used in reports and the registry.
    pub const NAME: &'static str = "profitability";

    /// Join `input` with the year's tables and fill the stage-2 fields.
    ///
    /// Returns every joined company, passing or not, in input order.
    pub fn join(&self, input: Vec<Candidate>, tables: &YearInputs) -> (Vec<Candidate>, JoinDrops) {
        let current = first_by_code(&tables.fundamentals_current);
        let prior = first_by_code(&tables.fundamentals_prior);
        let returns: HashMap<&str, ShareholderReturnFlags> = tables
            .shareholder_returns
            .iter()
            .rev()
            .map(|r| (r.code.as_str(), r.flags))
            .collect();

        let mut drops = JoinDrops::default();
        let mut seen = HashSet::new();
        let mut joined = Vec::with_capacity(input.len());

        for mut candidate in input {
            if !seen.insert(candidate.code.clone()) {
                drops.duplicates += 1;
                continue;
            }
            let Some(cur) = current.get(candidate.code.as_str()) else {
                drops.missing_current_fundamentals += 1;
                continue;
            };
            let Some(prev) = prior.get(candidate.code.as_str()) else {
                drops.missing_prior_fundamentals += 1;
                continue;
            };
            let Some(flags) = returns.get(candidate.code.as_str()) else {
                drops.missing_shareholder_return += 1;
                continue;
            };
            let Some(industry) = tables
                .industries
                .get(&candidate.code)
                .filter(|g| !g.trim().is_empty())
            else {
                drops.missing_industry += 1;
                continue;
            };

            candidate.industry = Some(industry.clone());
            candidate.eps_current = cur.eps;
            candidate.eps_prior = prev.eps;
            candidate.bps_current = cur.bps;
            candidate.bps_prior = prev.bps;
            candidate.pbr_current = cur.pbr;
            candidate.pbr_prior = prev.pbr;
            candidate.profit_positive = is_profitable(cur.eps, prev.eps);
            candidate.shareholder_return = flags.returned_both_years();
            candidate.avg_pbr = average_pbr(cur, prev);
            candidate.avg_roe = average_roe(cur, prev);
            joined.push(candidate);
        }

        (joined, drops)
    }
}

fn first_by_code(rows: &[FundamentalRow]) -> HashMap<&str, &FundamentalRow> {
    // Reverse so that the first occurrence wins on insert
    rows.iter().rev().map(|r| (r.code.as_str(), r)).collect()
}

impl ScreeningStage for ProfitabilityStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn screen(&self, input: Vec<Candidate>, tables: &YearInputs) -> Result<Vec<Candidate>> {
        let input_len = input.len();
        let (joined, drops) = self.join(input, tables);

        let mut passed: Vec<Candidate> = joined
            .into_iter()
            .filter(|c| c.profit_positive && c.shareholder_return)
            .collect();
        passed.sort_by(|a, b| a.code.cmp(&b.code));

        debug!(
            year = tables.year,
            stage = Self::NAME,
            input = input_len,
            output = passed.len(),
            dropped = drops.total(),
            "screened"
        );
        Ok(passed)
    }

    fn unmatched(&self, input: &[Candidate], tables: &YearInputs) -> usize {
        self.join(input.to_vec(), tables).1.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valueup_traits::{Market, ShareholderReturnRow};

    fn fundamentals(code: &str, eps: f64, bps: f64, pbr: f64) -> FundamentalRow {
        FundamentalRow {
            code: code.into(),
            eps: Some(eps),
            bps: Some(bps),
            pbr: Some(pbr),
        }
    }

    fn returned(code: &str, prior: bool, current: bool) -> ShareholderReturnRow {
        ShareholderReturnRow {
            code: code.into(),
            flags: ShareholderReturnFlags {
                dividend_prior: prior,
                buyback_prior: false,
                dividend_current: false,
                buyback_current: current,
            },
        }
    }

    fn tables() -> YearInputs {
        let mut inputs = YearInputs::empty(2022);
        inputs.fundamentals_current = vec![
            fundamentals("000003", 500.0, 5000.0, 0.8),
            fundamentals("000001", 100.0, 1000.0, 1.2),
            fundamentals("000002", 5.0, 100.0, 0.5),
            fundamentals("000004", 50.0, 1000.0, 0.7),
        ];
        inputs.fundamentals_prior = vec![
            fundamentals("000001", 80.0, 800.0, 1.0),
            fundamentals("000002", -2.0, 90.0, 0.6),
            fundamentals("000003", 400.0, 4000.0, 0.6),
            fundamentals("000004", 40.0, 0.0, 0.9),
        ];
        inputs.shareholder_returns = vec![
            returned("000001", true, true),
            returned("000002", true, true),
            returned("000003", true, true),
            returned("000004", false, true),
        ];
        inputs.industries = [
            ("000001".to_string(), "Banks".to_string()),
            ("000002".to_string(), "Banks".to_string()),
            ("000003".to_string(), "Materials".to_string()),
            ("000004".to_string(), "Materials".to_string()),
        ]
        .into_iter()
        .collect();
        inputs
    }

    fn input() -> Vec<Candidate> {
        ["000003", "000001", "000002", "000004"]
            .into_iter()
            .map(|c| Candidate::new(c, c, Market::Kospi))
            .collect()
    }

    #[test]
    fn test_profitability_rule() {
        assert!(is_profitable(Some(1.0), Some(1.0)));
        assert!(!is_profitable(Some(5.0), Some(-2.0)));
        assert!(!is_profitable(Some(0.0), Some(3.0)));
        assert!(!is_profitable(None, Some(3.0)));
    }

    #[test]
    fn test_stage_output_sorted_and_filtered() {
        let out = ProfitabilityStage.screen(input(), &tables()).unwrap();
        let codes: Vec<_> = out.iter().map(|c| c.code.as_str()).collect();
        // 000002 has EPS 5 / -2, 000004 returned nothing in the prior year
        assert_eq!(codes, vec!["000001", "000003"]);
        assert_eq!(out[0].industry.as_deref(), Some("Banks"));
        assert!((out[1].avg_pbr.unwrap() - 0.7).abs() < 1e-12);
        assert!((out[1].avg_roe.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_bps_gives_missing_roe() {
        let (joined, _) = ProfitabilityStage.join(input(), &tables());
        let c = joined.iter().find(|c| c.code == "000004").unwrap();
        assert_eq!(c.avg_roe, None);
        assert!(c.avg_pbr.is_some());
    }

    #[test]
    fn test_join_drops_counted() {
        let mut tables = tables();
        tables.fundamentals_prior.retain(|r| r.code != "000003");
        tables.industries.remove("000001");

        let mut input = input();
        input.push(Candidate::new("000002", "dup", Market::Kospi));
        input.push(Candidate::new("000009", "no data", Market::Kosdaq));

        let (joined, drops) = ProfitabilityStage.join(input.clone(), &tables);
        assert_eq!(joined.len(), 2);
        assert_eq!(drops.missing_current_fundamentals, 1);
        assert_eq!(drops.missing_prior_fundamentals, 1);
        assert_eq!(drops.missing_industry, 1);
        assert_eq!(drops.duplicates, 1);
        assert_eq!(ProfitabilityStage.unmatched(&input, &tables), 4);
    }

    #[test]
    fn test_empty_input() {
        let out = ProfitabilityStage.screen(Vec::new(), &tables()).unwrap();
        assert!(out.is_empty());
    }
}
