//! Cumulative portfolio returns.
//!
//! Unlike the index level, which re-derives cap factors every day, the
//! portfolio holds weights fixed between rebalance dates. A day's return
//! uses the weights in force at the previous close; a rebalance on day `t`
//! takes effect from day `t + 1`.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use valueup_traits::{Date, MarketPanel, Result, TimeSeries, ValueUpError};
use valueup_weight::{CapConfig, CapWeighter, MarketValues, WeightVector, Weighter};

use crate::calendar::business_days;
use crate::schedule::UniverseSchedule;

/// Portfolio simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// First day to evaluate
    pub start_date: Date,
    /// Last day to evaluate
    pub end_date: Date,
    /// Month of the yearly rebalance
    pub rebalance_month: u32,
    /// Day of month of the yearly rebalance
    pub rebalance_day: u32,
    /// Day on which the normalized series equals `base_value`
    pub anchor_date: Date,
    /// Normalized level on the anchor date
    pub base_value: f64,
    /// Per-constituent weight ceiling
    pub cap: CapConfig,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            start_date: Date::from_ymd_opt(2021, 1, 4).unwrap_or(Date::MIN),
            end_date: Date::from_ymd_opt(2024, 12, 31).unwrap_or(Date::MIN),
            rebalance_month: 1,
            rebalance_day: 1,
            anchor_date: Date::from_ymd_opt(2024, 1, 2).unwrap_or(Date::MIN),
            base_value: 1000.0,
            cap: CapConfig::default(),
        }
    }
}

impl PortfolioConfig {
    /// Scheduled rebalance date in `year`.
    ///
    /// February 29 falls back to February 28 in common years.
    #[must_use]
    pub fn rebalance_date(&self, year: i32) -> Option<Date> {
        Date::from_ymd_opt(year, self.rebalance_month, self.rebalance_day).or_else(|| {
            (self.rebalance_month == 2 && self.rebalance_day == 29)
                .then(|| Date::from_ymd_opt(year, 2, 28))
                .flatten()
        })
    }

    fn validate(&self) -> Result<()> {
        // 2000 is a leap year, so every real month/day pair exists in it
        if Date::from_ymd_opt(2000, self.rebalance_month, self.rebalance_day).is_none() {
            return Err(ValueUpError::InvalidDate(format!(
                "Invalid rebalance month/day {}/{}",
                self.rebalance_month, self.rebalance_day
            )));
        }
        if self.start_date > self.end_date {
            return Err(ValueUpError::InvalidDate(format!(
                "Start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    /// Whether `date` is the first trading day on or after a scheduled
    /// rebalance, given the previous trading day.
    fn crosses_rebalance(&self, previous: Date, date: Date) -> bool {
        (previous.year()..=date.year())
            .filter_map(|y| self.rebalance_date(y))
            .any(|r| previous < r && r <= date)
    }
}

/// Output of a portfolio simulation.
#[derive(Debug, Clone)]
pub struct PortfolioResult {
    /// Daily portfolio returns, keyed by the day they were earned
    pub daily_returns: TimeSeries,
    /// Running product of `1 + r`, starting at 1.0
    pub cumulative: TimeSeries,
    /// `cumulative` rescaled to read `base_value` on the anchor
    pub normalized: TimeSeries,
    /// Days on which weights were reset
    pub rebalance_dates: Vec<Date>,
    /// Trading day the normalization was anchored on
    pub anchor_used: Date,
}

/// Simulates a capped market-cap portfolio over the constituent schedule.
#[derive(Debug, Clone)]
pub struct PortfolioSimulator<W = CapWeighter> {
    config: PortfolioConfig,
    weighter: W,
}

impl PortfolioSimulator<CapWeighter> {
    /// Create a simulator using the capped weighter from `config`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use valueup_eval::{PortfolioConfig, PortfolioSimulator};
    ///
    /// let simulator = PortfolioSimulator::new(PortfolioConfig::default());
    /// let result = simulator.run(&panel, &schedule)?;
    /// println!("Rebalanced {} times", result.rebalance_dates.len());
    /// ```
    pub const fn new(config: PortfolioConfig) -> Self {
        let weighter = CapWeighter::new(config.cap);
        Self { config, weighter }
    }
}

impl<W: Weighter> PortfolioSimulator<W> {
    /// Create a simulator with a custom weighting scheme.
    pub const fn with_weighter(config: PortfolioConfig, weighter: W) -> Self {
        Self { config, weighter }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PortfolioConfig {
        &self.config
    }

    /// Weights for the set investable on `date`, from that day's market values.
    fn rebalance(&self, panel: &MarketPanel, schedule: &UniverseSchedule, date: Date) -> Result<Option<WeightVector>> {
        let Some(set) = schedule.set_for_date(date) else {
            return Ok(None);
        };
        let values: MarketValues = set
            .codes()
            .map(|code| (code.to_string(), panel.market_cap(date, code).unwrap_or(f64::NAN)))
            .collect();
        let weights = self.weighter.weigh(&values)?;
        Ok((!weights.is_empty()).then_some(weights))
    }

    /// Run the simulation.
    ///
    /// Days without market data are skipped. Days on which no held
    /// constituent is priced on both that day and the previous trading day
    /// are absent from the output.
    ///
    /// # Errors
    ///
    /// Returns [`ValueUpError::InvalidDate`] for an invalid configuration or
    /// when no output day falls on or after the anchor, and
    /// [`ValueUpError::InsufficientData`] when no day could be weighted.
    pub fn run(&self, panel: &MarketPanel, schedule: &UniverseSchedule) -> Result<PortfolioResult> {
        self.config.validate()?;

        let mut daily_returns = TimeSeries::new();
        let mut cumulative = TimeSeries::new();
        let mut rebalance_dates = Vec::new();

        let mut weights: Option<WeightVector> = None;
        let mut previous: Option<Date> = None;
        let mut growth = 1.0;

        for date in business_days(self.config.start_date, self.config.end_date) {
            if !panel.has_date(date) {
                continue;
            }

            if let (Some(held), Some(prev)) = (&weights, previous) {
                match daily_return(held, panel, prev, date) {
                    Some(r) => {
                        growth *= 1.0 + r;
                        daily_returns.insert(date, r);
                        cumulative.insert(date, growth);
                    }
                    None => debug!(%date, "no held constituent priced on both days"),
                }
            }

            let due = match (previous, &weights) {
                (None, _) | (_, None) => true,
                (Some(prev), Some(_)) => self.config.crosses_rebalance(prev, date),
            };
            if due {
                let started = weights.is_some();
                match self.rebalance(panel, schedule, date)? {
                    Some(new_weights) => {
                        if !started {
                            cumulative.insert(date, growth);
                        }
                        debug!(%date, constituents = new_weights.len(), "rebalanced");
                        rebalance_dates.push(date);
                        weights = Some(new_weights);
                    }
                    None if started => {
                        warn!(%date, "no investable constituents at rebalance, holding is emptied");
                        weights = None;
                    }
                    None => {}
                }
            }

            previous = Some(date);
        }

        if cumulative.is_empty() {
            return Err(ValueUpError::InsufficientData(
                "No trading day had investable, priced constituents".to_string(),
            ));
        }

        let (normalized, anchor_used) = cumulative.rebase(self.config.anchor_date, self.config.base_value)?;
        info!(
            days = cumulative.len(),
            rebalances = rebalance_dates.len(),
            %anchor_used,
            weighting = self.weighter.name(),
            "portfolio simulated"
        );

        Ok(PortfolioResult {
            daily_returns,
            cumulative,
            normalized,
            rebalance_dates,
            anchor_used,
        })
    }
}

/// Weighted price return from `previous` to `date`.
///
/// Only constituents priced on both days contribute, and the result is
/// divided by their combined weight. Returns `None` when none qualify.
pub fn daily_return(weights: &WeightVector, panel: &MarketPanel, previous: Date, date: Date) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;

    for (code, w) in weights.iter() {
        let prices = (panel.close(previous, code), panel.close(date, code));
        if let (Some(p0), Some(p1)) = prices {
            if p0 > 0.0 && p0.is_finite() && p1.is_finite() {
                weighted += w * (p1 / p0 - 1.0);
                weight_sum += w;
            }
        }
    }

    (weight_sum > 0.0).then(|| weighted / weight_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleConfig;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;
    use valueup_traits::{Candidate, ConstituentSet, DailyQuote, Market};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn set(year: i32, codes: &[&str]) -> ConstituentSet {
        ConstituentSet::new(
            year,
            codes
                .iter()
                .map(|c| Candidate::new(*c, *c, Market::Kospi))
                .collect(),
        )
    }

    fn quote(close: f64, cap: f64) -> DailyQuote {
        DailyQuote {
            close: Some(close),
            market_cap: Some(cap),
        }
    }

    fn schedule() -> UniverseSchedule {
        let sets: BTreeMap<i32, ConstituentSet> = [
            (2022, set(2022, &["00000A", "00000B"])),
            (2023, set(2023, &["00000B"])),
        ]
        .into_iter()
        .collect();
        UniverseSchedule::new(sets, ScheduleConfig::default())
    }

    fn panel() -> MarketPanel {
        let mut panel = MarketPanel::new();
        // A and B equal-weighted (two names, cap infeasible)
        panel.insert(d(2023, 12, 27), "00000A", quote(100.0, 1000.0));
        panel.insert(d(2023, 12, 27), "00000B", quote(50.0, 3000.0));
        panel.insert(d(2023, 12, 28), "00000A", quote(110.0, 1100.0));
        panel.insert(d(2023, 12, 28), "00000B", quote(50.0, 3000.0));
        // A is not priced on the first trading day of 2024
        panel.insert(d(2024, 1, 2), "00000B", quote(55.0, 3300.0));
        panel.insert(d(2024, 1, 3), "00000A", quote(500.0, 5000.0));
        panel.insert(d(2024, 1, 3), "00000B", quote(44.0, 2640.0));
        panel
    }

    fn config() -> PortfolioConfig {
        PortfolioConfig {
            start_date: d(2023, 12, 25),
            end_date: d(2024, 1, 5),
            anchor_date: d(2023, 12, 27),
            base_value: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_returns_use_previous_weights() {
        let result = PortfolioSimulator::new(config()).run(&panel(), &schedule()).unwrap();

        // 12-28: 0.5 * 10% + 0.5 * 0%
        assert_relative_eq!(result.daily_returns.get(d(2023, 12, 28)).unwrap(), 0.05, epsilon = 1e-12);
        // 01-02: A unpriced, so B alone carries the 2023 weights
        assert_relative_eq!(result.daily_returns.get(d(2024, 1, 2)).unwrap(), 0.10, epsilon = 1e-12);
        // 01-03: rebalanced into B only on 01-02
        assert_relative_eq!(result.daily_returns.get(d(2024, 1, 3)).unwrap(), -0.20, epsilon = 1e-12);

        assert_eq!(result.rebalance_dates, vec![d(2023, 12, 27), d(2024, 1, 2)]);
        assert_relative_eq!(
            result.cumulative.get(d(2024, 1, 3)).unwrap(),
            1.05 * 1.10 * 0.80,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_normalized_at_anchor() {
        let result = PortfolioSimulator::new(config()).run(&panel(), &schedule()).unwrap();
        assert_eq!(result.anchor_used, d(2023, 12, 27));
        assert_eq!(result.normalized.get(d(2023, 12, 27)), Some(100.0));
        assert_relative_eq!(result.normalized.get(d(2023, 12, 28)).unwrap(), 105.0, epsilon = 1e-9);
    }

    #[test]
    fn test_anchor_rolls_forward_and_rebases_backward() {
        let config = PortfolioConfig {
            anchor_date: d(2023, 12, 30),
            ..config()
        };
        let result = PortfolioSimulator::new(config).run(&panel(), &schedule()).unwrap();
        assert_eq!(result.anchor_used, d(2024, 1, 2));
        assert_eq!(result.normalized.get(d(2024, 1, 2)), Some(100.0));
        assert_relative_eq!(
            result.normalized.get(d(2023, 12, 27)).unwrap(),
            100.0 / (1.05 * 1.10),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rebalance_date_fallback() {
        let config = PortfolioConfig {
            rebalance_month: 2,
            rebalance_day: 29,
            ..Default::default()
        };
        assert_eq!(config.rebalance_date(2023), Some(d(2023, 2, 28)));
        assert_eq!(config.rebalance_date(2024), Some(d(2024, 2, 29)));

        let bad = PortfolioConfig {
            rebalance_month: 2,
            rebalance_day: 30,
            ..Default::default()
        };
        assert!(PortfolioSimulator::new(bad).run(&panel(), &schedule()).is_err());
    }

    #[test]
    fn test_no_constituents() {
        let empty = UniverseSchedule::new(BTreeMap::new(), ScheduleConfig::default());
        let err = PortfolioSimulator::new(config()).run(&panel(), &empty).unwrap_err();
        assert!(matches!(err, ValueUpError::InsufficientData(_)));
    }
}
