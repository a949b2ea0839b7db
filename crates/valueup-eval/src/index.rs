//! Capped market-cap index levels.
//!
//! The index on day `t` is the capped market value of day `t`'s
//! constituents divided by the capped market value of the base-date
//! constituents on the base date, times the base value. Cap factors are
//! recomputed every day from that day's market values.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use valueup_traits::{ConstituentSet, Date, MarketPanel, Result, TimeSeries, ValueUpError};
use valueup_weight::{CapConfig, CapWeighter, MarketValues, Weighter};

use crate::calendar::business_days;
use crate::schedule::UniverseSchedule;

/// Index calculation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// First day to evaluate
    pub start_date: Date,
    /// Last day to evaluate
    pub end_date: Date,
    /// Day on which the index equals `base_value`
    pub base_date: Date,
    /// Index level on the base date
    pub base_value: f64,
    /// Per-constituent weight ceiling
    pub cap: CapConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            start_date: Date::from_ymd_opt(2021, 1, 4).unwrap_or(Date::MIN),
            end_date: Date::from_ymd_opt(2024, 12, 31).unwrap_or(Date::MIN),
            base_date: Date::from_ymd_opt(2024, 1, 2).unwrap_or(Date::MIN),
            base_value: 1000.0,
            cap: CapConfig::default(),
        }
    }
}

/// Computes daily index levels.
#[derive(Debug, Clone)]
pub struct IndexCalculator<W = CapWeighter> {
    config: IndexConfig,
    weighter: W,
}

impl IndexCalculator<CapWeighter> {
    /// Create a calculator using the capped weighter from `config`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use valueup_eval::{IndexCalculator, IndexConfig};
    ///
    /// let calculator = IndexCalculator::new(IndexConfig::default());
    /// let levels = calculator.compute(&panel, &schedule)?;
    /// ```
    pub const fn new(config: IndexConfig) -> Self {
        let weighter = CapWeighter::new(config.cap);
        Self { config, weighter }
    }
}

impl<W: Weighter> IndexCalculator<W> {
    /// Create a calculator with a custom weighting scheme.
    pub const fn with_weighter(config: IndexConfig, weighter: W) -> Self {
        Self { config, weighter }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Capped market value of `set` on `date`.
    ///
    /// Constituents without a positive market value that day are left out.
    /// Returns `None` when nothing remains.
    ///
    /// # Errors
    ///
    /// Propagates weighting errors.
    pub fn capped_total(&self, panel: &MarketPanel, set: &ConstituentSet, date: Date) -> Result<Option<f64>> {
        let values: MarketValues = set
            .codes()
            .map(|code| {
                let value = panel.market_cap(date, code).unwrap_or(f64::NAN);
                (code.to_string(), value)
            })
            .collect();

        let weights = self.weighter.weigh(&values)?;
        let total = weights.capped_total();
        Ok((total > 0.0 && total.is_finite()).then_some(total))
    }

    /// Compute the index over the configured date range.
    ///
    /// Weekdays without market data, without an investable set, or without
    /// any priced constituent are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`ValueUpError::InvalidDate`] if the panel has no data on the
    /// base date, and [`ValueUpError::InsufficientData`] if no constituent
    /// is investable or priced on the base date.
    pub fn compute(&self, panel: &MarketPanel, schedule: &UniverseSchedule) -> Result<TimeSeries> {
        let base_date = self.config.base_date;
        if !panel.has_date(base_date) {
            return Err(ValueUpError::InvalidDate(format!(
                "No market data on base date {base_date}"
            )));
        }

        let base_set = schedule.set_for_date(base_date).ok_or_else(|| {
            ValueUpError::InsufficientData(format!("No constituent set for base date {base_date}"))
        })?;
        let base_total = self.capped_total(panel, base_set, base_date)?.ok_or_else(|| {
            ValueUpError::InsufficientData(format!(
                "No constituent has a market value on base date {base_date}"
            ))
        })?;
        debug!(%base_date, base_total, constituents = base_set.len(), "base capped market value");

        let mut levels = TimeSeries::new();
        for date in business_days(self.config.start_date, self.config.end_date) {
            if !panel.has_date(date) {
                continue;
            }
            let Some(set) = schedule.set_for_date(date) else {
                continue;
            };
            if let Some(total) = self.capped_total(panel, set, date)? {
                levels.insert(date, total / base_total * self.config.base_value);
            }
        }

        info!(
            days = levels.len(),
            weighting = self.weighter.name(),
            "index computed"
        );
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleConfig;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;
    use valueup_traits::{Candidate, DailyQuote, Market};
    use valueup_weight::MarketCapWeighter;

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

    fn quote(cap: f64) -> DailyQuote {
        DailyQuote {
            close: Some(cap / 100.0),
            market_cap: Some(cap),
        }
    }

    /// Set A (selected 2022) trades in 2023, set B (selected 2023) in 2024.
    fn fixture() -> (MarketPanel, UniverseSchedule) {
        let mut panel = MarketPanel::new();
        for (date, scale) in [
            (d(2023, 12, 28), 1.0),
            (d(2024, 1, 2), 1.0),
            (d(2024, 1, 3), 1.1),
        ] {
            panel.insert(date, "00000A", quote(100.0 * scale));
            panel.insert(date, "00000B", quote(200.0 * scale));
        }
        // Saturday row is never evaluated
        panel.insert(d(2024, 1, 6), "00000B", quote(999.0));

        let sets: BTreeMap<i32, ConstituentSet> = [
            (2022, set(2022, &["00000A"])),
            (2023, set(2023, &["00000B"])),
        ]
        .into_iter()
        .collect();
        (panel, UniverseSchedule::new(sets, ScheduleConfig::default()))
    }

    fn config() -> IndexConfig {
        IndexConfig {
            start_date: d(2023, 12, 25),
            end_date: d(2024, 1, 10),
            base_date: d(2024, 1, 2),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_date_equals_base_value() {
        let (panel, schedule) = fixture();
        let levels = IndexCalculator::new(config()).compute(&panel, &schedule).unwrap();
        assert_eq!(levels.get(d(2024, 1, 2)), Some(1000.0));
    }

    #[test]
    fn test_selection_lag_switches_sets() {
        let (panel, schedule) = fixture();
        let levels = IndexCalculator::new(config()).compute(&panel, &schedule).unwrap();

        // 2023 uses set A (cap 100) against the 2024 base of set B (cap 200)
        assert_relative_eq!(levels.get(d(2023, 12, 28)).unwrap(), 500.0, epsilon = 1e-9);
        assert_relative_eq!(levels.get(d(2024, 1, 3)).unwrap(), 1100.0, epsilon = 1e-9);
        assert_eq!(levels.len(), 3);
        assert!(levels.get(d(2024, 1, 6)).is_none());
    }

    #[test]
    fn test_invalid_base_date() {
        let (panel, schedule) = fixture();
        let config = IndexConfig {
            base_date: d(2024, 1, 4),
            ..config()
        };
        let err = IndexCalculator::new(config).compute(&panel, &schedule).unwrap_err();
        assert!(matches!(err, ValueUpError::InvalidDate(_)));
    }

    #[test]
    fn test_base_date_without_constituents() {
        let (panel, _) = fixture();
        let schedule = UniverseSchedule::new(BTreeMap::new(), ScheduleConfig::default());
        let err = IndexCalculator::new(config()).compute(&panel, &schedule).unwrap_err();
        assert!(matches!(err, ValueUpError::InsufficientData(_)));
    }

    #[test]
    fn test_custom_weighter() {
        let (panel, schedule) = fixture();
        let calculator = IndexCalculator::with_weighter(config(), MarketCapWeighter);
        let levels = calculator.compute(&panel, &schedule).unwrap();
        assert_eq!(levels.get(d(2024, 1, 2)), Some(1000.0));
    }

    #[test]
    fn test_capped_total_skips_unpriced() {
        let (panel, _) = fixture();
        let calculator = IndexCalculator::new(config());
        let partial = set(2023, &["00000A", "00000Z"]);
        let total = calculator.capped_total(&panel, &partial, d(2024, 1, 2)).unwrap();
        assert_eq!(total, Some(100.0));

        let none = set(2023, &["00000Z"]);
        assert_eq!(calculator.capped_total(&panel, &none, d(2024, 1, 2)).unwrap(), None);
    }
}
