//! Date-indexed value series.
//!
//! [`TimeSeries`] backs the index-level series, the cumulative portfolio
//! return series and the benchmark closes. Dates are kept in ascending
//! order and a date appears at most once; days without a value are simply
//! absent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Date, Result, ValueUpError};

/// An ordered `(date, value)` series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    points: BTreeMap<Date, f64>,
}

impl TimeSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value for `date`.
    pub fn insert(&mut self, date: Date, value: f64) {
        self.points.insert(date, value);
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value on exactly `date`.
    pub fn get(&self, date: Date) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// First observation.
    pub fn first(&self) -> Option<(Date, f64)> {
        self.points.first_key_value().map(|(d, v)| (*d, *v))
    }

    /// Last observation.
    pub fn last(&self) -> Option<(Date, f64)> {
        self.points.last_key_value().map(|(d, v)| (*d, *v))
    }

    /// Iterates observations in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> Vec<Date> {
        self.points.keys().copied().collect()
    }

    /// Values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// First observation on or after `date`.
    pub fn on_or_after(&self, date: Date) -> Option<(Date, f64)> {
        self.points.range(date..).next().map(|(d, v)| (*d, *v))
    }

    /// Last observation on or before `date`.
    pub fn on_or_before(&self, date: Date) -> Option<(Date, f64)> {
        self.points.range(..=date).next_back().map(|(d, v)| (*d, *v))
    }

    /// Observations with `start <= date <= end`.
    pub fn between(&self, start: Date, end: Date) -> Self {
        if start > end {
            return Self::new();
        }
        self.points
            .range(start..=end)
            .map(|(d, v)| (*d, *v))
            .collect()
    }

    /// Simple daily returns `v_t / v_{t-1} - 1`, one per consecutive pair.
    pub fn pct_changes(&self) -> Vec<f64> {
        let values = self.values();
        values
            .windows(2)
            .map(|w| w[1] / w[0] - 1.0)
            .filter(|r| r.is_finite())
            .collect()
    }

    /// Reindex onto `dates`, carrying the last known value forward.
    ///
    /// Dates that precede the first observation stay absent.
    pub fn forward_fill(&self, dates: &[Date]) -> Self {
        dates
            .iter()
            .filter_map(|&d| self.on_or_before(d).map(|(_, v)| (d, v)))
            .collect()
    }

    /// Rescale so that the first observation on or after `anchor` equals
    /// `base`. Returns the rescaled series and the date actually used.
    ///
    /// # Errors
    ///
    /// Returns [`ValueUpError::InvalidDate`] if no observation exists on or
    /// after `anchor`, and [`ValueUpError::InvalidData`] if the anchor value
    /// is zero or not finite.
    pub fn rebase(&self, anchor: Date, base: f64) -> Result<(Self, Date)> {
        let (anchor_date, anchor_value) = self.on_or_after(anchor).ok_or_else(|| {
            ValueUpError::InvalidDate(format!("No observation on or after {anchor}"))
        })?;

        if anchor_value == 0.0 || !anchor_value.is_finite() {
            return Err(ValueUpError::InvalidData(format!(
                "Cannot rebase on {anchor_date}: value is {anchor_value}"
            )));
        }

        // Divide first so the anchor itself comes out as exactly `base`
        let rebased = self
            .iter()
            .map(|(d, v)| (d, v / anchor_value * base))
            .collect();
        Ok((rebased, anchor_date))
    }
}

impl FromIterator<(Date, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
