//! Performance metrics for level series.
//!
//! This module summarises an index or portfolio series:
//! - Total and annualized return
//! - Annualized volatility of daily returns
//! - Maximum drawdown
//! - Calendar-year returns

use std::collections::BTreeMap;

use chrono::Datelike;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use valueup_traits::{Date, Result, TimeSeries, ValueUpError};

/// Trading days per year used to annualize volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// How returns are annualized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "convention", rename_all = "snake_case")]
pub enum Annualization {
    /// `(1 + total)^(periods_per_year / observations) - 1`, measured over
    /// the whole series.
    TradingDays {
        /// Observations per year
        periods_per_year: f64,
    },
    /// `(1 + total)^(365 / calendar_days) - 1`, measured from the first
    /// observation on or after `anchor`.
    Calendar {
        /// Start of the measurement window
        anchor: Date,
    },
}

impl Default for Annualization {
    fn default() -> Self {
        Self::TradingDays {
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Summary statistics of one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// First date of the measurement window
    pub start: Date,
    /// Last date of the measurement window
    pub end: Date,
    /// Observations in the window
    pub observations: usize,
    /// Last / first - 1
    pub total_return: f64,
    /// Geometric annualized return
    pub annualized_return: f64,
    /// Sample standard deviation of daily returns, times sqrt(252)
    pub annualized_volatility: f64,
    /// Largest peak-to-trough decline, as a positive fraction
    pub max_drawdown: f64,
}

impl PerformanceSummary {
    /// Summarise `series` under the given convention.
    ///
    /// # Arguments
    ///
    /// * `series` - Index levels or cumulative values
    /// * `convention` - Annualization convention
    ///
    /// # Returns
    ///
    /// The summary; statistics that need more data than available are NaN.
    ///
    /// # Errors
    ///
    /// Returns [`ValueUpError::InsufficientData`] if the window is empty or
    /// starts at a non-positive value.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use valueup_eval::{Annualization, PerformanceSummary};
    ///
    /// let summary = PerformanceSummary::calculate(&levels, &Annualization::default())?;
    /// println!("Total Return: {:.2}%", summary.total_return * 100.0);
    /// ```
    pub fn calculate(series: &TimeSeries, convention: &Annualization) -> Result<Self> {
        let window = match convention {
            Annualization::TradingDays { .. } => series.clone(),
            Annualization::Calendar { anchor } => series
                .last()
                .map(|(end, _)| series.between(*anchor, end))
                .unwrap_or_default(),
        };

        let (Some((start, first)), Some((end, last))) = (window.first(), window.last()) else {
            return Err(ValueUpError::InsufficientData(
                "Cannot summarise an empty series".to_string(),
            ));
        };
        if first <= 0.0 || !first.is_finite() {
            return Err(ValueUpError::InsufficientData(format!(
                "Series starts at a non-positive value on {start}"
            )));
        }

        let total_return = last / first - 1.0;
        let annualized_return = match convention {
            Annualization::TradingDays { periods_per_year } => {
                (1.0 + total_return).powf(periods_per_year / window.len() as f64) - 1.0
            }
            Annualization::Calendar { .. } => {
                let days = (end - start).num_days();
                if days > 0 {
                    (1.0 + total_return).powf(365.0 / days as f64) - 1.0
                } else {
                    f64::NAN
                }
            }
        };

        Ok(Self {
            start,
            end,
            observations: window.len(),
            total_return,
            annualized_return,
            annualized_volatility: annualized_volatility(&window),
            max_drawdown: max_drawdown(&window),
        })
    }
}

/// Sample standard deviation of daily returns, annualized with 252 days.
///
/// NaN with fewer than two returns.
#[must_use]
pub fn annualized_volatility(series: &TimeSeries) -> f64 {
    let returns = Array1::from_vec(series.pct_changes());
    if returns.len() < 2 {
        return f64::NAN;
    }
    returns.std(1.0) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Largest decline from a running peak, as a positive fraction.
#[must_use]
pub fn max_drawdown(series: &TimeSeries) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0;

    for value in series.values() {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = 1.0 - value / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Return within each calendar year, first to last observation.
///
/// Years with a single observation read 0.
pub fn yearly_returns(series: &TimeSeries) -> BTreeMap<i32, f64> {
    let mut bounds: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for (date, value) in series.iter() {
        bounds
            .entry(date.year())
            .and_modify(|(_, last)| *last = value)
            .or_insert((value, value));
    }

    bounds
        .into_iter()
        .filter(|(_, (first, _))| *first != 0.0)
        .map(|(year, (first, last))| (year, last / first - 1.0))
        .collect()
}
