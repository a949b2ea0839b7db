//! Capped market-cap weighting.
//!
//! No single constituent may exceed the cap (15% by default). The largest
//! entry is pinned at exactly the cap and taken out of contention, the
//! remaining entries share what is left in proportion to their market value,
//! and the check is repeated. Each round pins one entry, so the loop ends
//! after at most `N - 1` rounds.
//!
//! When `N * cap < 1` no allocation can satisfy the cap and the closest one,
//! equal weights, is returned instead.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;
use valueup_traits::{Result, ValueUpError};

use crate::weighter::{MarketValues, WeightVector, Weighter};

const WEIGHT_TOLERANCE: f64 = 1e-12;

/// Configuration for capped weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CapConfig {
    /// Maximum weight of a single constituent
    pub cap: f64,
}

impl Default for CapConfig {
    fn default() -> Self {
        Self { cap: 0.15 }
    }
}

/// Market-cap weighter with a per-constituent ceiling.
///
/// # Examples
///
/// ```rust,no_run
/// use ndarray::Array1;
/// use valueup_weight::{CapConfig, CapWeighter, MarketValues, Weighter};
///
/// let weighter = CapWeighter::new(CapConfig::default());
/// let values: MarketValues = (0..10)
///     .map(|i| (format!("{i:06}"), 100.0 * (i + 1) as f64))
///     .collect();
///
/// let weights = weighter.weigh(&values).unwrap();
/// assert!(weights.max_weight() <= 0.15 + 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapWeighter {
    config: CapConfig,
}

impl CapWeighter {
    /// Create a new capped weighter with the given configuration.
    pub const fn new(config: CapConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &CapConfig {
        &self.config
    }

    /// Cap factors for `basis` on its original domain.
    ///
    /// Uncapped entries get 1.0, capped entries a factor below 1.0 and
    /// entries with a non-positive or missing basis get 0.0.
    pub fn cap_factors(&self, basis: &Array1<f64>) -> Array1<f64> {
        let cap = self.config.cap;
        let valid: Vec<usize> = basis
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_finite() && **b > 0.0)
            .map(|(i, _)| i)
            .collect();

        let mut factors = Array1::zeros(basis.len());
        if valid.is_empty() {
            return factors;
        }

        let n = valid.len();
        if (n as f64) * cap < 1.0 {
            debug!(n, cap, "cap infeasible, using equal weights");
            return equal_weight_factors(basis, &valid);
        }

        let mut capped: Vec<usize> = Vec::new();
        let mut uncapped = valid.clone();

        loop {
            let residual = 1.0 - cap * capped.len() as f64;
            let uncapped_sum: f64 = uncapped.iter().map(|&i| basis[i]).sum();
            if uncapped.is_empty() || residual <= 0.0 || uncapped_sum <= 0.0 {
                return equal_weight_factors(basis, &valid);
            }

            let (pos, &largest) = match uncapped
                .iter()
                .enumerate()
                .max_by(|a, b| basis[*a.1].total_cmp(&basis[*b.1]))
            {
                Some(found) => found,
                None => return equal_weight_factors(basis, &valid),
            };

            let largest_weight = basis[largest] / uncapped_sum * residual;
            if largest_weight <= cap + WEIGHT_TOLERANCE {
                // Uncapped weights are basis / total, so capped entries need
                // basis * factor = cap * total.
                let total = uncapped_sum / residual;
                for &i in &uncapped {
                    factors[i] = 1.0;
                }
                for &i in &capped {
                    factors[i] = cap * total / basis[i];
                }
                return factors;
            }

            capped.push(uncapped.swap_remove(pos));
        }
    }
}

/// Factors that bring every valid entry down to the smallest basis.
fn equal_weight_factors(basis: &Array1<f64>, valid: &[usize]) -> Array1<f64> {
    let min_basis = valid
        .iter()
        .map(|&i| basis[i])
        .fold(f64::INFINITY, f64::min);

    let mut factors = Array1::zeros(basis.len());
    for &i in valid {
        factors[i] = min_basis / basis[i];
    }
    factors
}

impl Weighter for CapWeighter {
    fn weigh(&self, values: &MarketValues) -> Result<WeightVector> {
        if !(self.config.cap > 0.0 && self.config.cap <= 1.0) {
            return Err(ValueUpError::InvalidData(format!(
                "Weight cap must be in (0, 1], got {}",
                self.config.cap
            )));
        }

        let factors = self.cap_factors(&values.values);
        let weights = WeightVector::from_factors(values.codes.clone(), &values.values, factors);

        if weights.weights().iter().any(|w| !w.is_finite()) {
            return Err("Capped weighting produced non-finite values".into());
        }

        Ok(weights)
    }

    fn name(&self) -> &str {
        "capped_market_cap"
    }
}
