//! Core trait definition for constituent weighting schemes.

use ndarray::Array1;
use valueup_traits::{Result, StockCode, ValueUpError};

/// Raw market values of the constituents on one valuation date.
///
/// `codes[i]` owns `values[i]`. Values may be missing (`NaN`) or
/// non-positive; weighters drop those entries.
#[derive(Debug, Clone)]
pub struct MarketValues {
    /// Stock codes, one per value
    pub codes: Vec<StockCode>,

    /// Market value (or other non-negative basis) per stock
    pub values: Array1<f64>,
}

impl MarketValues {
    /// Pair up codes and values.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ.
    pub fn new(codes: Vec<StockCode>, values: Array1<f64>) -> Result<Self> {
        if codes.len() != values.len() {
            return Err(ValueUpError::InvalidData(format!(
                "{} codes but {} market values",
                codes.len(),
                values.len()
            )));
        }
        Ok(Self { codes, values })
    }

    /// Number of entries, valid or not.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl FromIterator<(StockCode, f64)> for MarketValues {
    fn from_iter<I: IntoIterator<Item = (StockCode, f64)>>(iter: I) -> Self {
        let (codes, values): (Vec<_>, Vec<_>) = iter.into_iter().unzip();
        Self {
            codes,
            values: Array1::from_vec(values),
        }
    }
}

/// Portfolio weights for one trading date.
///
/// Weights are non-negative and sum to 1 unless every entry was dropped, in
/// which case they are all zero. `cap_factors[i] * basis[i]` is the capped
/// market value of entry `i`; dropped entries carry a factor of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    codes: Vec<StockCode>,
    weights: Array1<f64>,
    cap_factors: Array1<f64>,
    capped_values: Array1<f64>,
}

impl WeightVector {
    /// Assemble a weight vector from a basis and per-entry cap factors.
    pub(crate) fn from_factors(codes: Vec<StockCode>, basis: &Array1<f64>, cap_factors: Array1<f64>) -> Self {
        let capped_values: Array1<f64> = basis
            .iter()
            .zip(cap_factors.iter())
            .map(|(&b, &f)| if f > 0.0 { b * f } else { 0.0 })
            .collect();

        let total = capped_values.sum();
        let weights = if total > 0.0 {
            &capped_values / total
        } else {
            Array1::zeros(capped_values.len())
        };

        Self {
            codes,
            weights,
            cap_factors,
            capped_values,
        }
    }

    /// Stock codes, aligned with [`Self::weights`].
    pub fn codes(&self) -> &[StockCode] {
        &self.codes
    }

    /// Weights, aligned with [`Self::codes`].
    pub const fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Cap factor per entry: 1.0 when uncapped, below 1.0 when capped, 0.0
    /// when the entry was dropped.
    pub const fn cap_factors(&self) -> &Array1<f64> {
        &self.cap_factors
    }

    /// Sum of capped market values, the index numerator/denominator.
    #[must_use]
    pub fn capped_total(&self) -> f64 {
        self.capped_values.sum()
    }

    /// Weight of one stock.
    pub fn weight(&self, code: &str) -> Option<f64> {
        self.codes
            .iter()
            .position(|c| c == code)
            .map(|i| self.weights[i])
    }

    /// Iterate `(code, weight)` pairs with a positive weight.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.codes
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w > 0.0)
            .map(|(c, w)| (c.as_str(), *w))
    }

    /// Largest single weight, 0.0 when empty.
    #[must_use]
    pub fn max_weight(&self) -> f64 {
        self.weights.iter().copied().fold(0.0, f64::max)
    }

    /// Number of entries carrying a positive weight.
    pub fn len(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0.0).count()
    }

    /// Whether no entry carries weight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns raw market values into portfolio weights.
///
/// All implementations must be stateless across calls and thread-safe.
///
/// # Examples
///
/// ```rust,no_run
/// use valueup_weight::{MarketValues, Weighter, WeightVector};
///
/// struct Passthrough;
///
/// impl Weighter for Passthrough {
///     fn weigh(&self, values: &MarketValues) -> valueup_traits::Result<WeightVector> {
///         valueup_weight::MarketCapWeighter.weigh(values)
///     }
///
///     fn name(&self) -> &str {
///         "passthrough"
///     }
/// }
/// ```
pub trait Weighter: Send + Sync {
    /// Compute weights for one valuation date.
    ///
    /// # Arguments
    ///
    /// * `values` - Raw market values of the day's constituents
    ///
    /// # Returns
    ///
    /// A weight vector on the same code domain as `values`.
    ///
    /// # Errors
    ///
    /// Returns an error if the weighting produces non-finite values.
    fn weigh(&self, values: &MarketValues) -> Result<WeightVector>;

    /// Name of this weighting scheme.
    ///
    /// Used for logging and in the CLI output.
    fn name(&self) -> &str;
}
