//! Plain market-cap weighting without a ceiling.

use valueup_traits::Result;

use crate::weighter::{MarketValues, WeightVector, Weighter};

/// Weights proportional to market value.
///
/// Every valid entry keeps a cap factor of 1.0. Used for diagnostics next to
/// the capped index, to show how concentrated the uncapped portfolio would be.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketCapWeighter;

impl Weighter for MarketCapWeighter {
    fn weigh(&self, values: &MarketValues) -> Result<WeightVector> {
        let factors = values
            .values
            .mapv(|v| if v.is_finite() && v > 0.0 { 1.0 } else { 0.0 });
        Ok(WeightVector::from_factors(
            values.codes.clone(),
            &values.values,
            factors,
        ))
    }

    fn name(&self) -> &str {
        "market_cap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_market_cap_weights() {
        let values: MarketValues = [
            ("005930".to_string(), 600.0),
            ("000660".to_string(), 300.0),
            ("035420".to_string(), 100.0),
            ("051910".to_string(), f64::NAN),
        ]
        .into_iter()
        .collect();

        let wv = MarketCapWeighter.weigh(&values).unwrap();
        assert_relative_eq!(wv.weight("005930").unwrap(), 0.6);
        assert_relative_eq!(wv.weight("035420").unwrap(), 0.1);
        assert_eq!(wv.weight("051910"), Some(0.0));
        assert_relative_eq!(wv.capped_total(), 1000.0);
    }
}
