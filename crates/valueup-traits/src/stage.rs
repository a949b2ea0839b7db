//! Screening stage trait.
//!
//! This module defines the `ScreeningStage` trait, the core abstraction of
//! the constituent funnel. A stage takes the survivors of the previous stage
//! together with the year's input tables and returns its own survivors,
//! annotated with whatever derived fields it computed.

use crate::{Candidate, Result, YearInputs};

/// One step of the constituent screening funnel.
///
/// Implementations must be pure: the same input and tables give the same
/// output, and a stage never adds a company that was not in its input.
/// They should be thread-safe (`Send + Sync`) so years can be screened
/// independently.
///
/// # Example
///
/// ```no_run
/// use valueup_traits::{Candidate, Result, ScreeningStage, YearInputs};
///
/// struct KospiOnly;
///
/// impl ScreeningStage for KospiOnly {
///     fn name(&self) -> &str {
///         "kospi_only"
///     }
///
///     fn screen(&self, input: Vec<Candidate>, _tables: &YearInputs) -> Result<Vec<Candidate>> {
///         Ok(input
///             .into_iter()
///             .filter(|c| c.market == valueup_traits::Market::Kospi)
///             .collect())
///     }
/// }
/// ```
pub trait ScreeningStage: Send + Sync {
    /// Returns the name of this stage.
    ///
    /// Used in log lines and in the funnel report.
    fn name(&self) -> &str;

    /// Filters `input` down to the companies that pass this stage.
    ///
    /// # Arguments
    ///
    /// * `input` - Survivors of the previous stage
    /// * `tables` - The screening year's input tables
    ///
    /// # Errors
    ///
    /// Returns an error only when the tables are structurally unusable.
    /// An empty input is not an error and yields an empty output.
    fn screen(&self, input: Vec<Candidate>, tables: &YearInputs) -> Result<Vec<Candidate>>;

    /// Number of `input` rows this stage drops because a lookup table has
    /// no matching row for them.
    ///
    /// Stages that do not join against other tables keep the default of 0.
    fn unmatched(&self, _input: &[Candidate], _tables: &YearInputs) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Market;

    struct TakeFirst(usize);

    impl ScreeningStage for TakeFirst {
        fn name(&self) -> &str {
            "take_first"
        }

        fn screen(&self, input: Vec<Candidate>, _tables: &YearInputs) -> Result<Vec<Candidate>> {
            Ok(input.into_iter().take(self.0).collect())
        }
    }

    #[test]
    fn test_stage_screen() {
        let stage = TakeFirst(1);
        let input = vec![
            Candidate::new("005930", "Samsung Electronics", Market::Kospi),
            Candidate::new("000660", "SK hynix", Market::Kospi),
        ];
        let out = stage.screen(input, &YearInputs::empty(2023)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "005930");
        assert_eq!(stage.name(), "take_first");
        assert_eq!(stage.unmatched(&[], &YearInputs::empty(2023)), 0);
    }

    #[test]
    fn test_stage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn ScreeningStage>>();
    }
}
