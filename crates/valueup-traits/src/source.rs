//! Yearly input tables and the trait that loads them.
//!
//! The funnel never touches the filesystem directly. It asks a
//! [`YearTableSource`] for the tables of one screening year and receives
//! either the tables or an explicit [`ValueUpError::MissingInputFile`], which
//! it treats as "no constituents this year" rather than as a fatal error.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::{
    FundamentalRow, IndustryMap, MarketCapRow, Result, ShareholderReturnRow, StockCode,
    ValueUpError,
};

/// Everything the four screening stages need for one year.
#[derive(Debug, Clone, Default)]
pub struct YearInputs {
    /// Screening (fundamentals) year.
    pub year: i32,
    /// Average market cap and traded value per company.
    pub market_caps: Vec<MarketCapRow>,
    /// Fundamentals for `year`.
    pub fundamentals_current: Vec<FundamentalRow>,
    /// Fundamentals for `year - 1`.
    pub fundamentals_prior: Vec<FundamentalRow>,
    /// Dividend and buyback flags for `year - 1` and `year`.
    pub shareholder_returns: Vec<ShareholderReturnRow>,
    /// Static industry classification.
    pub industries: IndustryMap,
    /// Constituents currently in the index, when incumbency rules apply.
    pub incumbents: Option<BTreeSet<StockCode>>,
}

impl YearInputs {
    /// Inputs with no rows, used by stage tests and for skipped years.
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            ..Self::default()
        }
    }

    /// Attach the current index members.
    #[must_use]
    pub fn with_incumbents(mut self, incumbents: BTreeSet<StockCode>) -> Self {
        self.incumbents = Some(incumbents);
        self
    }

    /// Whether `code` is a current index member.
    pub fn is_incumbent(&self, code: &str) -> bool {
        self.incumbents
            .as_ref()
            .is_some_and(|set| set.contains(code))
    }
}

/// Loads the yearly tables the screening funnel consumes.
///
/// Implementations must return [`ValueUpError::MissingInputFile`] when a
/// table for the requested year does not exist, so callers can tell an
/// absent year apart from a malformed one.
pub trait YearTableSource {
    /// Market-cap table for `year`.
    fn market_caps(&self, year: i32) -> Result<Vec<MarketCapRow>>;

    /// Fundamentals table for `year`.
    fn fundamentals(&self, year: i32) -> Result<Vec<FundamentalRow>>;

    /// Dividend/buyback table covering `year - 1` and `year`.
    fn shareholder_returns(&self, year: i32) -> Result<Vec<ShareholderReturnRow>>;

    /// Industry classification, shared by all years.
    fn industries(&self) -> Result<IndustryMap>;

    /// Load every table needed to screen `year`.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from the individual loaders.
    fn load_year(&self, year: i32) -> Result<YearInputs> {
        Ok(YearInputs {
            year,
            market_caps: self.market_caps(year)?,
            fundamentals_current: self.fundamentals(year)?,
            fundamentals_prior: self.fundamentals(year - 1)?,
            shareholder_returns: self.shareholder_returns(year)?,
            industries: self.industries()?,
            incumbents: None,
        })
    }
}

/// A [`YearTableSource`] backed by in-memory tables.
///
/// Useful for tests and for callers that assemble tables themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    market_caps: BTreeMap<i32, Vec<MarketCapRow>>,
    fundamentals: BTreeMap<i32, Vec<FundamentalRow>>,
    shareholder_returns: BTreeMap<i32, Vec<ShareholderReturnRow>>,
    industries: IndustryMap,
}

impl InMemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the market-cap table for `year`.
    #[must_use]
    pub fn with_market_caps(mut self, year: i32, rows: Vec<MarketCapRow>) -> Self {
        self.market_caps.insert(year, rows);
        self
    }

    /// Sets the fundamentals table for `year`.
    #[must_use]
    pub fn with_fundamentals(mut self, year: i32, rows: Vec<FundamentalRow>) -> Self {
        self.fundamentals.insert(year, rows);
        self
    }

    /// Sets the dividend/buyback table for `year`.
    #[must_use]
    pub fn with_shareholder_returns(mut self, year: i32, rows: Vec<ShareholderReturnRow>) -> Self {
        self.shareholder_returns.insert(year, rows);
        self
    }

    /// Sets the industry map.
    #[must_use]
    pub fn with_industries(mut self, industries: IndustryMap) -> Self {
        self.industries = industries;
        self
    }

    fn lookup<T: Clone>(table: &BTreeMap<i32, Vec<T>>, name: &str, year: i32) -> Result<Vec<T>> {
        table
            .get(&year)
            .cloned()
            .ok_or_else(|| ValueUpError::missing_year_file(PathBuf::from(format!("{name}_{year}")), year))
    }
}

impl YearTableSource for InMemorySource {
    fn market_caps(&self, year: i32) -> Result<Vec<MarketCapRow>> {
        Self::lookup(&self.market_caps, "cap", year)
    }

    fn fundamentals(&self, year: i32) -> Result<Vec<FundamentalRow>> {
        Self::lookup(&self.fundamentals, "fundamentals", year)
    }

    fn shareholder_returns(&self, year: i32) -> Result<Vec<ShareholderReturnRow>> {
        Self::lookup(&self.shareholder_returns, "dividend", year)
    }

    fn industries(&self) -> Result<IndustryMap> {
        Ok(self.industries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Market;

    fn cap_row(code: &str) -> MarketCapRow {
        MarketCapRow {
            code: code.into(),
            name: code.into(),
            market: Market::Kospi,
            avg_market_cap: Some(1.0),
            avg_traded_value: Some(1.0),
        }
    }

    #[test]
    fn test_load_year_needs_prior_fundamentals() {
        let source = InMemorySource::new()
            .with_market_caps(2022, vec![cap_row("005930")])
            .with_fundamentals(2022, Vec::new())
            .with_shareholder_returns(2022, Vec::new());

        let err = source.load_year(2022).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("fundamentals_2021"));

        let source = source.with_fundamentals(2021, Vec::new());
        let inputs = source.load_year(2022).unwrap();
        assert_eq!(inputs.year, 2022);
        assert_eq!(inputs.market_caps.len(), 1);
        assert!(inputs.incumbents.is_none());
    }

    #[test]
    fn test_incumbents() {
        let inputs = YearInputs::empty(2023);
        assert!(!inputs.is_incumbent("005930"));

        let inputs = inputs.with_incumbents(["005930".to_string()].into_iter().collect());
        assert!(inputs.is_incumbent("005930"));
        assert!(!inputs.is_incumbent("000660"));
    }
}
