//! Common types used throughout the Value-Up pipeline.
//!
//! This module defines the per-company rows read from the yearly input
//! tables, the joined [`Candidate`] that flows through the screening funnel,
//! the yearly [`ConstituentSet`] and the daily [`MarketPanel`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValueUpError;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A KRX stock identifier, always six zero-padded digits (e.g. `"005930"`).
pub type StockCode = String;

/// Width of a normalized stock code.
pub const STOCK_CODE_WIDTH: usize = 6;

/// Normalize a raw stock identifier.
///
/// Upstream files carry codes as `A005930`, `5930`, `005930` or `5930.0`
/// depending on how they were exported. The leading `A` is stripped, a
/// trailing `.0` is dropped and the digits are left-padded to six places.
/// Returns `None` when nothing usable remains.
///
/// # Example
///
/// ```
/// use valueup_traits::normalize_stock_code;
///
/// assert_eq!(normalize_stock_code("A005930").as_deref(), Some("005930"));
/// assert_eq!(normalize_stock_code("660").as_deref(), Some("000660"));
/// ```
#[must_use]
pub fn normalize_stock_code(raw: &str) -> Option<StockCode> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('A').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(format!("{:0>width$}", trimmed, width = STOCK_CODE_WIDTH))
}

/// Exchange segment a company is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Market {
    /// KOSPI main board.
    Kospi,
    /// KOSDAQ (including KOSDAQ GLOBAL).
    Kosdaq,
    /// KONEX, the start-up board.
    Konex,
}

impl Market {
    /// Canonical upper-case name as it appears in KRX exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Kospi => "KOSPI",
            Self::Kosdaq => "KOSDAQ",
            Self::Konex => "KONEX",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ValueUpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KOSPI" => Ok(Self::Kospi),
            "KOSDAQ" | "KOSDAQ GLOBAL" => Ok(Self::Kosdaq),
            "KONEX" => Ok(Self::Konex),
            other => Err(ValueUpError::InvalidData(format!(
                "Unknown market segment: '{other}'"
            ))),
        }
    }
}

/// One row of the yearly market-cap table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapRow {
    /// Normalized stock code.
    pub code: StockCode,
    /// Company name.
    pub name: String,
    /// Listing segment.
    pub market: Market,
    /// Daily average market capitalization over the year, in KRW.
    pub avg_market_cap: Option<f64>,
    /// Daily average traded value over the year, in KRW.
    pub avg_traded_value: Option<f64>,
}

/// Per-share fundamentals for one company and one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRow {
    /// Normalized stock code.
    pub code: StockCode,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Book value per share.
    pub bps: Option<f64>,
    /// Price-to-book ratio.
    pub pbr: Option<f64>,
}

/// Dividend and buyback activity for the two fiscal years ending in a
/// table's year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholderReturnFlags {
    /// Dividend paid in the prior year.
    pub dividend_prior: bool,
    /// Shares bought back in the prior year.
    pub buyback_prior: bool,
    /// Dividend paid in the current year.
    pub dividend_current: bool,
    /// Shares bought back in the current year.
    pub buyback_current: bool,
}

impl ShareholderReturnFlags {
    /// Some form of return to shareholders in each of the two years.
    ///
    /// The mechanism may differ between years.
    #[must_use]
    pub const fn returned_both_years(&self) -> bool {
        (self.dividend_prior || self.buyback_prior)
            && (self.dividend_current || self.buyback_current)
    }
}

/// One row of the yearly dividend/buyback table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholderReturnRow {
    /// Normalized stock code.
    pub code: StockCode,
    /// Activity flags.
    pub flags: ShareholderReturnFlags,
}

/// Static stock code → industry classification mapping.
pub type IndustryMap = BTreeMap<StockCode, String>;

/// A company as it moves through the screening funnel.
///
/// Stage 1 fills the ranking fields, stage 2 the fundamentals and the
/// two-year averages, stage 3 the PBR rank ratios and stage 4 the
/// industry ROE rank. Fields a stage has not reached yet are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Normalized stock code.
    pub code: StockCode,
    /// Company name.
    pub name: String,
    /// Listing segment.
    pub market: Market,
    /// Industry classification, joined in stage 2.
    pub industry: Option<String>,
    /// Daily average market capitalization.
    pub avg_market_cap: Option<f64>,
    /// Daily average traded value.
    pub avg_traded_value: Option<f64>,
    /// Market-cap rank, 1 = largest.
    pub cap_rank: Option<f64>,
    /// Traded-value percentile rank in (0, 1].
    pub traded_value_percentile: Option<f64>,
    /// EPS for the screening year.
    pub eps_current: Option<f64>,
    /// EPS for the year before.
    pub eps_prior: Option<f64>,
    /// BPS for the screening year.
    pub bps_current: Option<f64>,
    /// BPS for the year before.
    pub bps_prior: Option<f64>,
    /// PBR for the screening year.
    pub pbr_current: Option<f64>,
    /// PBR for the year before.
    pub pbr_prior: Option<f64>,
    /// Two consecutive profitable years.
    pub profit_positive: bool,
    /// Shareholder return in both years.
    pub shareholder_return: bool,
    /// Two-year average PBR.
    pub avg_pbr: Option<f64>,
    /// Two-year average ROE, from EPS/BPS.
    pub avg_roe: Option<f64>,
    /// Percentile rank of `avg_pbr` across all candidates (ascending).
    pub pbr_rank_ratio: Option<f64>,
    /// Percentile rank of `avg_pbr` within the industry (ascending).
    pub industry_pbr_rank_ratio: Option<f64>,
    /// Rank of `avg_roe` within the industry, 1 = highest.
    pub industry_roe_rank: Option<f64>,
}

impl Candidate {
    /// Create a candidate with only the identifying fields set.
    pub fn new(code: impl Into<StockCode>, name: impl Into<String>, market: Market) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            market,
            industry: None,
            avg_market_cap: None,
            avg_traded_value: None,
            cap_rank: None,
            traded_value_percentile: None,
            eps_current: None,
            eps_prior: None,
            bps_current: None,
            bps_prior: None,
            pbr_current: None,
            pbr_prior: None,
            profit_positive: false,
            shareholder_return: false,
            avg_pbr: None,
            avg_roe: None,
            pbr_rank_ratio: None,
            industry_pbr_rank_ratio: None,
            industry_roe_rank: None,
        }
    }
}

impl From<&MarketCapRow> for Candidate {
    fn from(row: &MarketCapRow) -> Self {
        Self {
            avg_market_cap: row.avg_market_cap,
            avg_traded_value: row.avg_traded_value,
            ..Self::new(row.code.clone(), row.name.clone(), row.market)
        }
    }
}

/// The funnel's output for one selection year.
///
/// `year` is the fundamentals year the set was chosen from. With the
/// default one-year selection lag the set is invested during `year + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentSet {
    year: i32,
    members: Vec<Candidate>,
}

impl ConstituentSet {
    /// Creates a new set for a selection year.
    pub const fn new(year: i32, members: Vec<Candidate>) -> Self {
        Self { year, members }
    }

    /// An empty set, produced when a year's inputs are missing.
    pub const fn empty(year: i32) -> Self {
        Self::new(year, Vec::new())
    }

    /// Selection year.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Members in funnel output order.
    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    /// Number of constituents.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no constituents.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates over constituent stock codes.
    pub fn codes(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|c| c.code.as_str())
    }

    /// Stock codes as an ordered set.
    pub fn code_set(&self) -> BTreeSet<StockCode> {
        self.codes().map(str::to_string).collect()
    }

    /// Whether `code` is a constituent.
    pub fn contains(&self, code: &str) -> bool {
        self.members.iter().any(|c| c.code == code)
    }
}

/// One stock's quote on one trading day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyQuote {
    /// Closing price.
    pub close: Option<f64>,
    /// Closing market capitalization.
    pub market_cap: Option<f64>,
}

/// Daily price and market-value table keyed by (date, stock code).
#[derive(Debug, Clone, Default)]
pub struct MarketPanel {
    days: BTreeMap<Date, HashMap<StockCode, DailyQuote>>,
}

impl MarketPanel {
    /// Creates an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a quote.
    pub fn insert(&mut self, date: Date, code: impl Into<StockCode>, quote: DailyQuote) {
        self.days.entry(date).or_default().insert(code.into(), quote);
    }

    /// Merges another panel into this one; `other` wins on conflicts.
    pub fn extend(&mut self, other: Self) {
        for (date, quotes) in other.days {
            self.days.entry(date).or_default().extend(quotes);
        }
    }

    /// Number of trading days with at least one quote.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the panel has no quotes.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Trading days in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.days.keys().copied()
    }

    /// Whether any quote exists for `date`.
    pub fn has_date(&self, date: Date) -> bool {
        self.days.contains_key(&date)
    }

    /// Quote for one stock on one day.
    pub fn quote(&self, date: Date, code: &str) -> Option<&DailyQuote> {
        self.days.get(&date).and_then(|d| d.get(code))
    }

    /// Market capitalization for one stock on one day.
    pub fn market_cap(&self, date: Date, code: &str) -> Option<f64> {
        self.quote(date, code).and_then(|q| q.market_cap)
    }

    /// Closing price for one stock on one day.
    pub fn close(&self, date: Date, code: &str) -> Option<f64> {
        self.quote(date, code).and_then(|q| q.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_stock_code() {
        assert_eq!(normalize_stock_code("A005930").as_deref(), Some("005930"));
        assert_eq!(normalize_stock_code("5930").as_deref(), Some("005930"));
        assert_eq!(normalize_stock_code(" 000660 ").as_deref(), Some("000660"));
        assert_eq!(normalize_stock_code("5930.0").as_deref(), Some("005930"));
        assert_eq!(normalize_stock_code(""), None);
        assert_eq!(normalize_stock_code("NaN"), None);
        assert_eq!(normalize_stock_code("12-34"), None);
    }

    #[test]
    fn test_market_parse() {
        assert_eq!("KOSPI".parse::<Market>().unwrap(), Market::Kospi);
        assert_eq!("kosdaq".parse::<Market>().unwrap(), Market::Kosdaq);
        assert_eq!("KOSDAQ GLOBAL".parse::<Market>().unwrap(), Market::Kosdaq);
        assert_eq!("KONEX".parse::<Market>().unwrap(), Market::Konex);
        assert!("NYSE".parse::<Market>().is_err());
        assert_eq!(Market::Kosdaq.to_string(), "KOSDAQ");
    }

    #[test]
    fn test_shareholder_return_mixed_mechanisms() {
        let flags = ShareholderReturnFlags {
            dividend_prior: true,
            buyback_prior: false,
            dividend_current: false,
            buyback_current: true,
        };
        assert!(flags.returned_both_years());

        let flags = ShareholderReturnFlags {
            dividend_prior: false,
            buyback_prior: false,
            dividend_current: true,
            buyback_current: true,
        };
        assert!(!flags.returned_both_years());
    }

    #[test]
    fn test_candidate_from_market_cap_row() {
        let row = MarketCapRow {
            code: "005930".into(),
            name: "Samsung Electronics".into(),
            market: Market::Kospi,
            avg_market_cap: Some(4.0e14),
            avg_traded_value: Some(1.0e12),
        };
        let candidate = Candidate::from(&row);
        assert_eq!(candidate.code, "005930");
        assert_eq!(candidate.avg_market_cap, Some(4.0e14));
        assert!(candidate.industry.is_none());
        assert!(!candidate.profit_positive);
    }

    #[test]
    fn test_constituent_set() {
        let set = ConstituentSet::new(
            2022,
            vec![
                Candidate::new("000660", "SK hynix", Market::Kospi),
                Candidate::new("005930", "Samsung Electronics", Market::Kospi),
            ],
        );
        assert_eq!(set.year(), 2022);
        assert_eq!(set.len(), 2);
        assert!(set.contains("005930"));
        assert!(!set.contains("035420"));
        assert!(ConstituentSet::empty(2022).is_empty());
    }

    #[test]
    fn test_market_panel_lookup() {
        let d = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let mut panel = MarketPanel::new();
        panel.insert(
            d,
            "005930",
            DailyQuote {
                close: Some(79_600.0),
                market_cap: Some(4.75e14),
            },
        );
        assert_eq!(panel.len(), 1);
        assert_eq!(panel.close(d, "005930"), Some(79_600.0));
        assert_eq!(panel.market_cap(d, "000660"), None);
        assert!(panel.has_date(d));
    }
}
