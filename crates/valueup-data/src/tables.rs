//! Row parsers for the yearly screening tables.
//!
//! Rows without a usable stock code are skipped; the count is logged.

use polars::prelude::DataFrame;
use tracing::debug;
use valueup_traits::{
    FundamentalRow, IndustryMap, Market, MarketCapRow, Result, ShareholderReturnFlags,
    ShareholderReturnRow,
};

use crate::frame::{flags, floats, stock_codes, strings};

/// Rows of a `cap_{year}.csv` table.
///
/// Columns: `stockcode`, `Name`, `Market`, `avg_marcap`, `avg_amount`.
/// Rows with an unknown market segment are skipped.
pub fn market_cap_rows(df: &DataFrame) -> Result<Vec<MarketCapRow>> {
    let codes = stock_codes(df, "stockcode")?;
    let names = strings(df, "Name")?;
    let markets = strings(df, "Market")?;
    let caps = floats(df, "avg_marcap")?;
    let amounts = floats(df, "avg_amount")?;

    let mut rows = Vec::with_capacity(codes.len());
    let mut skipped = 0usize;
    for i in 0..codes.len() {
        let market = markets[i].as_deref().and_then(|m| m.parse::<Market>().ok());
        let (Some(code), Some(market)) = (codes[i].clone(), market) else {
            skipped += 1;
            continue;
        };
        rows.push(MarketCapRow {
            code,
            name: names[i].clone().unwrap_or_default(),
            market,
            avg_market_cap: caps[i],
            avg_traded_value: amounts[i],
        });
    }

    if skipped > 0 {
        debug!(skipped, "market-cap rows without code or market");
    }
    Ok(rows)
}

/// Rows of a `fundamentals_{year}_modified.csv` table.
///
/// Columns: `stockcode`, `EPS`, `BPS`, `PBR`.
pub fn fundamental_rows(df: &DataFrame) -> Result<Vec<FundamentalRow>> {
    let codes = stock_codes(df, "stockcode")?;
    let eps = floats(df, "EPS")?;
    let bps = floats(df, "BPS")?;
    let pbr = floats(df, "PBR")?;

    Ok(codes
        .into_iter()
        .enumerate()
        .filter_map(|(i, code)| {
            code.map(|code| FundamentalRow {
                code,
                eps: eps[i],
                bps: bps[i],
                pbr: pbr[i],
            })
        })
        .collect())
}

/// Rows of a `dividend_{year}.csv` table.
///
/// Columns: `stockcode`, `{year-1}_배당`, `{year-1}_자사주`, `{year}_배당`,
/// `{year}_자사주`. Blank and `NaN` flags read as false.
pub fn shareholder_return_rows(df: &DataFrame, year: i32) -> Result<Vec<ShareholderReturnRow>> {
    let prior = year - 1;
    let codes = stock_codes(df, "stockcode")?;
    let dividend_prior = flags(df, &format!("{prior}_배당"))?;
    let buyback_prior = flags(df, &format!("{prior}_자사주"))?;
    let dividend_current = flags(df, &format!("{year}_배당"))?;
    let buyback_current = flags(df, &format!("{year}_자사주"))?;

    Ok(codes
        .into_iter()
        .enumerate()
        .filter_map(|(i, code)| {
            code.map(|code| ShareholderReturnRow {
                code,
                flags: ShareholderReturnFlags {
                    dividend_prior: dividend_prior[i],
                    buyback_prior: buyback_prior[i],
                    dividend_current: dividend_current[i],
                    buyback_current: buyback_current[i],
                },
            })
        })
        .collect())
}

/// Stock code to industry mapping from `metadata.csv`.
///
/// Columns: `stockcode`, `gics`. Rows with a blank industry are left out;
/// the first row for a code wins.
pub fn industry_map(df: &DataFrame) -> Result<IndustryMap> {
    let codes = stock_codes(df, "stockcode")?;
    let industries = strings(df, "gics")?;

    let mut map = IndustryMap::new();
    for (code, industry) in codes.into_iter().zip(industries) {
        if let (Some(code), Some(industry)) = (code, industry) {
            map.entry(code).or_insert(industry);
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_market_cap_rows() {
        let df = df! {
            "stockcode" => ["5930", "A000660", "", "123456"],
            "Name" => ["Samsung", "SK hynix", "Nobody", "Odd"],
            "Market" => ["KOSPI", "KOSDAQ GLOBAL", "KOSPI", "NYSE"],
            "avg_marcap" => ["400000", "", "1", "1"],
            "avg_amount" => ["1000", "500", "1", "1"],
        }
        .unwrap();

        let rows = market_cap_rows(&df).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "005930");
        assert_eq!(rows[0].avg_market_cap, Some(400_000.0));
        assert_eq!(rows[1].market, Market::Kosdaq);
        assert_eq!(rows[1].avg_market_cap, None);
    }

    #[test]
    fn test_shareholder_return_rows() {
        let df = df! {
            "stockcode" => ["000001", "000002"],
            "2022_배당" => ["True", "False"],
            "2022_자사주" => ["False", "NaN"],
            "2023_배당" => ["False", "True"],
            "2023_자사주" => ["True", "False"],
        }
        .unwrap();

        let rows = shareholder_return_rows(&df, 2023).unwrap();
        assert!(rows[0].flags.returned_both_years());
        assert!(!rows[1].flags.returned_both_years());
        assert!(shareholder_return_rows(&df, 2024).is_err());
    }

    #[test]
    fn test_industry_map() {
        let df = df! {
            "stockcode" => ["1", "2", "1"],
            "gics" => ["Materials", "", "Energy"],
        }
        .unwrap();

        let map = industry_map(&df).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["000001"], "Materials");
    }
}
