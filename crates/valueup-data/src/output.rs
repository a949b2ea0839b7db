//! Result files: constituent lists, level series and comparison tables.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;
use valueup_eval::{Comparison, PerformanceSummary};
use valueup_traits::{Candidate, ConstituentSet, Market, Result, TimeSeries};

use crate::frame::{floats, has_column, read_table, stock_codes, strings, write_table};
use crate::panel::parse_date;

/// File name of the constituent list for a selection year.
pub fn constituents_file_name(year: i32) -> String {
    format!("value_up_constituents_{year}.csv")
}

/// Write the constituent list for `set.year()` into `dir`.
///
/// An empty set still produces a file with the header row.
///
/// # Returns
///
/// The path written.
pub fn write_constituents(dir: &Path, set: &ConstituentSet) -> Result<PathBuf> {
    let members = set.members();
    let text = |f: fn(&Candidate) -> String| members.iter().map(f).collect::<Vec<_>>();
    let number = |f: fn(&Candidate) -> Option<f64>| members.iter().map(f).collect::<Vec<_>>();

    let mut df = df! {
        "stockcode" => text(|c| c.code.clone()),
        "Name" => text(|c| c.name.clone()),
        "Market" => text(|c| c.market.to_string()),
        "gics" => text(|c| c.industry.clone().unwrap_or_default()),
        "avg_marcap" => number(|c| c.avg_market_cap),
        "avg_amount" => number(|c| c.avg_traded_value),
        "EPS" => number(|c| c.eps_current),
        "EPS_prev" => number(|c| c.eps_prior),
        "shareholder_return" => members.iter().map(|c| c.shareholder_return).collect::<Vec<_>>(),
        "avg_PBR" => number(|c| c.avg_pbr),
        "pbr_rank_ratio" => number(|c| c.pbr_rank_ratio),
        "industry_pbr_rank_ratio" => number(|c| c.industry_pbr_rank_ratio),
        "avg_ROE" => number(|c| c.avg_roe),
        "industry_roe_rank" => number(|c| c.industry_roe_rank),
    }?;

    let path = dir.join(constituents_file_name(set.year()));
    write_table(&path, &mut df)?;
    info!(year = set.year(), constituents = set.len(), path = %path.display(), "wrote constituents");
    Ok(path)
}

/// Read a constituent list written by [`write_constituents`].
///
/// Only `stockcode` is required; other known columns are read when present.
///
/// # Errors
///
/// Returns [`valueup_traits::ValueUpError::MissingInputFile`] if the file is
/// absent.
pub fn read_constituents(path: &Path, year: i32) -> Result<ConstituentSet> {
    let df = read_table(path, Some(year))?;
    let codes = stock_codes(&df, "stockcode")?;
    let height = codes.len();

    let text = |name: &str| -> Result<Vec<Option<String>>> {
        if has_column(&df, name) {
            strings(&df, name)
        } else {
            Ok(vec![None; height])
        }
    };
    let number = |name: &str| -> Result<Vec<Option<f64>>> {
        if has_column(&df, name) {
            floats(&df, name)
        } else {
            Ok(vec![None; height])
        }
    };

    let names = text("Name")?;
    let markets = text("Market")?;
    let industries = text("gics")?;
    let caps = number("avg_marcap")?;
    let amounts = number("avg_amount")?;
    let avg_pbr = number("avg_PBR")?;
    let avg_roe = number("avg_ROE")?;
    let roe_rank = number("industry_roe_rank")?;

    let members = codes
        .into_iter()
        .enumerate()
        .filter_map(|(i, code)| {
            let code = code?;
            let market = markets[i]
                .as_deref()
                .and_then(|m| m.parse::<Market>().ok())
                .unwrap_or(Market::Kospi);
            let mut candidate =
                Candidate::new(code, names[i].clone().unwrap_or_default(), market);
            candidate.industry = industries[i].clone();
            candidate.avg_market_cap = caps[i];
            candidate.avg_traded_value = amounts[i];
            candidate.avg_pbr = avg_pbr[i];
            candidate.avg_roe = avg_roe[i];
            candidate.industry_roe_rank = roe_rank[i];
            Some(candidate)
        })
        .collect();

    Ok(ConstituentSet::new(year, members))
}

/// Write a `Date,<value_column>` series.
pub fn write_series(path: &Path, series: &TimeSeries, value_column: &str) -> Result<()> {
    let dates: Vec<String> = series
        .dates()
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();
    let mut df = DataFrame::new(vec![
        Column::new("Date".into(), dates),
        Column::new(value_column.into(), series.values()),
    ])?;
    write_table(path, &mut df)?;
    info!(path = %path.display(), rows = series.len(), "wrote series");
    Ok(())
}

/// Read a `Date,<value_column>` series, skipping rows without a value.
///
/// # Errors
///
/// Returns an error if the file or a column is missing, or a date cannot be
/// parsed.
pub fn read_series(path: &Path, value_column: &str) -> Result<TimeSeries> {
    let df = read_table(path, None)?;
    let dates = strings(&df, "Date")?;
    let values = floats(&df, value_column)?;

    let mut series = TimeSeries::new();
    for (date, value) in dates.into_iter().zip(values) {
        if let (Some(date), Some(value)) = (date, value) {
            series.insert(parse_date(&date)?, value);
        }
    }
    Ok(series)
}

/// Write the comparison table with percentages.
pub fn write_comparison(path: &Path, comparison: &Comparison) -> Result<()> {
    let pct = |f: fn(&PerformanceSummary) -> f64| {
        comparison
            .rows
            .iter()
            .map(|r| f(&r.summary) * 100.0)
            .collect::<Vec<_>>()
    };

    let mut df = df! {
        "series" => comparison.rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
        "total_return_pct" => pct(|s| s.total_return),
        "annualized_return_pct" => pct(|s| s.annualized_return),
        "annualized_volatility_pct" => pct(|s| s.annualized_volatility),
    }?;
    write_table(path, &mut df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;
    use valueup_eval::{BenchmarkComparator, ComparisonConfig};
    use valueup_traits::Date;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn member(code: &str, industry: &str, cap: f64) -> Candidate {
        let mut c = Candidate::new(code, format!("Co {code}"), Market::Kosdaq);
        c.industry = Some(industry.to_string());
        c.avg_market_cap = Some(cap);
        c.avg_roe = Some(0.12);
        c.shareholder_return = true;
        c
    }

    #[test]
    fn test_constituents_round_trip_keeps_codes() {
        let dir = tempfile::tempdir().unwrap();
        let set = ConstituentSet::new(
            2023,
            vec![member("005930", "IT", 4.0e14), member("000660", "IT", 9.0e13)],
        );

        let path = write_constituents(dir.path(), &set).unwrap();
        assert!(path.ends_with("value_up_constituents_2023.csv"));

        let read = read_constituents(&path, 2023).unwrap();
        assert_eq!(read.year(), 2023);
        assert_eq!(read.codes().collect::<Vec<_>>(), vec!["005930", "000660"]);
        assert_eq!(read.members()[0].market, Market::Kosdaq);
        assert_eq!(read.members()[1].industry.as_deref(), Some("IT"));
        assert_relative_eq!(read.members()[0].avg_roe.unwrap(), 0.12, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_set_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_constituents(dir.path(), &ConstituentSet::empty(2024)).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("stockcode,Name,Market,gics"));
        assert!(read_constituents(&path, 2024).unwrap().is_empty());
    }

    #[test]
    fn test_series_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("value_up_index_result.csv");
        let series: TimeSeries = [(d(2024, 1, 2), 1000.0), (d(2024, 1, 3), 1012.5)]
            .into_iter()
            .collect();

        write_series(&path, &series, "Index").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Date,Index\n2024-01-02,"));

        let read = read_series(&path, "Index").unwrap();
        assert_eq!(read.len(), 2);
        assert_relative_eq!(read.get(d(2024, 1, 3)).unwrap(), 1012.5, epsilon = 1e-9);
    }

    #[test]
    fn test_read_benchmark_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kospi.csv");
        fs::write(&path, "Date,Close\n2024-01-02,2669.81\n2024-01-03,\n2024-01-04,2587.02\n").unwrap();

        let closes = read_series(&path, "Close").unwrap();
        assert_eq!(closes.len(), 2);
        assert!(read_series(&path, "Index").is_err());
    }

    #[test]
    fn test_write_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let levels: TimeSeries = [(d(2024, 1, 2), 1000.0), (d(2024, 1, 3), 1100.0)]
            .into_iter()
            .collect();
        let comparator = BenchmarkComparator::new(ComparisonConfig::default());
        let comparison = comparator.compare("Value-Up", &levels, &[]).unwrap();

        let path = dir.path().join("value_up_comparison.csv");
        write_comparison(&path, &comparison).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("series,total_return_pct,annualized_return_pct,annualized_volatility_pct")
        );
        assert!(lines.next().unwrap().starts_with("Value-Up,10"));
    }
}
