//! Daily quote tables.
//!
//! Each `marcap-{year}.csv` file holds one row per stock per trading day.
//! Rows with zero volume belong to halted stocks and are dropped on load.

use std::path::Path;

use chrono::Datelike;
use tracing::{debug, info, warn};
use valueup_traits::{DailyQuote, Date, MarketPanel, Result, ValueUpError};

use crate::frame::{floats, read_table, stock_codes, strings};
use crate::layout::DataLayout;

/// Parse `YYYY-MM-DD`, ignoring any time-of-day suffix.
pub fn parse_date(raw: &str) -> Result<Date> {
    let day = raw.trim().get(..10).unwrap_or(raw);
    Date::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| ValueUpError::InvalidDate(format!("Invalid date '{raw}': {e}")))
}

/// Read one daily table, keeping rows dated within `[start, end]`.
///
/// Columns: `Date`, `Code`, `Close`, `Volume`, `Marcap`.
///
/// # Errors
///
/// Returns [`ValueUpError::MissingInputFile`] if the file does not exist and
/// [`ValueUpError::MissingColumn`] if a required column is absent.
pub fn read_daily_table(path: &Path, year: Option<i32>, start: Date, end: Date) -> Result<MarketPanel> {
    let df = read_table(path, year)?;
    let dates = strings(&df, "Date")?;
    let codes = stock_codes(&df, "Code")?;
    let closes = floats(&df, "Close")?;
    let volumes = floats(&df, "Volume")?;
    let caps = floats(&df, "Marcap")?;

    let mut panel = MarketPanel::new();
    let mut halted = 0usize;
    let mut malformed = 0usize;
    for i in 0..df.height() {
        if !volumes[i].is_some_and(|v| v > 0.0) {
            halted += 1;
            continue;
        }
        let date = dates[i].as_deref().map(parse_date).and_then(Result::ok);
        let (Some(date), Some(code)) = (date, codes[i].clone()) else {
            malformed += 1;
            continue;
        };
        if date < start || date > end {
            continue;
        }
        panel.insert(
            date,
            code,
            DailyQuote {
                close: closes[i],
                market_cap: caps[i],
            },
        );
    }

    debug!(
        path = %path.display(),
        days = panel.len(),
        halted,
        malformed,
        "loaded daily quotes"
    );
    Ok(panel)
}

/// Load every daily table overlapping `[start, end]`.
///
/// Years without a file are skipped with a warning.
///
/// # Errors
///
/// Propagates failures other than a missing file.
pub fn load_panel(layout: &DataLayout, start: Date, end: Date) -> Result<MarketPanel> {
    let mut panel = MarketPanel::new();
    for year in start.year()..=end.year() {
        match read_daily_table(&layout.daily_path(year), Some(year), start, end) {
            Ok(part) => panel.extend(part),
            Err(e) if e.is_not_found() => warn!(year, error = %e, "no daily quotes for year"),
            Err(e) => return Err(e),
        }
    }

    info!(%start, %end, days = panel.len(), "market panel loaded");
    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-02").unwrap(), d(2024, 1, 2));
        assert_eq!(parse_date("2024-01-02 00:00:00").unwrap(), d(2024, 1, 2));
        assert!(parse_date("02/01/2024").is_err());
    }

    #[test]
    fn test_load_panel_drops_halted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::with_root(dir.path());
        fs::create_dir_all(dir.path().join("marcap")).unwrap();
        fs::write(
            layout.daily_path(2024),
            "Date,Code,Name,Close,Volume,Marcap\n\
             2024-01-02,005930,Samsung,79600,100,475000\n\
             2024-01-02,000660,SK hynix,140000,0,101000\n\
             2024-01-03,005930,Samsung,77000,120,460000\n\
             2024-02-01,005930,Samsung,75000,120,450000\n",
        )
        .unwrap();

        // 2023 has no file and is skipped
        let panel = load_panel(&layout, d(2023, 12, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.market_cap(d(2024, 1, 2), "005930"), Some(475_000.0));
        assert!(panel.quote(d(2024, 1, 2), "000660").is_none());
        assert!(!panel.has_date(d(2024, 2, 1)));
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Date,Code,Close\n2024-01-02,005930,1\n").unwrap();
        let err = read_daily_table(&path, None, d(2024, 1, 1), d(2024, 12, 31)).unwrap_err();
        assert!(matches!(err, ValueUpError::MissingColumn(_)));
    }
}
