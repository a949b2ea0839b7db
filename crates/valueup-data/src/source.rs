//! File-backed [`YearTableSource`].

use valueup_traits::{
    FundamentalRow, IndustryMap, MarketCapRow, Result, ShareholderReturnRow, YearTableSource,
};

use crate::frame::read_table;
use crate::layout::DataLayout;
use crate::tables::{fundamental_rows, industry_map, market_cap_rows, shareholder_return_rows};

/// Reads the yearly screening tables from CSV files.
///
/// # Example
///
/// ```rust,ignore
/// use valueup_data::{CsvTableSource, DataLayout};
/// use valueup_screen::Funnel;
///
/// let source = CsvTableSource::new(DataLayout::with_root("Data/ValueUp"));
/// let run = Funnel::default().screen_years(&source, 2020..=2023);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvTableSource {
    layout: DataLayout,
}

impl CsvTableSource {
    /// Create a source over `layout`.
    pub const fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// The file layout.
    #[must_use]
    pub const fn layout(&self) -> &DataLayout {
        &self.layout
    }
}

impl YearTableSource for CsvTableSource {
    fn market_caps(&self, year: i32) -> Result<Vec<MarketCapRow>> {
        let df = read_table(&self.layout.market_cap_path(year), Some(year))?;
        market_cap_rows(&df)
    }

    fn fundamentals(&self, year: i32) -> Result<Vec<FundamentalRow>> {
        let df = read_table(&self.layout.fundamentals_path(year), Some(year))?;
        fundamental_rows(&df)
    }

    fn shareholder_returns(&self, year: i32) -> Result<Vec<ShareholderReturnRow>> {
        let df = read_table(&self.layout.dividends_path(year), Some(year))?;
        shareholder_return_rows(&df, year)
    }

    fn industries(&self) -> Result<IndustryMap> {
        let df = read_table(&self.layout.metadata_path(), None)?;
        industry_map(&df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use valueup_traits::ValueUpError;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn fixture(root: &Path) {
        write(
            root,
            "1.marketcap/cap_2023.csv",
            "stockcode,Name,Market,avg_marcap,avg_amount\n5930,Samsung,KOSPI,400000,1000\n660,SK hynix,KOSPI,90000,800\n",
        );
        write(
            root,
            "2.fundamentals/fundamentals_2023_modified.csv",
            "stockcode,EPS,BPS,PBR\n005930,5,50,1.1\n000660,-2,40,1.5\n",
        );
        write(
            root,
            "2.fundamentals/fundamentals_2022_modified.csv",
            "stockcode,EPS,BPS,PBR\n005930,4,45,1.0\n000660,3,38,1.2\n",
        );
        write(
            root,
            "3.dividend/dividend_2023.csv",
            "stockcode,2022_배당,2022_자사주,2023_배당,2023_자사주\n005930,True,False,True,False\n000660,False,False,NaN,True\n",
        );
        write(root, "metadata.csv", "stockcode,gics\n005930,IT\n000660,IT\n");
    }

    #[test]
    fn test_load_year() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        let source = CsvTableSource::new(DataLayout::with_root(dir.path()));

        let inputs = source.load_year(2023).unwrap();
        assert_eq!(inputs.market_caps.len(), 2);
        assert_eq!(inputs.market_caps[1].code, "000660");
        assert_eq!(inputs.fundamentals_current[1].eps, Some(-2.0));
        assert_eq!(inputs.fundamentals_prior[0].pbr, Some(1.0));
        assert!(inputs.shareholder_returns[0].flags.returned_both_years());
        assert!(!inputs.shareholder_returns[1].flags.returned_both_years());
        assert_eq!(inputs.industries.len(), 2);
    }

    #[test]
    fn test_missing_year_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        let source = CsvTableSource::new(DataLayout::with_root(dir.path()));

        let err = source.load_year(2024).unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            ValueUpError::MissingInputFile { year: Some(2024), .. }
        ));
    }
}
