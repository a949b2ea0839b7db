//! Where the input tables live under a data root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File layout of the input data.
///
/// Directory and file names are relative to `root`. Yearly file names use
/// `{year}` as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayout {
    /// Data root directory
    pub root: PathBuf,
    /// Yearly market-cap tables
    pub market_cap: String,
    /// Yearly fundamentals tables
    pub fundamentals: String,
    /// Yearly dividend and buyback tables
    pub dividends: String,
    /// Static stock code to industry mapping
    pub metadata: String,
    /// Yearly daily-quote tables
    pub daily: String,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Data/ValueUp"),
            market_cap: "1.marketcap/cap_{year}.csv".to_string(),
            fundamentals: "2.fundamentals/fundamentals_{year}_modified.csv".to_string(),
            dividends: "3.dividend/dividend_{year}.csv".to_string(),
            metadata: "metadata.csv".to_string(),
            daily: "marcap/marcap-{year}.csv".to_string(),
        }
    }
}

impl DataLayout {
    /// Default layout under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    fn yearly(&self, template: &str, year: i32) -> PathBuf {
        self.root.join(template.replace("{year}", &year.to_string()))
    }

    /// Market-cap table for `year`.
    pub fn market_cap_path(&self, year: i32) -> PathBuf {
        self.yearly(&self.market_cap, year)
    }

    /// Fundamentals table for `year`.
    pub fn fundamentals_path(&self, year: i32) -> PathBuf {
        self.yearly(&self.fundamentals, year)
    }

    /// Dividend and buyback table for `year`.
    pub fn dividends_path(&self, year: i32) -> PathBuf {
        self.yearly(&self.dividends, year)
    }

    /// Industry metadata table.
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(&self.metadata)
    }

    /// Daily-quote table for `year`.
    pub fn daily_path(&self, year: i32) -> PathBuf {
        self.yearly(&self.daily, year)
    }

    /// Data root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
