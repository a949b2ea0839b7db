//! Pipeline configuration for the CLI.
//!
//! Every section defaults to the published methodology; a JSON file only
//! needs the fields it changes.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use valueup_data::DataLayout;
use valueup_eval::{
    Benchmark, ComparisonConfig, IndexConfig, PortfolioConfig, ScheduleConfig, default_benchmarks,
};
use valueup_screen::ScreeningConfig;

/// Selection years to screen, inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct YearRange {
    pub(crate) first: i32,
    pub(crate) last: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            first: 2020,
            last: 2023,
        }
    }
}

impl YearRange {
    pub(crate) const fn years(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }
}

/// Everything a pipeline run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PipelineConfig {
    pub(crate) data: DataLayout,
    pub(crate) output_dir: PathBuf,
    pub(crate) years: YearRange,
    pub(crate) screening: ScreeningConfig,
    pub(crate) schedule: ScheduleConfig,
    pub(crate) index: IndexConfig,
    pub(crate) portfolio: PortfolioConfig,
    pub(crate) comparison: ComparisonConfig,
    pub(crate) benchmarks: Vec<Benchmark>,
    /// Directory of `{name}.csv` files with `Date,Close`; fetched over HTTP
    /// when unset.
    pub(crate) benchmark_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data: DataLayout::default(),
            output_dir: PathBuf::from("."),
            years: YearRange::default(),
            screening: ScreeningConfig::default(),
            schedule: ScheduleConfig::default(),
            index: IndexConfig::default(),
            portfolio: PortfolioConfig::default(),
            comparison: ComparisonConfig::default(),
            benchmarks: default_benchmarks(),
            benchmark_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults, overlaid with `path` when given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.years.first > self.years.last {
            bail!(
                "First year {} is after last year {}",
                self.years.first,
                self.years.last
            );
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub(crate) fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(root) = data_dir {
            self.data.root = root;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        self
    }

    pub(crate) fn index_path(&self) -> PathBuf {
        self.output_dir.join("value_up_index_result.csv")
    }

    pub(crate) fn portfolio_path(&self) -> PathBuf {
        self.output_dir.join("value_up_portfolio_result.csv")
    }

    pub(crate) fn comparison_path(&self) -> PathBuf {
        self.output_dir.join("value_up_comparison.csv")
    }
}
