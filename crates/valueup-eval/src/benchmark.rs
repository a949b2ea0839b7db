//! Comparison of a computed series against benchmark indices.
//!
//! Benchmark closes are forward-filled onto the computed series' dates,
//! rebased to the same value at the same anchor and summarised with the
//! same annualization convention. Reporting only.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use valueup_traits::{Date, Result, TimeSeries};

use crate::metrics::{Annualization, PerformanceSummary};

/// A benchmark index and the symbol its closes are fetched under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Display name
    pub name: String,
    /// Market-data symbol
    pub symbol: String,
}

impl Benchmark {
    /// Create a benchmark.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// KOSPI, KOSDAQ and KOSPI 200.
#[must_use]
pub fn default_benchmarks() -> Vec<Benchmark> {
    vec![
        Benchmark::new("KOSPI", "^KS11"),
        Benchmark::new("KOSDAQ", "^KQ11"),
        Benchmark::new("KOSPI200", "^KS200"),
    ]
}

/// Comparison configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Date at which every series reads `base_value`
    pub anchor: Date,
    /// Common level at the anchor
    pub base_value: f64,
    /// Annualization convention for the summaries
    pub annualization: Annualization,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            anchor: Date::from_ymd_opt(2024, 1, 2).unwrap_or(Date::MIN),
            base_value: 1000.0,
            annualization: Annualization::default(),
        }
    }
}

/// One line of the comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Series name
    pub name: String,
    /// Summary statistics
    pub summary: PerformanceSummary,
}

/// Output of [`BenchmarkComparator::compare`].
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    /// Rebased series, target first, then benchmarks in input order
    pub series: Vec<(String, TimeSeries)>,
    /// Summaries in the same order
    pub rows: Vec<ComparisonRow>,
}

impl Comparison {
    /// Summary row for `name`.
    pub fn row(&self, name: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// Aligns and summarises series against a target.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkComparator {
    config: ComparisonConfig,
}

impl BenchmarkComparator {
    /// Create a comparator.
    pub const fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Forward-fill `benchmark` onto `dates` and rebase it at the anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the aligned series has no usable value on or
    /// after the anchor.
    pub fn align(&self, benchmark: &TimeSeries, dates: &[Date]) -> Result<TimeSeries> {
        let filled = benchmark.forward_fill(dates);
        let (rebased, _) = filled.rebase(self.config.anchor, self.config.base_value)?;
        Ok(rebased)
    }

    /// Compare `target` with each benchmark.
    ///
    /// Benchmarks that cannot be aligned or summarised are skipped with a
    /// warning.
    ///
    /// # Arguments
    ///
    /// * `target_name` - Label for the computed series
    /// * `target` - Index levels or cumulative returns
    /// * `benchmarks` - Named benchmark closes
    ///
    /// # Errors
    ///
    /// Returns an error if the target itself cannot be rebased or
    /// summarised.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use valueup_eval::{BenchmarkComparator, ComparisonConfig};
    ///
    /// let comparator = BenchmarkComparator::new(ComparisonConfig::default());
    /// let comparison = comparator.compare("Value-Up", &levels, &closes)?;
    /// for row in &comparison.rows {
    ///     println!("{}: {:.2}%", row.name, row.summary.total_return * 100.0);
    /// }
    /// ```
    pub fn compare(
        &self,
        target_name: &str,
        target: &TimeSeries,
        benchmarks: &[(String, TimeSeries)],
    ) -> Result<Comparison> {
        let (target, anchor_used) = target.rebase(self.config.anchor, self.config.base_value)?;
        let summary = PerformanceSummary::calculate(&target, &self.config.annualization)?;
        let dates = target.dates();

        let mut comparison = Comparison::default();
        comparison.rows.push(ComparisonRow {
            name: target_name.to_string(),
            summary,
        });
        comparison.series.push((target_name.to_string(), target));

        for (name, closes) in benchmarks {
            let aligned = self.align(closes, &dates).and_then(|aligned| {
                let summary = PerformanceSummary::calculate(&aligned, &self.config.annualization)?;
                Ok((aligned, summary))
            });
            match aligned {
                Ok((aligned, summary)) => {
                    comparison.rows.push(ComparisonRow {
                        name: name.clone(),
                        summary,
                    });
                    comparison.series.push((name.clone(), aligned));
                }
                Err(e) => warn!(benchmark = %name, error = %e, "skipping benchmark"),
            }
        }

        info!(
            %anchor_used,
            series = comparison.rows.len(),
            "comparison complete"
        );
        Ok(comparison)
    }
}
