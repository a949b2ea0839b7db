//! Compare command implementation.

use anyhow::{Context, Result, bail};
use valueup_data::{read_series, write_comparison};
use valueup_eval::{Annualization, BenchmarkComparator, Comparison, ComparisonConfig};
use valueup_traits::TimeSeries;

use super::{banner, section};
use crate::config::PipelineConfig;
use crate::data;

/// Compare a previously written index or portfolio series.
pub(crate) async fn compare_written(config: &PipelineConfig, portfolio: bool) -> Result<Comparison> {
    let (path, name, annualization) = if portfolio {
        (
            config.portfolio_path(),
            "Value-Up Portfolio",
            portfolio_annualization(config),
        )
    } else {
        (
            config.index_path(),
            "Value-Up Index",
            config.comparison.annualization,
        )
    };

    let series = read_series(&path, "Index")
        .with_context(|| format!("reading {}", path.display()))?;
    compare_series(config, name, &series, annualization).await
}

/// Calendar annualization measured from the portfolio anchor.
pub(crate) const fn portfolio_annualization(config: &PipelineConfig) -> Annualization {
    Annualization::Calendar {
        anchor: config.portfolio.anchor_date,
    }
}

/// Rebase `series` and the benchmarks at the comparison anchor, print the
/// table and write it to the comparison file.
pub(crate) async fn compare_series(
    config: &PipelineConfig,
    name: &str,
    series: &TimeSeries,
    annualization: Annualization,
) -> Result<Comparison> {
    banner("Benchmark Comparison");

    let (Some((from, _)), Some((to, _))) = (series.first(), series.last()) else {
        bail!("{name} has no observations to compare");
    };

    let benchmarks = data::load_benchmarks(config, from, to).await;
    println!(
        "Benchmarks: {} of {} loaded",
        benchmarks.len(),
        config.benchmarks.len()
    );
    println!("Anchor:     {}", config.comparison.anchor);
    println!();

    let comparator = BenchmarkComparator::new(ComparisonConfig {
        annualization,
        ..config.comparison
    });
    let comparison = comparator.compare(name, series, &benchmarks)?;

    section("PERFORMANCE");
    println!(
        "{:<22} {:>12} {:>12} {:>12}",
        "Series", "Total", "Annualized", "Volatility"
    );
    println!("{}", "─".repeat(61));
    for row in &comparison.rows {
        println!(
            "{:<22} {:>11.2}% {:>11.2}% {:>11.2}%",
            row.name,
            row.summary.total_return * 100.0,
            row.summary.annualized_return * 100.0,
            row.summary.annualized_volatility * 100.0
        );
    }
    println!();

    let path = config.comparison_path();
    write_comparison(&path, &comparison)?;
    println!("Saved to {}\n", path.display());

    Ok(comparison)
}
