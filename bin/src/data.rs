//! Data loading utilities for the Value-Up CLI.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};
use valueup_data::{
    CsvTableSource, constituents_file_name, read_constituents, read_series,
};
use valueup_fmp::FmpClient;
use valueup_screen::{Funnel, FunnelRun};
use valueup_traits::{ConstituentSet, MarketPanel, Result, TimeSeries};

use crate::config::PipelineConfig;

/// Run the screening funnel over the configured years, optionally stopping
/// after the stage named `through`.
pub(crate) fn screen(config: &PipelineConfig, through: Option<&str>) -> Result<FunnelRun> {
    let funnel = match through {
        Some(last) => Funnel::through(last, &config.screening)?,
        None => Funnel::new(&config.screening),
    };
    let source = CsvTableSource::new(config.data.clone());
    Ok(funnel.screen_years(&source, config.years.years()))
}

/// Read previously written constituent lists from the output directory.
///
/// Years without a file get an empty set.
pub(crate) fn load_sets(config: &PipelineConfig) -> BTreeMap<i32, ConstituentSet> {
    config
        .years
        .years()
        .map(|year| {
            let path = config.output_dir.join(constituents_file_name(year));
            let set = read_constituents(&path, year).unwrap_or_else(|e| {
                warn!(year, error = %e, "no constituent list, using an empty set");
                ConstituentSet::empty(year)
            });
            (year, set)
        })
        .collect()
}

/// Daily quotes covering the index and portfolio date ranges, including
/// the base and anchor dates.
pub(crate) fn load_panel(config: &PipelineConfig) -> Result<MarketPanel> {
    let bounds = [
        config.index.start_date,
        config.index.end_date,
        config.index.base_date,
        config.portfolio.start_date,
        config.portfolio.end_date,
        config.portfolio.anchor_date,
    ];
    let start = bounds.iter().min().copied().unwrap_or(config.index.start_date);
    let end = bounds.iter().max().copied().unwrap_or(config.index.end_date);
    valueup_data::load_panel(&config.data, start, end)
}

/// Benchmark closes over `[from, to]`.
///
/// Read from `benchmark_dir` when configured, fetched from FMP otherwise.
/// Benchmarks that cannot be loaded are left out.
pub(crate) async fn load_benchmarks(
    config: &PipelineConfig,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<(String, TimeSeries)> {
    if let Some(dir) = &config.benchmark_dir {
        return config
            .benchmarks
            .iter()
            .filter_map(|b| {
                let path = dir.join(format!("{}.csv", b.name));
                match read_series(&path, "Close") {
                    Ok(series) => Some((b.name.clone(), series.between(from, to))),
                    Err(e) => {
                        warn!(benchmark = %b.name, error = %e, "skipping benchmark");
                        None
                    }
                }
            })
            .collect();
    }

    match FmpClient::from_env() {
        Ok(client) => {
            info!(count = config.benchmarks.len(), "fetching benchmark closes");
            client.benchmark_closes(&config.benchmarks, from, to).await
        }
        Err(e) => {
            warn!(error = %e, "benchmarks unavailable");
            Vec::new()
        }
    }
}
