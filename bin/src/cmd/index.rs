//! Index command implementation.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::error;
use valueup_data::write_series;
use valueup_eval::{
    Annualization, IndexCalculator, TRADING_DAYS_PER_YEAR, UniverseSchedule,
};
use valueup_traits::{ConstituentSet, MarketPanel, TimeSeries};

use super::{banner, print_series_report, section};
use crate::config::PipelineConfig;

/// Compute index levels and write them to the index result file.
///
/// A calculation failure is logged and leaves a header-only result file,
/// so downstream steps see an empty series rather than a stale one.
pub(crate) fn run_index(
    config: &PipelineConfig,
    sets: BTreeMap<i32, ConstituentSet>,
    panel: &MarketPanel,
) -> Result<Option<TimeSeries>> {
    let index = &config.index;
    banner("Value-Up Index");

    println!("Period:     {} to {}", index.start_date, index.end_date);
    println!("Base:       {} = {}", index.base_date, index.base_value);
    println!("Cap:        {:.0}%", index.cap.cap * 100.0);
    println!("Sets:       {}", sets.len());
    println!();

    let schedule = UniverseSchedule::new(sets, config.schedule);
    let calculator = IndexCalculator::new(index.clone());
    let path = config.index_path();

    let levels = match calculator.compute(panel, &schedule) {
        Ok(levels) => levels,
        Err(e) => {
            error!(error = %e, "index calculation failed");
            write_series(&path, &TimeSeries::new(), "Index")?;
            return Ok(None);
        }
    };

    write_series(&path, &levels, "Index")?;

    section("INDEX LEVELS");
    print_series_report(
        &levels,
        &Annualization::TradingDays {
            periods_per_year: TRADING_DAYS_PER_YEAR,
        },
    );
    println!("Saved to {}\n", path.display());

    Ok(Some(levels))
}
