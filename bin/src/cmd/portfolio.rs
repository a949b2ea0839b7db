//! Portfolio command implementation.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::error;
use valueup_data::write_series;
use valueup_eval::{Annualization, PortfolioResult, PortfolioSimulator, UniverseSchedule};
use valueup_traits::{ConstituentSet, MarketPanel, TimeSeries};

use super::{banner, print_series_report, section};
use crate::config::PipelineConfig;

/// Run the rebalanced portfolio and write its normalized return series.
///
/// Failures are logged and leave a header-only result file.
pub(crate) fn run_portfolio(
    config: &PipelineConfig,
    sets: BTreeMap<i32, ConstituentSet>,
    panel: &MarketPanel,
) -> Result<Option<PortfolioResult>> {
    let portfolio = &config.portfolio;
    banner("Value-Up Portfolio Return");

    println!("Period:     {} to {}", portfolio.start_date, portfolio.end_date);
    println!(
        "Rebalance:  every {:02}-{:02}",
        portfolio.rebalance_month, portfolio.rebalance_day
    );
    println!("Anchor:     {} = {}", portfolio.anchor_date, portfolio.base_value);
    println!();

    let schedule = UniverseSchedule::new(sets, config.schedule);
    let simulator = PortfolioSimulator::new(portfolio.clone());
    let path = config.portfolio_path();

    let result = match simulator.run(panel, &schedule) {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "portfolio calculation failed");
            write_series(&path, &TimeSeries::new(), "Index")?;
            return Ok(None);
        }
    };

    write_series(&path, &result.normalized, "Index")?;

    section("REBALANCES");
    for date in &result.rebalance_dates {
        println!("  {date}");
    }
    if result.anchor_used != portfolio.anchor_date {
        println!(
            "\nAnchor {} had no data; normalized at {}",
            portfolio.anchor_date, result.anchor_used
        );
    }
    println!();

    section("NORMALIZED RETURN");
    print_series_report(
        &result.normalized,
        &Annualization::Calendar {
            anchor: result.anchor_used,
        },
    );
    println!("Saved to {}\n", path.display());

    Ok(Some(result))
}
