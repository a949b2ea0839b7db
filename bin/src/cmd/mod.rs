//! CLI subcommand modules.
//!
//! This module contains the implementations for all valueup CLI subcommands
//! and the report printing they share.

pub(crate) mod compare;
pub(crate) mod index;
pub(crate) mod portfolio;
pub(crate) mod run;
pub(crate) mod screen;
pub(crate) mod stages;

use valueup_eval::{Annualization, PerformanceSummary, yearly_returns};
use valueup_traits::TimeSeries;

/// Print a boxed section header.
pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{title:^62}║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Print a ruled subsection header.
pub(crate) fn section(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Print start/end levels, summary statistics and yearly returns.
pub(crate) fn print_series_report(series: &TimeSeries, convention: &Annualization) {
    let (Some((start, first)), Some((end, last))) = (series.first(), series.last()) else {
        println!("No observations.\n");
        return;
    };

    println!("Start:        {start}  {first:>10.2}");
    println!("End:          {end}  {last:>10.2}");
    println!("Trading days: {}", series.len());

    match PerformanceSummary::calculate(series, convention) {
        Ok(summary) => {
            println!();
            println!("Total Return:       {:>8.2}%", summary.total_return * 100.0);
            println!("Annualized Return:  {:>8.2}%", summary.annualized_return * 100.0);
            println!(
                "Annualized Vol:     {:>8.2}%",
                summary.annualized_volatility * 100.0
            );
            println!("Max Drawdown:       {:>8.2}%", summary.max_drawdown * 100.0);
        }
        Err(e) => println!("\nSummary unavailable: {e}"),
    }

    println!("\nYearly returns:");
    for (year, ret) in yearly_returns(series) {
        println!("  {year}: {:>8.2}%", ret * 100.0);
    }
    println!();
}
