//! Screen command implementation.

use std::fs;

use anyhow::Result;
use valueup_data::write_constituents;
use valueup_screen::FunnelRun;

use super::{banner, section};
use crate::config::PipelineConfig;
use crate::data;

/// Screen every configured year and write the constituent lists.
///
/// Years whose inputs are missing still get a list, with no rows.
pub(crate) fn run_screen(config: &PipelineConfig, through: Option<&str>) -> Result<FunnelRun> {
    banner("Constituent Screening");

    println!("Data:    {}", config.data.root.display());
    println!("Years:   {} to {}", config.years.first, config.years.last);
    println!("Output:  {}", config.output_dir.display());
    if let Some(last) = through {
        println!("Through: {last}");
    }
    if config.screening.incumbency.is_some() {
        println!("Incumbency buffers enabled");
    }
    println!();

    let run = data::screen(config, through)?;

    fs::create_dir_all(&config.output_dir)?;
    for set in run.sets.values() {
        write_constituents(&config.output_dir, set)?;
    }

    section("FUNNEL");
    let stages: Vec<&str> = run
        .reports
        .iter()
        .find(|r| r.skipped.is_none())
        .map(|r| r.stages.iter().map(|s| s.stage.as_str()).collect())
        .unwrap_or_default();

    print!("{:<6} {:>8}", "Year", "listed");
    for stage in &stages {
        print!(" {stage:>14}");
    }
    println!(" {:>10}", "unmatched");
    println!("{}", "─".repeat(26 + 15 * stages.len()));

    for report in &run.reports {
        if let Some(reason) = &report.skipped {
            println!("{:<6} skipped: {reason}", report.year);
            continue;
        }
        print!("{:<6} {:>8}", report.year, report.listed);
        for count in &report.stages {
            print!(" {:>14}", count.output);
        }
        let unmatched: usize = report.stages.iter().map(|s| s.unmatched).sum();
        println!(" {unmatched:>10}");
    }
    println!();

    Ok(run)
}
