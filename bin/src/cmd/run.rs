//! Full pipeline: screen, compute both series and compare them.

use anyhow::Result;
use tracing::{info, warn};

use super::compare::{compare_series, portfolio_annualization};
use super::index::run_index;
use super::portfolio::run_portfolio;
use super::screen::run_screen;
use crate::config::PipelineConfig;
use crate::data;

/// Run every step in order, reusing the screened sets in memory.
///
/// A series that could not be computed is not compared.
pub(crate) async fn run_pipeline(config: &PipelineConfig) -> Result<()> {
    let run = run_screen(config, None)?;
    let panel = data::load_panel(config)?;
    info!(dates = panel.len(), "loaded daily quotes");

    let index = run_index(config, run.sets.clone(), &panel)?;
    let portfolio = run_portfolio(config, run.sets, &panel)?;

    match index {
        Some(levels) => {
            compare_series(
                config,
                "Value-Up Index",
                &levels,
                config.comparison.annualization,
            )
            .await?;
        }
        None => warn!("no index levels to compare"),
    }

    match portfolio {
        Some(result) => {
            compare_series(
                config,
                "Value-Up Portfolio",
                &result.normalized,
                portfolio_annualization(config),
            )
            .await?;
        }
        None => warn!("no portfolio return to compare"),
    }

    Ok(())
}
