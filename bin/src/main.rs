//! Value-Up CLI binary.
//!
//! Screens constituents, computes the index and the cumulative portfolio
//! return, and compares them with benchmark indices.

mod cmd;
mod config;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "valueup")]
#[command(about = "Korean Value-Up index screening and calculation", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file; omitted fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data root directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Which computed series to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeriesKind {
    /// Index levels
    Index,
    /// Normalized cumulative portfolio return
    Portfolio,
}

#[derive(Subcommand)]
enum Commands {
    /// List the screening stages
    Stages {
        /// Show pass criteria
        #[arg(short, long)]
        verbose: bool,
    },

    /// Screen constituents and write one list per year
    Screen {
        /// First selection year
        #[arg(long)]
        from: Option<i32>,

        /// Last selection year
        #[arg(long)]
        to: Option<i32>,

        /// Stop after this stage (see `stages`)
        #[arg(long)]
        through: Option<String>,
    },

    /// Compute index levels from the written constituent lists
    Index,

    /// Compute the cumulative portfolio return from the written constituent lists
    Portfolio,

    /// Compare a written series with benchmark indices
    Compare {
        /// Series to compare
        #[arg(short, long, value_enum, default_value = "index")]
        series: SeriesKind,
    },

    /// Screen, compute both series and compare
    Run,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config =
        PipelineConfig::load(cli.config.as_deref())?.with_overrides(cli.data_dir, cli.output);

    match cli.command {
        Commands::Stages { verbose } => {
            cmd::stages::list_stages(verbose);
        }
        Commands::Screen { from, to, through } => {
            if let Some(first) = from {
                config.years.first = first;
            }
            if let Some(last) = to {
                config.years.last = last;
            }
            config.validate()?;
            cmd::screen::run_screen(&config, through.as_deref())?;
        }
        Commands::Index => {
            let sets = data::load_sets(&config);
            let panel = data::load_panel(&config)?;
            cmd::index::run_index(&config, sets, &panel)?;
        }
        Commands::Portfolio => {
            let sets = data::load_sets(&config);
            let panel = data::load_panel(&config)?;
            cmd::portfolio::run_portfolio(&config, sets, &panel)?;
        }
        Commands::Compare { series } => {
            cmd::compare::compare_written(&config, series == SeriesKind::Portfolio).await?;
        }
        Commands::Run => {
            cmd::run::run_pipeline(&config).await?;
        }
    }

    Ok(())
}
