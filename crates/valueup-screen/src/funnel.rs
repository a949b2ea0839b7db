//! The four-stage screening funnel.
//!
//! [`Funnel`] chains the stages, feeding each the survivors of the one
//! before, and records how many companies each stage kept. Screening a
//! range of years produces one [`ConstituentSet`] per year; a year whose
//! inputs are missing yields an empty set and a warning instead of an
//! error.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use valueup_traits::{
    Candidate, ConstituentSet, Result, ScreeningStage, StockCode, YearInputs, YearTableSource,
};

use crate::efficiency::{EfficiencyConfig, EfficiencyStage};
use crate::incumbency::IncumbencyPolicy;
use crate::profitability::ProfitabilityStage;
use crate::registry;
use crate::universe::{UniverseConfig, UniverseStage};
use crate::valuation::{ValuationConfig, ValuationStage};

/// Configuration for the whole funnel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Stage 1 thresholds
    pub universe: UniverseConfig,

    /// Stage 3 thresholds
    pub valuation: ValuationConfig,

    /// Stage 4 selection size
    pub efficiency: EfficiencyConfig,

    /// Looser thresholds for current constituents. `None` screens everyone
    /// alike.
    pub incumbency: Option<IncumbencyPolicy>,
}

/// How many companies one stage received and kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    /// Stage name
    pub stage: String,
    /// Companies received
    pub input: usize,
    /// Companies kept
    pub output: usize,
    /// Companies dropped for lack of a matching row in a joined table
    pub unmatched: usize,
}

/// Diagnostics for one screened year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelReport {
    /// Screening year
    pub year: i32,
    /// Rows in the year's market-cap table
    pub listed: usize,
    /// Per-stage counts, in funnel order
    pub stages: Vec<StageCount>,
    /// Why the year was skipped, if it was
    pub skipped: Option<String>,
}

impl FunnelReport {
    fn skipped(year: i32, reason: String) -> Self {
        Self {
            year,
            listed: 0,
            stages: Vec::new(),
            skipped: Some(reason),
        }
    }

    /// Number of constituents selected.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.stages.last().map_or(0, |s| s.output)
    }
}

/// Constituent sets and reports for a range of years.
#[derive(Debug, Clone, Default)]
pub struct FunnelRun {
    /// One set per screened year, keyed by selection year
    pub sets: BTreeMap<i32, ConstituentSet>,
    /// One report per screened year, in year order
    pub reports: Vec<FunnelReport>,
}

/// The screening funnel.
///
/// # Example
///
/// ```ignore
/// use valueup_screen::{Funnel, ScreeningConfig};
///
/// let funnel = Funnel::new(&ScreeningConfig::default());
/// let run = funnel.screen_years(&source, 2020..=2024);
/// for (year, set) in &run.sets {
///     println!("{year}: {} constituents", set.len());
/// }
/// ```
pub struct Funnel {
    stages: Vec<Box<dyn ScreeningStage>>,
    track_incumbents: bool,
}

impl fmt::Debug for Funnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Funnel")
            .field("stages", &self.stage_names())
            .field("track_incumbents", &self.track_incumbents)
            .finish()
    }
}

impl Funnel {
    /// Build the standard four-stage funnel.
    pub fn new(config: &ScreeningConfig) -> Self {
        let mut universe = UniverseStage::new(config.universe.clone());
        let mut valuation = ValuationStage::new(config.valuation.clone());
        let mut efficiency = EfficiencyStage::new(config.efficiency.clone());

        if let Some(policy) = config.incumbency {
            universe = universe.with_incumbency(policy);
            valuation = valuation.with_incumbency(policy);
            efficiency = efficiency.with_incumbency(policy);
        }

        Self {
            stages: vec![
                Box::new(universe),
                Box::new(ProfitabilityStage),
                Box::new(valuation),
                Box::new(efficiency),
            ],
            track_incumbents: config.incumbency.is_some(),
        }
    }

    /// Build a funnel from arbitrary stages, run in the given order.
    pub fn with_stages(stages: Vec<Box<dyn ScreeningStage>>) -> Self {
        Self {
            stages,
            track_incumbents: false,
        }
    }

    /// Build the standard funnel, stopping after the stage named `last`.
    ///
    /// # Errors
    ///
    /// Returns [`valueup_traits::ValueUpError::StageNotFound`] for an
    /// unknown name.
    pub fn through(last: &str, config: &ScreeningConfig) -> Result<Self> {
        Ok(Self {
            stages: registry::stages_through(last, config)?,
            track_incumbents: config.incumbency.is_some(),
        })
    }

    /// Names of the stages, in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage on one year's tables.
    ///
    /// # Errors
    ///
    /// Propagates the first stage error.
    pub fn screen(&self, tables: &YearInputs) -> Result<(ConstituentSet, FunnelReport)> {
        let mut current: Vec<Candidate> = tables.market_caps.iter().map(Candidate::from).collect();
        let mut report = FunnelReport {
            year: tables.year,
            listed: current.len(),
            stages: Vec::with_capacity(self.stages.len()),
            skipped: None,
        };

        for stage in &self.stages {
            let input = current.len();
            let unmatched = stage.unmatched(&current, tables);
            current = stage.screen(current, tables)?;
            report.stages.push(StageCount {
                stage: stage.name().to_string(),
                input,
                output: current.len(),
                unmatched,
            });
        }

        Ok((ConstituentSet::new(tables.year, current), report))
    }

    /// Load and screen one year.
    ///
    /// A missing input file is not an error: the year gets an empty set and
    /// the report records the reason.
    ///
    /// # Errors
    ///
    /// Returns an error when a table exists but cannot be read, or a stage
    /// fails.
    pub fn screen_year(
        &self,
        source: &dyn YearTableSource,
        year: i32,
        incumbents: Option<&BTreeSet<StockCode>>,
    ) -> Result<(ConstituentSet, FunnelReport)> {
        let tables = match source.load_year(year) {
            Ok(tables) => tables,
            Err(e) if e.is_not_found() => {
                warn!(year, error = %e, "input missing, emitting empty constituent set");
                return Ok((ConstituentSet::empty(year), FunnelReport::skipped(year, e.to_string())));
            }
            Err(e) => return Err(e),
        };

        let tables = match incumbents {
            Some(set) if self.track_incumbents => tables.with_incumbents(set.clone()),
            _ => tables,
        };

        let (set, report) = self.screen(&tables)?;
        info!(
            year,
            listed = report.listed,
            selected = set.len(),
            "screened year"
        );
        Ok((set, report))
    }

    /// Screen every year in `years`, in ascending order.
    ///
    /// Failures are isolated per year: the year is logged and gets an empty
    /// set. When incumbency is enabled each year's incumbents are the
    /// previous year's constituents.
    pub fn screen_years<I>(&self, source: &dyn YearTableSource, years: I) -> FunnelRun
    where
        I: IntoIterator<Item = i32>,
    {
        let years: BTreeSet<i32> = years.into_iter().collect();
        let mut run = FunnelRun::default();
        let mut incumbents: Option<BTreeSet<StockCode>> = None;

        for year in years {
            let (set, report) = match self.screen_year(source, year, incumbents.as_ref()) {
                Ok(result) => result,
                Err(e) => {
                    error!(year, error = %e, "screening failed, emitting empty constituent set");
                    (ConstituentSet::empty(year), FunnelReport::skipped(year, e.to_string()))
                }
            };

            if !set.is_empty() {
                incumbents = Some(set.code_set());
            }
            run.reports.push(report);
            run.sets.insert(year, set);
        }

        run
    }
}

impl Default for Funnel {
    fn default() -> Self {
        Self::new(&ScreeningConfig::default())
    }
}
