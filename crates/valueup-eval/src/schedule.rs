//! Which constituent set is investable on which day.
//!
//! A set is chosen from one year's fundamentals and invested during the
//! following calendar year. With the default lag of one year, trading days
//! in 2024 use the set selected from 2023 data.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;
use valueup_traits::{ConstituentSet, Date};

/// Configuration for mapping calendar years to selection years.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Years between the fundamentals a set is chosen from and the calendar
    /// year it is invested in.
    pub selection_lag: i32,

    /// Reuse the most recent non-empty set when a year has none.
    pub carry_forward: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            selection_lag: 1,
            carry_forward: false,
        }
    }
}

/// Constituent sets keyed by selection year.
#[derive(Debug, Clone, Default)]
pub struct UniverseSchedule {
    sets: BTreeMap<i32, ConstituentSet>,
    config: ScheduleConfig,
}

impl UniverseSchedule {
    /// Create a schedule over `sets`.
    pub const fn new(sets: BTreeMap<i32, ConstituentSet>, config: ScheduleConfig) -> Self {
        Self { sets, config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Selection year whose set is invested during `calendar_year`.
    #[must_use]
    pub const fn selection_year(&self, calendar_year: i32) -> i32 {
        calendar_year - self.config.selection_lag
    }

    /// The set invested during `calendar_year`, if any.
    ///
    /// Empty sets count as missing.
    pub fn set_for_year(&self, calendar_year: i32) -> Option<&ConstituentSet> {
        let selection = self.selection_year(calendar_year);
        if let Some(set) = self.sets.get(&selection).filter(|s| !s.is_empty()) {
            return Some(set);
        }
        if !self.config.carry_forward {
            return None;
        }

        let carried = self
            .sets
            .range(..selection)
            .rev()
            .map(|(_, s)| s)
            .find(|s| !s.is_empty());
        if let Some(set) = carried {
            debug!(
                calendar_year,
                selection_year = selection,
                carried_from = set.year(),
                "carrying constituent set forward"
            );
        }
        carried
    }

    /// The set invested on `date`.
    pub fn set_for_date(&self, date: Date) -> Option<&ConstituentSet> {
        self.set_for_year(date.year())
    }

    /// All sets, by selection year.
    pub const fn sets(&self) -> &BTreeMap<i32, ConstituentSet> {
        &self.sets
    }
}
