//! Incumbency buffers.
//!
//! Index rules give existing constituents looser thresholds than newcomers
//! so that membership does not churn on small rank changes. The buffers
//! are opt-in: a [`ScreeningConfig`](crate::ScreeningConfig) without an
//! [`IncumbencyPolicy`] screens every company by the same thresholds.

use serde::{Deserialize, Serialize};
use valueup_traits::{Candidate, YearInputs};

/// Relaxed thresholds applied to current constituents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncumbencyPolicy {
    /// Market-cap rank an incumbent may fall to and still pass stage 1.
    pub max_cap_rank: f64,

    /// PBR rank ratio an incumbent may reach and still pass stage 3.
    pub max_pbr_rank_ratio: f64,

    /// Position in the ROE ordering within which incumbents are retained.
    pub retain_within: usize,

    /// Position in the ROE ordering within which newcomers are admitted.
    pub admit_within: usize,
}

impl Default for IncumbencyPolicy {
    fn default() -> Self {
        Self {
            max_cap_rank: 440.0,
            max_pbr_rank_ratio: 0.6,
            retain_within: 120,
            admit_within: 80,
        }
    }
}

impl IncumbencyPolicy {
    /// Pick up to `target` members from candidates already sorted best first.
    ///
    /// Incumbents within `retain_within` and newcomers within `admit_within`
    /// are taken first, in order. Remaining slots are filled from the rest of
    /// the ordering.
    pub fn select(&self, ordered: Vec<Candidate>, target: usize, tables: &YearInputs) -> Vec<Candidate> {
        let mut preferred = Vec::with_capacity(target);
        let mut rest = Vec::new();

        for (i, candidate) in ordered.into_iter().enumerate() {
            let position = i + 1;
            let limit = if tables.is_incumbent(&candidate.code) {
                self.retain_within
            } else {
                self.admit_within
            };
            if position <= limit {
                preferred.push((i, candidate));
            } else {
                rest.push((i, candidate));
            }
        }

        preferred.truncate(target);
        let missing = target.saturating_sub(preferred.len());
        preferred.extend(rest.into_iter().take(missing));
        preferred.sort_by_key(|(i, _)| *i);
        preferred.into_iter().map(|(_, c)| c).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valueup_traits::Market;

    fn ordered(n: usize) -> Vec<Candidate> {
        (1..=n)
            .map(|i| Candidate::new(format!("{i:06}"), format!("Co {i}"), Market::Kospi))
            .collect()
    }

    #[test]
    fn test_incumbent_retained_beyond_target() {
        let policy = IncumbencyPolicy {
            retain_within: 6,
            admit_within: 3,
            ..Default::default()
        };
        let tables = YearInputs::empty(2023).with_incumbents(["000005".to_string()].into_iter().collect());

        let selected = policy.select(ordered(10), 4, &tables);
        let codes: Vec<_> = selected.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["000001", "000002", "000003", "000005"]);
    }

    #[test]
    fn test_fill_when_buffers_leave_gaps() {
        let policy = IncumbencyPolicy {
            retain_within: 6,
            admit_within: 2,
            ..Default::default()
        };
        let tables = YearInputs::empty(2023).with_incumbents(Default::default());

        let selected = policy.select(ordered(10), 4, &tables);
        let codes: Vec<_> = selected.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["000001", "000002", "000003", "000004"]);
    }

    #[test]
    fn test_fewer_than_target() {
        let policy = IncumbencyPolicy::default();
        let selected = policy.select(ordered(3), 100, &YearInputs::empty(2023));
        assert_eq!(selected.len(), 3);
    }
}
