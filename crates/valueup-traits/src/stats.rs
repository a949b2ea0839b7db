//! Rank statistics used by the screening stages.
//!
//! All ranks follow the average-rank tie convention: tied values share the
//! mean of the 1-based positions they occupy. Missing (`None`) and
//! non-finite values take no part in a ranking and receive `None`, so they
//! never count towards the denominator of a percentile.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Direction of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Smallest value gets rank 1.
    Ascending,
    /// Largest value gets rank 1.
    Descending,
}

/// Compute 1-based average ranks.
///
/// # Examples
///
/// ```
/// use valueup_traits::stats::{average_ranks, RankOrder};
///
/// let ranks = average_ranks(&[Some(10.0), Some(20.0), Some(20.0), None], RankOrder::Ascending);
/// assert_eq!(ranks, vec![Some(1.0), Some(2.5), Some(2.5), None]);
/// ```
pub fn average_ranks(values: &[Option<f64>], order: RankOrder) -> Vec<Option<f64>> {
    let mut indexed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|x| x.is_finite()).map(|x| (i, x)))
        .collect();

    indexed.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        match order {
            RankOrder::Ascending => ord,
            RankOrder::Descending => ord.reverse(),
        }
    });

    let n = indexed.len();
    let mut ranks = vec![None; values.len()];
    let mut i = 0;

    while i < n {
        let mut j = i;
        // Find ties
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }

        // Positions i..j are 0-based, so the mean 1-based rank is (i + 1 + j) / 2
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for item in &indexed[i..j] {
            ranks[item.0] = Some(avg_rank);
        }

        i = j;
    }

    ranks
}

/// Percentile rank: average rank divided by the number of ranked values.
///
/// Results lie in (0, 1]; the largest value (ascending order) scores 1.0.
pub fn percentile_ranks(values: &[Option<f64>], order: RankOrder) -> Vec<Option<f64>> {
    let ranks = average_ranks(values, order);
    let count = ranks.iter().filter(|r| r.is_some()).count();
    if count == 0 {
        return ranks;
    }
    ranks
        .into_iter()
        .map(|r| r.map(|r| r / count as f64))
        .collect()
}

/// Average ranks computed independently within each group.
///
/// `groups[i]` is the group key of `values[i]`. Rows whose group is `None`
/// are not ranked.
pub fn group_average_ranks(
    values: &[Option<f64>],
    groups: &[Option<&str>],
    order: RankOrder,
) -> Vec<Option<f64>> {
    rank_within_groups(values, groups, |v| average_ranks(v, order))
}

/// Percentile ranks computed independently within each group.
pub fn group_percentile_ranks(
    values: &[Option<f64>],
    groups: &[Option<&str>],
    order: RankOrder,
) -> Vec<Option<f64>> {
    rank_within_groups(values, groups, |v| percentile_ranks(v, order))
}

fn rank_within_groups<F>(values: &[Option<f64>], groups: &[Option<&str>], rank: F) -> Vec<Option<f64>>
where
    F: Fn(&[Option<f64>]) -> Vec<Option<f64>>,
{
    debug_assert_eq!(values.len(), groups.len());

    let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, group) in groups.iter().enumerate() {
        if let Some(g) = group {
            members.entry(g).or_default().push(i);
        }
    }

    let mut out = vec![None; values.len()];
    for indices in members.values() {
        let group_values: Vec<Option<f64>> = indices.iter().map(|&i| values[i]).collect();
        for (&i, r) in indices.iter().zip(rank(&group_values)) {
            out[i] = r;
        }
    }
    out
}

/// Keep a value only if it is finite.
#[must_use]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_ranks_basic() {
        let values = [Some(3.0), Some(1.0), Some(2.0), Some(5.0), Some(4.0)];
        let ranks = average_ranks(&values, RankOrder::Ascending);
        assert_eq!(
            ranks,
            vec![Some(3.0), Some(1.0), Some(2.0), Some(5.0), Some(4.0)]
        );
    }

    #[test]
    fn test_average_ranks_descending_with_ties() {
        let values = [Some(1.0), Some(2.0), Some(2.0), Some(3.0)];
        let ranks = average_ranks(&values, RankOrder::Descending);
        assert_eq!(ranks, vec![Some(4.0), Some(2.5), Some(2.5), Some(1.0)]);
    }

    #[test]
    fn test_average_ranks_skip_missing_and_nan() {
        let values = [Some(1.0), None, Some(f64::NAN), Some(0.5)];
        let ranks = average_ranks(&values, RankOrder::Ascending);
        assert_eq!(ranks, vec![Some(2.0), None, None, Some(1.0)]);
    }

    #[test]
    fn test_percentile_ranks() {
        let values = [Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(50.0)];
        let pct = percentile_ranks(&values, RankOrder::Ascending);
        assert_relative_eq!(pct[0].unwrap(), 0.2);
        assert_relative_eq!(pct[4].unwrap(), 1.0);
    }

    #[test]
    fn test_percentile_ranks_tie_at_cutoff() {
        // Two tied lowest values share rank 1.5 → 0.3, so both sit above 0.2
        let values = [Some(1.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let pct = percentile_ranks(&values, RankOrder::Ascending);
        assert_relative_eq!(pct[0].unwrap(), 0.3);
        assert_relative_eq!(pct[1].unwrap(), 0.3);
    }

    #[test]
    fn test_percentile_denominator_excludes_missing() {
        let values = [Some(1.0), None, Some(2.0)];
        let pct = percentile_ranks(&values, RankOrder::Ascending);
        assert_relative_eq!(pct[0].unwrap(), 0.5);
        assert_eq!(pct[1], None);
        assert_relative_eq!(pct[2].unwrap(), 1.0);
    }

    #[test]
    fn test_group_ranks() {
        let values = [Some(0.10), Some(0.20), Some(0.05), Some(0.30), Some(0.15)];
        let groups = [Some("bank"), Some("bank"), Some("chem"), Some("chem"), None];
        let ranks = group_average_ranks(&values, &groups, RankOrder::Descending);
        assert_eq!(ranks, vec![Some(2.0), Some(1.0), Some(2.0), Some(1.0), None]);

        let pct = group_percentile_ranks(&values, &groups, RankOrder::Ascending);
        assert_relative_eq!(pct[0].unwrap(), 0.5);
        assert_relative_eq!(pct[1].unwrap(), 1.0);
        assert_eq!(pct[4], None);
    }

    #[test]
    fn test_finite() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NAN), None);
    }
}
