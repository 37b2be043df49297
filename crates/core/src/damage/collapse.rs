//! Stochastic collapse resolution
//!
//! For every probability group the number of collapsing assets is fixed:
//! `round_half_away_from_zero(p * n)`. Only *which* members collapse is random.
//! The source of that randomness is injected through [`CollapseSelector`] so
//! runs can be reproduced with a seed or replaced by a deterministic stub.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, info};

use super::probability::{ProbabilityGroup, ProbabilityGroups};
use crate::error::{DamageError, DamageResult};

/// Products within this many ULPs of a half-way point count as half-way
const HALF_WAY_ULPS: f64 = 4.0;

/// Picks which members of a group collapse
pub trait CollapseSelector {
    /// Return exactly `count` distinct entries of `members` (`count <= members.len()`).
    fn select(&mut self, members: &[usize], count: usize) -> Vec<usize>;
}

impl<S: CollapseSelector + ?Sized> CollapseSelector for &mut S {
    fn select(&mut self, members: &[usize], count: usize) -> Vec<usize> {
        (**self).select(members, count)
    }
}

/// Uniform selection without replacement from an injected random source
#[derive(Debug, Clone)]
pub struct RandomSelector<R> {
    rng: R,
}

impl<R: Rng> RandomSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RandomSelector<ChaCha8Rng> {
    /// Reproducible selector: identical seeds give identical collapses
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> CollapseSelector for RandomSelector<R> {
    fn select(&mut self, members: &[usize], count: usize) -> Vec<usize> {
        index::sample(&mut self.rng, members.len(), count)
            .into_iter()
            .map(|i| members[i])
            .collect()
    }
}

/// Deterministic stub: the first `count` members collapse
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMembersSelector;

impl CollapseSelector for FirstMembersSelector {
    fn select(&mut self, members: &[usize], count: usize) -> Vec<usize> {
        members[..count].to_vec()
    }
}

/// Number of collapses for a group of `group_size` assets at `probability`
pub fn expected_collapse_count(probability: f64, group_size: usize) -> usize {
    let product = (probability * group_size as f64).max(0.0);
    let whole = product.floor();
    let tolerance = f64::EPSILON * product * HALF_WAY_ULPS;
    // f64::round rounds half away from zero
    let count = if (product - whole - 0.5).abs() <= tolerance {
        whole + 1.0
    } else {
        product.round()
    };
    (count as usize).min(group_size)
}

/// Audit record for one resolved group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollapseAudit {
    pub probability: f64,
    pub group_size: usize,
    pub collapse_count: usize,
    pub selected: Vec<usize>,
}

/// Collapsed asset indices plus the per-group audit trail
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollapseOutcome {
    /// Collapsed asset indices, ascending
    pub collapsed: Vec<usize>,
    pub audit: Vec<CollapseAudit>,
}

/// Resolves probability groups into collapsed assets
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseResolver {
    verbose: bool,
}

impl CollapseResolver {
    /// `verbose` raises the per-group log records from debug to info
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Draw the collapsed members of every group
    ///
    /// # Errors
    /// `InvalidSelection` if the selector returns the wrong number of
    /// members, a repeated member or an index outside the group.
    pub fn resolve<S: CollapseSelector + ?Sized>(
        &self,
        groups: &ProbabilityGroups,
        selector: &mut S,
    ) -> DamageResult<CollapseOutcome> {
        let mut outcome = CollapseOutcome::default();

        for group in groups.iter() {
            let group_size = group.members.len();
            let collapse_count = expected_collapse_count(group.probability, group_size);
            let selected = if collapse_count == 0 {
                Vec::new()
            } else {
                selector.select(&group.members, collapse_count)
            };
            check_selection(group, collapse_count, &selected)?;

            if self.verbose {
                info!(
                    probability = group.probability,
                    group_size,
                    collapse_count,
                    ?selected,
                    "collapse group resolved"
                );
            } else {
                debug!(
                    probability = group.probability,
                    group_size,
                    collapse_count,
                    ?selected,
                    "collapse group resolved"
                );
            }

            outcome.collapsed.extend_from_slice(&selected);
            outcome.audit.push(CollapseAudit {
                probability: group.probability,
                group_size,
                collapse_count,
                selected,
            });
        }

        outcome.collapsed.sort_unstable();
        Ok(outcome)
    }
}

fn check_selection(group: &ProbabilityGroup, expected: usize, selected: &[usize]) -> DamageResult<()> {
    let invalid = |reason: String| DamageError::InvalidSelection {
        probability: group.probability,
        reason,
    };

    if selected.len() != expected {
        return Err(invalid(format!(
            "{} members selected, expected {expected}",
            selected.len()
        )));
    }
    let members: FxHashSet<usize> = group.members.iter().copied().collect();
    let mut seen = FxHashSet::default();
    for &index in selected {
        if !members.contains(&index) {
            return Err(invalid(format!("asset {index} is not in the group")));
        }
        if !seen.insert(index) {
            return Err(invalid(format!("asset {index} selected twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn reference_groups() -> ProbabilityGroups {
        [
            (0.4, vec![0]),
            (0.6, vec![1]),
            (0.5, vec![2]),
            (0.25, vec![3, 4]),
            (0.1, vec![5, 6, 7, 8]),
            (0.2, (9..17).collect()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(expected_collapse_count(0.4, 1), 0);
        assert_eq!(expected_collapse_count(0.5, 1), 1);
        assert_eq!(expected_collapse_count(0.6, 1), 1);
        assert_eq!(expected_collapse_count(0.25, 2), 1);
        assert_eq!(expected_collapse_count(0.1, 4), 0);
        assert_eq!(expected_collapse_count(0.2, 8), 2);
        assert_eq!(expected_collapse_count(0.15, 10), 2);
        assert_eq!(expected_collapse_count(0.05, 30), 2);
        assert_eq!(expected_collapse_count(1.0, 3), 3);
        assert_eq!(expected_collapse_count(0.0, 3), 0);
        assert_eq!(expected_collapse_count(0.7, 0), 0);
    }

    #[test]
    fn test_just_below_half_rounds_down() {
        assert_eq!(expected_collapse_count(0.4999999996, 1), 0);
        assert_eq!(expected_collapse_count(0.2499999999, 2), 0);
        assert_eq!(expected_collapse_count(0.5000000004, 1), 1);
        assert_eq!(expected_collapse_count(0.35, 10), 4);
        assert_eq!(expected_collapse_count(0.45, 10), 5);
    }

    #[test]
    fn test_counts_per_group_with_stub() {
        let outcome = CollapseResolver::new(true)
            .resolve(&reference_groups(), &mut FirstMembersSelector)
            .unwrap();
        let counts: Vec<usize> = outcome.audit.iter().map(|a| a.collapse_count).collect();
        assert_eq!(counts, vec![0, 1, 1, 1, 0, 2]);
        assert_eq!(outcome.collapsed, vec![1, 2, 3, 9, 10]);
    }

    #[test]
    fn test_counts_exact_for_any_seed() {
        let groups = reference_groups();
        for seed in 0..50 {
            let mut selector = RandomSelector::seeded(seed);
            let outcome = CollapseResolver::default()
                .resolve(&groups, &mut selector)
                .unwrap();
            let collapsed: HashSet<usize> = outcome.collapsed.iter().copied().collect();
            assert_eq!(collapsed.len(), 5);
            assert!(collapsed.contains(&1) && collapsed.contains(&2));
            assert!(!collapsed.contains(&0));
            assert_eq!((3..5).filter(|i| collapsed.contains(i)).count(), 1);
            assert_eq!((5..9).filter(|i| collapsed.contains(i)).count(), 0);
            assert_eq!((9..17).filter(|i| collapsed.contains(i)).count(), 2);
        }
    }

    #[test]
    fn test_same_seed_reproduces_selection() {
        let groups = reference_groups();
        let a = CollapseResolver::default()
            .resolve(&groups, &mut RandomSelector::seeded(7))
            .unwrap();
        let b = CollapseResolver::default()
            .resolve(&groups, &mut RandomSelector::seeded(7))
            .unwrap();
        assert_eq!(a, b);
    }

    /// Ignores the requested count and returns every member
    struct EveryMember;

    impl CollapseSelector for EveryMember {
        fn select(&mut self, members: &[usize], _count: usize) -> Vec<usize> {
            members.to_vec()
        }
    }

    /// Returns the right number of entries, all the same member
    struct Repeats;

    impl CollapseSelector for Repeats {
        fn select(&mut self, members: &[usize], count: usize) -> Vec<usize> {
            vec![members[0]; count]
        }
    }

    /// Returns indices that are not in the group
    struct Outsider;

    impl CollapseSelector for Outsider {
        fn select(&mut self, _members: &[usize], count: usize) -> Vec<usize> {
            (1000..1000 + count).collect()
        }
    }

    #[test]
    fn test_misbehaving_selectors_rejected() {
        let groups: ProbabilityGroups = [(0.6, (0..8).collect())].into_iter().collect();
        let resolver = CollapseResolver::default();

        let err = resolver.resolve(&groups, &mut EveryMember).unwrap_err();
        assert!(matches!(err, DamageError::InvalidSelection { probability, .. } if probability == 0.6));
        assert!(err.to_string().contains("8 members selected, expected 5"));

        assert!(matches!(
            resolver.resolve(&groups, &mut Repeats),
            Err(DamageError::InvalidSelection { ref reason, .. }) if reason.contains("twice")
        ));
        assert!(matches!(
            resolver.resolve(&groups, &mut Outsider),
            Err(DamageError::InvalidSelection { ref reason, .. }) if reason.contains("not in the group")
        ));
    }

    #[test]
    fn test_identity_is_random() {
        let groups: ProbabilityGroups = [(0.5, (0..10).collect())].into_iter().collect();
        let mut selector = RandomSelector::seeded(99);
        let mut seen = HashSet::new();
        for _ in 0..20 {
            let outcome = CollapseResolver::default()
                .resolve(&groups, &mut selector)
                .unwrap();
            assert_eq!(outcome.collapsed.len(), 5);
            seen.insert(outcome.collapsed);
        }
        assert!(seen.len() > 1);
    }
}
