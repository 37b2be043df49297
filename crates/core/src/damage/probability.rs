//! Collapse probability per asset, grouped by identical probability value
//!
//! Grouping matters because collapse is resolved per group: for a group of
//! `n` assets sharing probability `p`, exactly `round(p * n)` of them collapse.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::core_types::Asset;
use crate::error::DamageResult;
use crate::hazard::{CollapseLookup, CollapseTable};

/// Assets sharing one collapse probability
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGroup {
    pub probability: f64,
    /// Original asset indices, in the order they were added
    pub members: Vec<usize>,
}

/// Inverted index from collapse probability to asset indices
///
/// Groups keep the order in which their probability was first seen, so a
/// seeded resolver walks them identically on every run.
#[derive(Debug, Clone, Default)]
pub struct ProbabilityGroups {
    groups: Vec<ProbabilityGroup>,
    by_bits: FxHashMap<u64, usize>,
}

impl ProbabilityGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `index` to the group for `probability`, creating the group on first use
    pub fn insert(&mut self, probability: f64, index: usize) {
        let groups = &mut self.groups;
        let slot = *self.by_bits.entry(probability.to_bits()).or_insert_with(|| {
            groups.push(ProbabilityGroup {
                probability,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        self.groups[slot].members.push(index);
    }

    /// Members of the group with exactly this probability
    pub fn get(&self, probability: f64) -> Option<&[usize]> {
        self.by_bits
            .get(&probability.to_bits())
            .map(|&slot| self.groups[slot].members.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbabilityGroup> {
        self.groups.iter()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total assets across all groups
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

/// Build groups from `(probability, members)` pairs, merging repeated
/// probabilities.
///
/// An index listed under two probabilities is kept in both groups here; the
/// collapse phase rejects such groups with `DuplicateAssetIndex` before it
/// touches any asset.
impl FromIterator<(f64, Vec<usize>)> for ProbabilityGroups {
    fn from_iter<I: IntoIterator<Item = (f64, Vec<usize>)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (probability, members) in iter {
            for index in members {
                groups.insert(probability, index);
            }
        }
        groups
    }
}

/// Counts gathered while grouping an asset batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupingStats {
    /// Assets whose probability was exactly zero (excluded from grouping)
    pub zero_probability: usize,
    /// Assets whose depth or distance fell exactly on a bin edge
    pub bin_edge: usize,
}

/// Looks up collapse probabilities in a [`CollapseTable`]
#[derive(Debug, Clone, Copy)]
pub struct ProbabilityCalculator<'a> {
    table: &'a CollapseTable,
}

impl<'a> ProbabilityCalculator<'a> {
    pub fn new(table: &'a CollapseTable) -> Self {
        Self { table }
    }

    /// Probability for a single asset
    ///
    /// # Errors
    /// `NonFinite` for NaN/infinite depth or distance.
    pub fn compute(&self, index: usize, depth: f64, shore_distance: f64) -> DamageResult<CollapseLookup> {
        self.table.lookup(index, depth, shore_distance)
    }

    /// Group every asset with non-zero collapse probability
    ///
    /// # Errors
    /// As [`ProbabilityCalculator::compute`].
    pub fn group(&self, assets: &[Asset]) -> DamageResult<(ProbabilityGroups, GroupingStats)> {
        let mut groups = ProbabilityGroups::new();
        let mut stats = GroupingStats::default();

        for (index, asset) in assets.iter().enumerate() {
            let lookup = self.compute(index, asset.depth(), asset.shore_distance())?;
            if lookup.on_bin_edge {
                stats.bin_edge += 1;
            }
            if lookup.probability == 0.0 {
                stats.zero_probability += 1;
                continue;
            }
            groups.insert(lookup.probability, index);
        }

        if stats.bin_edge > 0 {
            warn!(
                "{} assets sit exactly on a collapse table bin edge; assigned to the upper bin",
                stats.bin_edge
            );
        }

        Ok((groups, stats))
    }
}
