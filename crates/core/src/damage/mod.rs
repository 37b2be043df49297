//! Damage-modelling engine
//!
//! Each submodule is one phase of an event's loss estimate:
//! 1. [`fraction`]: continuous structure/contents damage from depth
//! 2. [`probability`]: collapse probability per asset, grouped by value
//! 3. [`collapse`]: exact-count random collapse selection within each group
//! 4. [`cost`]: fractions to monetary loss
//!
//! The phases are pure over their inputs; [`crate::model::EventDamageModel`]
//! sequences them over a batch of assets.

pub mod collapse;
pub mod cost;
pub mod fraction;
pub mod probability;

pub use collapse::{
    expected_collapse_count, CollapseAudit, CollapseOutcome, CollapseResolver, CollapseSelector,
    FirstMembersSelector, RandomSelector,
};
pub use cost::{CostAggregator, CostBreakdown};
pub use fraction::{DamageFractions, FractionCalculator};
pub use probability::{GroupingStats, ProbabilityCalculator, ProbabilityGroup, ProbabilityGroups};
