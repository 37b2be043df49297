//! Flood Damage Core Library
//!
//! Estimates structural and contents losses to buildings exposed to a
//! simulated flood or tsunami. For every asset the engine takes the peak
//! inundation depth, distance from the shoreline, wall construction and
//! replacement values, and produces damage fractions, monetary losses and a
//! stochastically resolved collapse outcome.
//!
//! ## Pipeline
//!
//! - Depth-damage curves per wall category give continuous damage fractions
//! - A depth x shore-distance table gives each asset a collapse probability
//! - Assets sharing a probability `p` form a group of size `n`; exactly
//!   `round(p * n)` of them collapse, the members chosen at random
//! - Fractions (collapse forced to 1.0) times replacement values give losses
//!
//! Hydrodynamic simulation, mesh handling and GIS export live outside this
//! crate; it consumes extracted depths and returns plain records.

// Core types and utilities
pub mod core_types;
pub mod error;

// Calibration tables and the damage engine
pub mod damage;
pub mod hazard;

// Event orchestration and tabular surfaces
pub mod exposure;
pub mod model;

pub use core_types::{Asset, WallCategory};
pub use damage::{
    CollapseAudit, CollapseOutcome, CollapseSelector, FirstMembersSelector, ProbabilityGroups,
    RandomSelector,
};
pub use error::{DamageError, DamageResult};
pub use exposure::{write_results, ExposureRecord, ExposureTable};
pub use hazard::{CollapseTable, DamageCurve, DamageCurves, HazardTables, PeakDepth};
pub use model::{DamageModelConfig, DamageReport, DamageResultRow, EventDamageModel, EventTotals};
