//! Result records handed to external writers

use serde::Serialize;

use crate::core_types::{Asset, WallCategory};
use crate::damage::CollapseAudit;

/// One row of the per-asset result table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageResultRow {
    pub index: usize,
    pub depth: f64,
    pub shore_distance: f64,
    pub wall_category: WallCategory,
    pub inundated: bool,
    pub struct_damage_fraction: f64,
    pub contents_damage_fraction: f64,
    pub struct_loss: f64,
    pub contents_loss: f64,
    pub collapsed: bool,
    pub collapse_probability: Option<f64>,
}

impl DamageResultRow {
    pub(crate) fn from_asset(index: usize, asset: &Asset) -> Self {
        Self {
            index,
            depth: asset.depth(),
            shore_distance: asset.shore_distance(),
            wall_category: asset.wall_category(),
            inundated: asset.is_inundated(),
            struct_damage_fraction: asset.struct_damage_fraction(),
            contents_damage_fraction: asset.contents_damage_fraction(),
            struct_loss: asset.struct_loss(),
            contents_loss: asset.contents_loss(),
            collapsed: asset.collapsed(),
            collapse_probability: asset.collapse_probability(),
        }
    }
}

/// Event-level aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EventTotals {
    pub asset_count: usize,
    pub inundated_count: usize,
    pub collapsed_count: usize,
    pub total_struct_loss: f64,
    pub total_contents_loss: f64,
}

impl EventTotals {
    /// Structure plus contents loss
    pub fn total_loss(&self) -> f64 {
        self.total_struct_loss + self.total_contents_loss
    }
}

/// Recoverable anomalies noticed during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    /// Assets with negative depth
    pub dry_count: usize,
    /// Assets excluded from collapse grouping because their probability is zero
    pub zero_probability_count: usize,
    /// Assets whose depth or distance lies exactly on a collapse bin edge
    pub bin_boundary_count: usize,
}

/// Complete output of one event run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DamageReport {
    pub rows: Vec<DamageResultRow>,
    pub totals: EventTotals,
    pub collapse_audit: Vec<CollapseAudit>,
    pub quality: DataQuality,
}
