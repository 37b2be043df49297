//! A single built structure exposed to one inundation event.

use serde::Serialize;

use super::wall::WallCategory;
use crate::error::{ensure_finite, ensure_non_negative, DamageResult};

/// One asset of an event: validated exposure inputs plus the engine-derived state.
///
/// Inputs are fixed at construction. Derived fields are written only by the
/// damage model phases and exposed read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    depth: f64,
    shore_distance: f64,
    wall_category: WallCategory,
    struct_cost: f64,
    content_cost: f64,

    pub(crate) struct_damage_fraction: f64,
    pub(crate) contents_damage_fraction: f64,
    pub(crate) struct_loss: f64,
    pub(crate) contents_loss: f64,
    pub(crate) collapsed: bool,
    pub(crate) collapse_probability: Option<f64>,
    /// Curve fractions hidden by a collapse override
    #[serde(skip)]
    pre_collapse: (f64, f64),
}

impl Asset {
    /// Validate and build an asset. `index` is only used in error messages.
    ///
    /// # Errors
    /// Non-finite depth, or negative/non-finite distance or costs.
    pub fn new(
        index: usize,
        depth: f64,
        shore_distance: f64,
        wall_category: WallCategory,
        struct_cost: f64,
        content_cost: f64,
    ) -> DamageResult<Self> {
        Ok(Self {
            depth: ensure_finite("depth", index, depth)?,
            shore_distance: ensure_non_negative("shore_distance", index, shore_distance)?,
            wall_category,
            struct_cost: ensure_non_negative("struct_cost", index, struct_cost)?,
            content_cost: ensure_non_negative("content_cost", index, content_cost)?,
            struct_damage_fraction: 0.0,
            contents_damage_fraction: 0.0,
            struct_loss: 0.0,
            contents_loss: 0.0,
            collapsed: false,
            collapse_probability: None,
            pre_collapse: (0.0, 0.0),
        })
    }

    /// Peak inundation depth (m); negative means the asset stayed dry
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Distance from the shoreline (m)
    pub fn shore_distance(&self) -> f64 {
        self.shore_distance
    }

    pub fn wall_category(&self) -> WallCategory {
        self.wall_category
    }

    /// Structure replacement value
    pub fn struct_cost(&self) -> f64 {
        self.struct_cost
    }

    /// Contents replacement value
    pub fn content_cost(&self) -> f64 {
        self.content_cost
    }

    /// Water reached the asset (depth at or above floor level)
    pub fn is_inundated(&self) -> bool {
        self.depth >= 0.0
    }

    pub fn struct_damage_fraction(&self) -> f64 {
        self.struct_damage_fraction
    }

    pub fn contents_damage_fraction(&self) -> f64 {
        self.contents_damage_fraction
    }

    pub fn struct_loss(&self) -> f64 {
        self.struct_loss
    }

    pub fn contents_loss(&self) -> f64 {
        self.contents_loss
    }

    /// Resolved as a total loss by the collapse resolver
    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    /// Looked-up collapse probability, `None` when the asset carries no collapse risk
    pub fn collapse_probability(&self) -> Option<f64> {
        self.collapse_probability
    }

    /// Force both fractions to a total loss
    pub(crate) fn mark_collapsed(&mut self) {
        if !self.collapsed {
            self.pre_collapse = (self.struct_damage_fraction, self.contents_damage_fraction);
        }
        self.collapsed = true;
        self.struct_damage_fraction = 1.0;
        self.contents_damage_fraction = 1.0;
    }

    /// Undo [`Self::mark_collapsed`], restoring the curve fractions
    pub(crate) fn clear_collapse(&mut self) {
        if self.collapsed {
            (self.struct_damage_fraction, self.contents_damage_fraction) = self.pre_collapse;
            self.collapsed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DamageError;

    #[test]
    fn test_asset_creation() {
        let asset = Asset::new(0, 1.2, 80.0, WallCategory::Timber, 150000.0, 76000.0).unwrap();
        assert_eq!(asset.depth(), 1.2);
        assert_eq!(asset.shore_distance(), 80.0);
        assert_eq!(asset.wall_category(), WallCategory::Timber);
        assert!(asset.is_inundated());
        assert!(!asset.collapsed());
        assert_eq!(asset.struct_damage_fraction(), 0.0);
        assert_eq!(asset.collapse_probability(), None);
    }

    #[test]
    fn test_dry_asset_not_inundated() {
        let asset = Asset::new(0, -0.3, 0.0, WallCategory::DoubleBrick, 1.0, 1.0).unwrap();
        assert!(!asset.is_inundated());
        let wet = Asset::new(1, 0.0, 0.0, WallCategory::DoubleBrick, 1.0, 1.0).unwrap();
        assert!(wet.is_inundated());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(matches!(
            Asset::new(3, f64::NAN, 0.0, WallCategory::Timber, 1.0, 1.0),
            Err(DamageError::NonFinite { field: "depth", index: 3, .. })
        ));
        assert!(matches!(
            Asset::new(1, 0.5, -1.0, WallCategory::Timber, 1.0, 1.0),
            Err(DamageError::NegativeValue { field: "shore_distance", .. })
        ));
        assert!(matches!(
            Asset::new(2, 0.5, 1.0, WallCategory::Timber, 1.0, -10.0),
            Err(DamageError::NegativeValue { field: "content_cost", .. })
        ));
    }

    #[test]
    fn test_mark_collapsed_forces_total_loss() {
        let mut asset = Asset::new(0, 2.0, 10.0, WallCategory::BrickVeneer, 1.0, 1.0).unwrap();
        asset.struct_damage_fraction = 0.63;
        asset.contents_damage_fraction = 0.98;
        asset.mark_collapsed();
        assert!(asset.collapsed());
        assert_eq!(asset.struct_damage_fraction(), 1.0);
        assert_eq!(asset.contents_damage_fraction(), 1.0);
    }

    #[test]
    fn test_clear_collapse_restores_curve_fractions() {
        let mut asset = Asset::new(0, 2.0, 10.0, WallCategory::BrickVeneer, 1.0, 1.0).unwrap();
        asset.struct_damage_fraction = 0.633;
        asset.contents_damage_fraction = 0.986;
        asset.mark_collapsed();
        asset.mark_collapsed();
        asset.clear_collapse();
        assert!(!asset.collapsed());
        assert_eq!(asset.struct_damage_fraction(), 0.633);
        assert_eq!(asset.contents_damage_fraction(), 0.986);

        // Clearing an intact asset leaves it alone
        asset.clear_collapse();
        assert_eq!(asset.struct_damage_fraction(), 0.633);
    }
}
