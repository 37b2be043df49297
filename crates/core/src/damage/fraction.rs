//! Structure and contents damage fractions from inundation depth

use crate::core_types::{Asset, WallCategory};
use crate::error::DamageResult;
use crate::hazard::DamageCurves;

/// Structure and contents damage for one asset, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageFractions {
    pub structure: f64,
    pub contents: f64,
}

/// Evaluates the damage curves of each asset's wall category
#[derive(Debug, Clone, Copy)]
pub struct FractionCalculator<'a> {
    curves: &'a DamageCurves,
}

impl<'a> FractionCalculator<'a> {
    pub fn new(curves: &'a DamageCurves) -> Self {
        Self { curves }
    }

    /// Damage fractions for a single depth and category.
    ///
    /// Negative depth means the water never reached the floor: no damage.
    ///
    /// # Errors
    /// `MissingDamageCurve` when the category has no curve in the table.
    pub fn compute(&self, depth: f64, category: WallCategory) -> DamageResult<DamageFractions> {
        let structure = self.curves.structure_curve(category)?;
        let contents = self.curves.contents_curve(category)?;

        if depth < 0.0 {
            return Ok(DamageFractions::default());
        }

        Ok(DamageFractions {
            structure: structure.evaluate(depth),
            contents: contents.evaluate(depth),
        })
    }

    /// Recompute the fractions of every asset in place, clearing any
    /// previous collapse override. Returns the number of dry assets.
    ///
    /// # Errors
    /// As [`FractionCalculator::compute`]; assets are left partially updated.
    pub fn apply(&self, assets: &mut [Asset]) -> DamageResult<usize> {
        let mut dry = 0;
        for asset in assets.iter_mut() {
            let fractions = self.compute(asset.depth(), asset.wall_category())?;
            if !asset.is_inundated() {
                dry += 1;
            }
            asset.struct_damage_fraction = fractions.structure;
            asset.contents_damage_fraction = fractions.contents;
            asset.collapsed = false;
        }
        Ok(dry)
    }
}
