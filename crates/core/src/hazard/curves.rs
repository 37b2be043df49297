//! Depth-damage vulnerability curves
//!
//! Each curve is a table of `(depth, fraction)` knots evaluated by linear
//! interpolation. Below the first knot the first fraction applies, beyond the
//! last knot the last fraction applies. Evaluating exactly at a knot returns
//! the tabulated fraction unchanged, so calibration points reproduce exactly.
//!
//! Curves are keyed by [`WallCategory`]. Adding or replacing a category's curve
//! is a table edit (see [`DamageCurves::reference`] or a JSON config), not a
//! code change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core_types::WallCategory;
use crate::error::{DamageError, DamageResult};

/// Piecewise-linear depth (m) to damage fraction curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageCurve {
    knots: Vec<(f64, f64)>,
}

impl DamageCurve {
    /// Build and validate a curve from `(depth, fraction)` knots
    ///
    /// # Errors
    /// Returns `InvalidDamageCurve` if the knots are empty, not strictly
    /// ascending in depth, or the fractions leave `[0, 1]` or decrease.
    pub fn new(knots: Vec<(f64, f64)>) -> DamageResult<Self> {
        let curve = Self { knots };
        curve.validate()?;
        Ok(curve)
    }

    pub fn knots(&self) -> &[(f64, f64)] {
        &self.knots
    }

    /// Check the curve invariants
    ///
    /// # Errors
    /// See [`DamageCurve::new`].
    pub fn validate(&self) -> DamageResult<()> {
        if self.knots.is_empty() {
            return Err(DamageError::InvalidDamageCurve("curve has no knots".into()));
        }
        for &(depth, fraction) in &self.knots {
            if !depth.is_finite() {
                return Err(DamageError::InvalidDamageCurve(format!(
                    "knot depth {depth} is not finite"
                )));
            }
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DamageError::InvalidDamageCurve(format!(
                    "fraction {fraction} at depth {depth} is outside [0, 1]"
                )));
            }
        }
        for pair in self.knots.windows(2) {
            let (d0, f0) = pair[0];
            let (d1, f1) = pair[1];
            if d1 <= d0 {
                return Err(DamageError::InvalidDamageCurve(format!(
                    "knot depths must be strictly ascending ({d0} then {d1})"
                )));
            }
            if f1 < f0 {
                return Err(DamageError::InvalidDamageCurve(format!(
                    "fraction decreases from {f0} to {f1} between {d0} m and {d1} m"
                )));
            }
        }
        Ok(())
    }

    /// Damage fraction at `depth`
    pub fn evaluate(&self, depth: f64) -> f64 {
        // Number of knots at or below the requested depth
        let above = self.knots.partition_point(|&(d, _)| d <= depth);
        if above == 0 {
            return self.knots[0].1;
        }
        let (d0, f0) = self.knots[above - 1];
        if above == self.knots.len() || d0 == depth {
            return f0;
        }
        let (d1, f1) = self.knots[above];
        let t = (depth - d0) / (d1 - d0);
        (f0 + t * (f1 - f0)).clamp(0.0, 1.0)
    }
}

/// Structure and contents curves per wall category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageCurves {
    pub structure: BTreeMap<WallCategory, DamageCurve>,
    pub contents: BTreeMap<WallCategory, DamageCurve>,
}

impl DamageCurves {
    /// Residential vulnerability curves used for Australian coastal studies.
    ///
    /// Timber-framed houses share the brick veneer structural curve; all
    /// categories share one contents curve.
    pub fn reference() -> Self {
        let double_brick = DamageCurve {
            knots: vec![
                (0.0, 0.016),
                (0.1, 0.150),
                (0.3, 0.425),
                (0.5, 0.449),
                (1.0, 0.572),
                (1.5, 0.582),
                (2.0, 0.587),
                (2.5, 0.647),
                (5.0, 1.0),
            ],
        };
        let brick_veneer = DamageCurve {
            knots: vec![
                (0.0, 0.016),
                (0.1, 0.169),
                (0.3, 0.445),
                (0.5, 0.472),
                (1.0, 0.618),
                (1.5, 0.629),
                (2.0, 0.633),
                (2.5, 0.694),
                (5.0, 1.0),
            ],
        };
        let contents = DamageCurve {
            knots: vec![
                (0.0, 0.013),
                (0.1, 0.102),
                (0.3, 0.381),
                (0.5, 0.500),
                (1.0, 0.970),
                (1.5, 0.976),
                (2.0, 0.986),
                (3.0, 1.0),
            ],
        };

        let structure = BTreeMap::from([
            (WallCategory::DoubleBrick, double_brick),
            (WallCategory::Timber, brick_veneer.clone()),
            (WallCategory::BrickVeneer, brick_veneer),
        ]);
        let contents = WallCategory::ALL
            .into_iter()
            .map(|category| (category, contents.clone()))
            .collect();

        Self {
            structure,
            contents,
        }
    }

    /// Structural curve for a category
    ///
    /// # Errors
    /// `MissingDamageCurve` when the table has no entry for `category`.
    pub fn structure_curve(&self, category: WallCategory) -> DamageResult<&DamageCurve> {
        self.structure
            .get(&category)
            .ok_or(DamageError::MissingDamageCurve {
                kind: "structure",
                category,
            })
    }

    /// Contents curve for a category
    ///
    /// # Errors
    /// `MissingDamageCurve` when the table has no entry for `category`.
    pub fn contents_curve(&self, category: WallCategory) -> DamageResult<&DamageCurve> {
        self.contents
            .get(&category)
            .ok_or(DamageError::MissingDamageCurve {
                kind: "contents",
                category,
            })
    }

    /// Validate every curve in the table
    ///
    /// # Errors
    /// The first curve that fails [`DamageCurve::validate`].
    pub fn validate(&self) -> DamageResult<()> {
        self.structure
            .values()
            .chain(self.contents.values())
            .try_for_each(DamageCurve::validate)
    }
}

impl Default for DamageCurves {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_calibration_points() {
        let curves = DamageCurves::reference();
        let db = curves.structure_curve(WallCategory::DoubleBrick).unwrap();
        let timber = curves.structure_curve(WallCategory::Timber).unwrap();
        let veneer = curves.structure_curve(WallCategory::BrickVeneer).unwrap();
        let contents = curves.contents_curve(WallCategory::Timber).unwrap();

        assert_eq!(db.evaluate(0.0), 0.016);
        assert_eq!(timber.evaluate(0.0), 0.016);
        assert_eq!(contents.evaluate(0.0), 0.013);
        assert_eq!(db.evaluate(1.0), 0.572);
        assert_eq!(timber.evaluate(1.0), 0.618);
        assert_eq!(veneer.evaluate(1.0), 0.618);
        assert_eq!(contents.evaluate(1.0), 0.970);
    }

    #[test]
    fn test_masonry_less_sensitive_when_shallow() {
        let curves = DamageCurves::reference();
        let db = curves.structure_curve(WallCategory::DoubleBrick).unwrap();
        let veneer = curves.structure_curve(WallCategory::BrickVeneer).unwrap();
        for depth in [0.05, 0.1, 0.2, 0.4] {
            assert!(db.evaluate(depth) < veneer.evaluate(depth), "depth {depth}");
        }
    }

    #[test]
    fn test_interpolation_and_clamping() {
        let curve = DamageCurve::new(vec![(0.0, 0.0), (1.0, 0.5), (2.0, 1.0)]).unwrap();
        assert_relative_eq!(curve.evaluate(0.5), 0.25);
        assert_relative_eq!(curve.evaluate(1.5), 0.75);
        assert_eq!(curve.evaluate(-4.0), 0.0);
        assert_eq!(curve.evaluate(10000.0), 1.0);
    }

    #[test]
    fn test_monotone_and_bounded() {
        let curves = DamageCurves::reference();
        for curve in curves.structure.values().chain(curves.contents.values()) {
            let mut previous = 0.0;
            for step in 0..600 {
                let value = curve.evaluate(f64::from(step) * 0.01);
                assert!((0.0..=1.0).contains(&value));
                assert!(value >= previous);
                previous = value;
            }
            assert_eq!(curve.evaluate(1.0e6), 1.0);
        }
    }

    #[test]
    fn test_invalid_curves_rejected() {
        assert!(DamageCurve::new(vec![]).is_err());
        assert!(DamageCurve::new(vec![(0.0, 0.1), (0.0, 0.2)]).is_err());
        assert!(DamageCurve::new(vec![(0.0, 0.5), (1.0, 0.2)]).is_err());
        assert!(DamageCurve::new(vec![(0.0, 1.2)]).is_err());
        assert!(DamageCurve::new(vec![(f64::NAN, 0.2)]).is_err());
    }

    #[test]
    fn test_missing_category_reported() {
        let mut curves = DamageCurves::reference();
        curves.structure.remove(&WallCategory::Timber);
        assert!(matches!(
            curves.structure_curve(WallCategory::Timber),
            Err(DamageError::MissingDamageCurve {
                kind: "structure",
                category: WallCategory::Timber
            })
        ));
    }
}
