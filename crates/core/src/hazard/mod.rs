//! Hazard tables: calibration data linking physical exposure to damage
//!
//! - [`collapse`]: depth x shore-distance collapse probability
//! - [`curves`]: depth-damage curves per wall category
//! - [`depth`]: folding simulated depth snapshots into per-asset peaks

pub mod collapse;
pub mod curves;
pub mod depth;

pub use collapse::{CollapseLookup, CollapseTable};
pub use curves::{DamageCurve, DamageCurves};
pub use depth::{PeakDepth, PeakDepths};

use serde::{Deserialize, Serialize};

use crate::error::DamageResult;

/// The complete set of calibration tables used by one damage model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardTables {
    #[serde(default)]
    pub collapse: CollapseTable,
    #[serde(default)]
    pub curves: DamageCurves,
}

impl HazardTables {
    /// Built-in reference calibration
    pub fn reference() -> Self {
        Self::default()
    }

    /// Validate every table
    ///
    /// # Errors
    /// The first table that fails validation.
    pub fn validate(&self) -> DamageResult<()> {
        self.collapse.validate()?;
        self.curves.validate()
    }
}
