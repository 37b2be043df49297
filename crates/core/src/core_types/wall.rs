//! Construction (wall) categories
//!
//! The category selects which vulnerability curves apply to an asset. Exposure
//! databases carry it as free text ("Double Brick", "Brick Veneer", ...), so
//! parsing is forgiving about case, spacing and separators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DamageError;

/// Wall construction class of a built asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WallCategory {
    /// Double (cavity) brick masonry walls
    DoubleBrick,
    /// Timber frame with timber or fibre-cement cladding
    Timber,
    /// Timber frame with a single brick skin
    BrickVeneer,
}

impl WallCategory {
    /// Every known category, in declaration order
    pub const ALL: [WallCategory; 3] = [
        WallCategory::DoubleBrick,
        WallCategory::Timber,
        WallCategory::BrickVeneer,
    ];

    /// Name as written in exposure databases
    pub fn name(&self) -> &'static str {
        match self {
            WallCategory::DoubleBrick => "Double Brick",
            WallCategory::Timber => "Timber",
            WallCategory::BrickVeneer => "Brick Veneer",
        }
    }

    /// Masonry walls resist shallow inundation better than framed ones
    pub fn is_masonry(&self) -> bool {
        matches!(self, WallCategory::DoubleBrick)
    }
}

impl fmt::Display for WallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WallCategory {
    type Err = DamageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "doublebrick" => Ok(WallCategory::DoubleBrick),
            "timber" => Ok(WallCategory::Timber),
            "brickveneer" => Ok(WallCategory::BrickVeneer),
            _ => Err(DamageError::UnknownWallCategory(s.trim().to_string())),
        }
    }
}
