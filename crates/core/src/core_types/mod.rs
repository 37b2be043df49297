//! Core data types shared by the hazard tables and the damage model.

pub mod asset;
pub mod wall;

pub use asset::Asset;
pub use wall::WallCategory;
