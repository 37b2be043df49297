//! Error type shared by every fallible damage-model operation.
//!
//! Precondition violations abort the computation for the whole event. Data
//! quality anomalies (bin-edge ties, dry assets, zero collapse probability)
//! are not errors; they are counted in [`crate::model::DataQuality`].

use crate::core_types::WallCategory;

/// Convenience alias used throughout the crate.
pub type DamageResult<T> = Result<T, DamageError>;

/// Errors raised by the damage model and its table/exposure surfaces.
#[derive(Debug, thiserror::Error)]
pub enum DamageError {
    #[error("field `{field}` has {actual} values, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("field `{field}` at asset {index} is not finite ({value})")]
    NonFinite {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("field `{field}` at asset {index} is negative ({value})")]
    NegativeValue {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("unknown wall category `{0}`")]
    UnknownWallCategory(String),

    #[error("no {kind} damage curve registered for {category}")]
    MissingDamageCurve {
        kind: &'static str,
        category: WallCategory,
    },

    #[error("{field} damage fraction at asset {index} is outside [0, 1] ({value})")]
    FractionOutOfRange {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("asset index {index} is out of range for {asset_count} assets")]
    UnknownAssetIndex { index: usize, asset_count: usize },

    #[error("asset {index} appears in more than one probability group")]
    DuplicateAssetIndex { index: usize },

    #[error("collapse selector returned an invalid selection for probability {probability}: {reason}")]
    InvalidSelection { probability: f64, reason: String },

    #[error("invalid collapse table: {0}")]
    InvalidHazardTable(String),

    #[error("invalid damage curve: {0}")]
    InvalidDamageCurve(String),

    #[error("peak depth requested before any depth snapshot was observed")]
    EmptyTimeline,

    #[error("exposure row {row} has no MAX_DEPTH value and no depth column was supplied")]
    MissingDepth { row: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Reject NaN and infinities for a named per-asset field.
pub(crate) fn ensure_finite(field: &'static str, index: usize, value: f64) -> DamageResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DamageError::NonFinite {
            field,
            index,
            value,
        })
    }
}

/// Reject non-finite and negative values for a named per-asset field.
pub(crate) fn ensure_non_negative(
    field: &'static str,
    index: usize,
    value: f64,
) -> DamageResult<f64> {
    let value = ensure_finite(field, index, value)?;
    if value < 0.0 {
        return Err(DamageError::NegativeValue {
            field,
            index,
            value,
        });
    }
    Ok(value)
}
