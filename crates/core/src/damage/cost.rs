//! Monetary loss from damage fractions and replacement costs

use crate::core_types::Asset;
use crate::error::{DamageError, DamageResult};

/// Per-asset and event-total losses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostBreakdown {
    pub struct_loss: Vec<f64>,
    pub contents_loss: Vec<f64>,
    pub total_struct_loss: f64,
    pub total_contents_loss: f64,
}

/// Converts damage fractions into losses: `loss = fraction * cost`
#[derive(Debug, Clone, Copy, Default)]
pub struct CostAggregator;

impl CostAggregator {
    /// Losses for every asset, structure and contents independently
    ///
    /// # Errors
    /// `FractionOutOfRange` when a fraction is NaN or outside `[0, 1]`.
    pub fn compute(&self, assets: &[Asset]) -> DamageResult<CostBreakdown> {
        let mut breakdown = CostBreakdown {
            struct_loss: Vec::with_capacity(assets.len()),
            contents_loss: Vec::with_capacity(assets.len()),
            ..CostBreakdown::default()
        };

        for (index, asset) in assets.iter().enumerate() {
            let structure = check_fraction("structure", index, asset.struct_damage_fraction())?;
            let contents = check_fraction("contents", index, asset.contents_damage_fraction())?;

            let struct_loss = structure * asset.struct_cost();
            let contents_loss = contents * asset.content_cost();

            breakdown.total_struct_loss += struct_loss;
            breakdown.total_contents_loss += contents_loss;
            breakdown.struct_loss.push(struct_loss);
            breakdown.contents_loss.push(contents_loss);
        }

        Ok(breakdown)
    }

    /// Compute losses and store them on the assets
    ///
    /// # Errors
    /// As [`CostAggregator::compute`]; assets are untouched on error.
    pub fn apply(&self, assets: &mut [Asset]) -> DamageResult<CostBreakdown> {
        let breakdown = self.compute(assets)?;
        for ((asset, &structure), &contents) in assets
            .iter_mut()
            .zip(&breakdown.struct_loss)
            .zip(&breakdown.contents_loss)
        {
            asset.struct_loss = structure;
            asset.contents_loss = contents;
        }
        Ok(breakdown)
    }
}

fn check_fraction(field: &'static str, index: usize, value: f64) -> DamageResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DamageError::FractionOutOfRange {
            field,
            index,
            value,
        })
    }
}
