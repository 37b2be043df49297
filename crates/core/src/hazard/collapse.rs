//! Structural collapse probability table
//!
//! Two-dimensional lookup over inundation depth and distance from the
//! shoreline. Each axis is described by ascending lower bin edges; a value
//! belongs to the last bin whose edge is `<=` the value, so ties resolve to the
//! upper (inclusive) side and the last bin is unbounded. Depths below the
//! first depth edge carry no collapse risk.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, DamageError, DamageResult};

/// Result of a single collapse-probability lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseLookup {
    /// Collapse probability in `[0, 1]`
    pub probability: f64,
    /// Depth or distance sat exactly on a bin edge
    pub on_bin_edge: bool,
}

/// Depth x shore-distance collapse probability table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseTable {
    /// Lower depth edges (m), ascending
    depth_edges: Vec<f64>,
    /// Lower shore-distance edges (m), ascending
    distance_edges: Vec<f64>,
    /// `probabilities[depth_bin][distance_bin]`
    probabilities: Vec<Vec<f64>>,
}

impl CollapseTable {
    /// Build and validate a table
    ///
    /// # Errors
    /// `InvalidHazardTable` on unsorted edges, a shape mismatch or a
    /// probability outside `[0, 1]`.
    pub fn new(
        depth_edges: Vec<f64>,
        distance_edges: Vec<f64>,
        probabilities: Vec<Vec<f64>>,
    ) -> DamageResult<Self> {
        let table = Self {
            depth_edges,
            distance_edges,
            probabilities,
        };
        table.validate()?;
        Ok(table)
    }

    /// Reference table for residential structures under tsunami inundation.
    ///
    /// Depth bins start at 0.4 m; below that no collapse is expected. Beyond
    /// 250 m from the shore only deep inundation causes collapse.
    pub fn reference() -> Self {
        Self {
            depth_edges: vec![0.4, 1.0, 2.0, 3.0, 4.0],
            distance_edges: vec![0.0, 100.0, 200.0, 250.0],
            probabilities: vec![
                // 0-100m 100-200m 200-250m  250m+
                vec![0.05, 0.05, 0.05, 0.0], // 0.4-1.0 m
                vec![0.6, 0.3, 0.1, 0.0],    // 1.0-2.0 m
                vec![0.7, 0.4, 0.25, 0.05],  // 2.0-3.0 m
                vec![0.8, 0.6, 0.4, 0.3],    // 3.0-4.0 m
                vec![0.9, 0.7, 0.5, 0.45],   // 4.0 m+
            ],
        }
    }

    pub fn depth_edges(&self) -> &[f64] {
        &self.depth_edges
    }

    pub fn distance_edges(&self) -> &[f64] {
        &self.distance_edges
    }

    /// Check edge ordering, table shape and probability range
    ///
    /// # Errors
    /// See [`CollapseTable::new`].
    pub fn validate(&self) -> DamageResult<()> {
        check_edges("depth", &self.depth_edges)?;
        check_edges("distance", &self.distance_edges)?;

        if self.probabilities.len() != self.depth_edges.len() {
            return Err(DamageError::InvalidHazardTable(format!(
                "{} depth bins but {} probability rows",
                self.depth_edges.len(),
                self.probabilities.len()
            )));
        }
        for (row_index, row) in self.probabilities.iter().enumerate() {
            if row.len() != self.distance_edges.len() {
                return Err(DamageError::InvalidHazardTable(format!(
                    "row {row_index} has {} entries, expected {}",
                    row.len(),
                    self.distance_edges.len()
                )));
            }
            if let Some(p) = row.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                return Err(DamageError::InvalidHazardTable(format!(
                    "probability {p} in row {row_index} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// Collapse probability for an asset
    ///
    /// # Errors
    /// `NonFinite` when depth or distance is NaN or infinite.
    pub fn lookup(&self, index: usize, depth: f64, distance: f64) -> DamageResult<CollapseLookup> {
        let depth = ensure_finite("depth", index, depth)?;
        let distance = ensure_finite("shore_distance", index, distance)?;

        // Every depth edge separates two outcomes; the first distance edge has nothing below it.
        let on_bin_edge = self.depth_edges.contains(&depth)
            || self.distance_edges.iter().skip(1).any(|&edge| edge == distance);

        let probability = match (
            bin_index(&self.depth_edges, depth),
            bin_index(&self.distance_edges, distance),
        ) {
            (Some(row), Some(column)) => self.probabilities[row][column],
            _ => 0.0,
        };

        Ok(CollapseLookup {
            probability,
            on_bin_edge,
        })
    }
}

impl Default for CollapseTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Index of the bin containing `value`, `None` below the first edge
fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    edges.partition_point(|&edge| edge <= value).checked_sub(1)
}

fn check_edges(axis: &str, edges: &[f64]) -> DamageResult<()> {
    if edges.is_empty() {
        return Err(DamageError::InvalidHazardTable(format!("no {axis} bins")));
    }
    if let Some(edge) = edges.iter().find(|e| !e.is_finite()) {
        return Err(DamageError::InvalidHazardTable(format!(
            "{axis} edge {edge} is not finite"
        )));
    }
    if edges.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(DamageError::InvalidHazardTable(format!(
            "{axis} edges must be strictly ascending"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probability(table: &CollapseTable, depth: f64, distance: f64) -> f64 {
        table.lookup(0, depth, distance).unwrap().probability
    }

    #[test]
    fn test_reference_calibration_points() {
        let table = CollapseTable::reference();
        assert_eq!(probability(&table, 0.5, 125.0), 0.05);
        assert_eq!(probability(&table, 0.5, 250.1), 0.0);
        assert_eq!(probability(&table, 1.5, 0.0), 0.6);
        assert_eq!(probability(&table, 2.5, 150.0), 0.4);
        assert_eq!(probability(&table, 4.5, 225.0), 0.5);
        assert_eq!(probability(&table, 10000.0, 10000.0), 0.45);
        assert_eq!(probability(&table, 2.0, 251.0), 0.05);
        assert_eq!(probability(&table, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_shallow_and_dry_carry_no_risk() {
        let table = CollapseTable::reference();
        assert_eq!(probability(&table, -0.3, 0.0), 0.0);
        assert_eq!(probability(&table, 0.39, 10.0), 0.0);
    }

    #[test]
    fn test_edge_ties_use_upper_bin() {
        let table = CollapseTable::reference();
        let at_edge = table.lookup(0, 1.0, 50.0).unwrap();
        assert_eq!(at_edge.probability, 0.6);
        assert!(at_edge.on_bin_edge);

        let distance_edge = table.lookup(0, 1.5, 100.0).unwrap();
        assert_eq!(distance_edge.probability, 0.3);
        assert!(distance_edge.on_bin_edge);

        let inside = table.lookup(0, 1.5, 0.0).unwrap();
        assert!(!inside.on_bin_edge);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let table = CollapseTable::reference();
        assert!(matches!(
            table.lookup(7, f64::NAN, 10.0),
            Err(DamageError::NonFinite { field: "depth", index: 7, .. })
        ));
        assert!(matches!(
            table.lookup(2, 1.0, f64::INFINITY),
            Err(DamageError::NonFinite { field: "shore_distance", .. })
        ));
    }

    #[test]
    fn test_invalid_tables_rejected() {
        assert!(CollapseTable::new(vec![1.0, 0.5], vec![0.0], vec![vec![0.1], vec![0.2]]).is_err());
        assert!(CollapseTable::new(vec![0.5], vec![0.0, 10.0], vec![vec![0.1]]).is_err());
        assert!(CollapseTable::new(vec![0.5], vec![0.0], vec![vec![1.5]]).is_err());
        assert!(CollapseTable::new(vec![], vec![0.0], vec![]).is_err());
        assert!(CollapseTable::new(vec![0.5], vec![0.0], vec![vec![0.5]]).is_ok());
        assert!(CollapseTable::reference().validate().is_ok());
    }
}
