//! Peak inundation depth per asset
//!
//! The hydrodynamic model reports water depth at each asset for a sequence of
//! output times (possibly across several simulated events). The damage model
//! needs only the largest depth each asset experiences, so snapshots are
//! folded as they arrive rather than stored.

use crate::error::{ensure_finite, DamageError, DamageResult};

/// Running per-asset maximum over depth snapshots
#[derive(Debug, Clone)]
pub struct PeakDepth {
    depths: Vec<f64>,
    times: Vec<f64>,
    snapshots: usize,
}

/// Folded peak depths and the time each peak was first reached
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDepths {
    pub depths: Vec<f64>,
    pub times: Vec<f64>,
}

impl PeakDepth {
    /// Tracker for `asset_count` assets
    pub fn new(asset_count: usize) -> Self {
        Self {
            depths: vec![f64::NEG_INFINITY; asset_count],
            times: vec![f64::NAN; asset_count],
            snapshots: 0,
        }
    }

    /// Number of snapshots folded so far
    pub fn snapshot_count(&self) -> usize {
        self.snapshots
    }

    /// Fold one snapshot of depths taken at `time`
    ///
    /// # Errors
    /// `LengthMismatch` when the snapshot does not cover every asset,
    /// `NonFinite` on NaN/infinite depth or time. A rejected snapshot leaves
    /// the tracker unchanged.
    pub fn observe(&mut self, time: f64, depths: &[f64]) -> DamageResult<()> {
        if depths.len() != self.depths.len() {
            return Err(DamageError::LengthMismatch {
                field: "depth snapshot",
                expected: self.depths.len(),
                actual: depths.len(),
            });
        }
        let time = ensure_finite("time", self.snapshots, time)?;
        // Reject the whole snapshot before folding any of it
        for (index, &depth) in depths.iter().enumerate() {
            ensure_finite("depth", index, depth)?;
        }
        for (index, &depth) in depths.iter().enumerate() {
            // Strict comparison keeps the earliest time of a repeated peak
            if depth > self.depths[index] {
                self.depths[index] = depth;
                self.times[index] = time;
            }
        }
        self.snapshots += 1;
        Ok(())
    }

    /// Fold a snapshot given as water surface elevation over ground elevation
    ///
    /// # Errors
    /// Same as [`PeakDepth::observe`].
    pub fn observe_stage(&mut self, time: f64, stage: &[f64], elevation: &[f64]) -> DamageResult<()> {
        if stage.len() != elevation.len() {
            return Err(DamageError::LengthMismatch {
                field: "elevation",
                expected: stage.len(),
                actual: elevation.len(),
            });
        }
        let depths: Vec<f64> = stage.iter().zip(elevation).map(|(s, z)| s - z).collect();
        self.observe(time, &depths)
    }

    /// Peak depth per asset
    ///
    /// # Errors
    /// `EmptyTimeline` if nothing was observed.
    pub fn finish(self) -> DamageResult<PeakDepths> {
        if self.snapshots == 0 {
            return Err(DamageError::EmptyTimeline);
        }
        Ok(PeakDepths {
            depths: self.depths,
            times: self.times,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_over_timeline() {
        let mut peak = PeakDepth::new(3);
        peak.observe(0.0, &[0.3, -0.5, 0.0]).unwrap();
        peak.observe(2.0, &[-0.3, 0.2, 0.0]).unwrap();
        peak.observe(4.0, &[0.1, 0.1, -1.0]).unwrap();
        assert_eq!(peak.snapshot_count(), 3);

        let result = peak.finish().unwrap();
        assert_eq!(result.depths, vec![0.3, 0.2, 0.0]);
        assert_eq!(result.times, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_stage_minus_elevation() {
        let mut peak = PeakDepth::new(2);
        peak.observe_stage(0.0, &[0.3, 0.3], &[-5.5, 0.5]).unwrap();
        peak.observe_stage(2.0, &[-0.3, -0.3], &[-5.5, 0.0]).unwrap();
        let result = peak.finish().unwrap();
        assert!((result.depths[0] - 5.8).abs() < 1e-12);
        assert!((result.depths[1] + 0.2).abs() < 1e-12);
        assert_eq!(result.times, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_timeline_rejected() {
        assert!(matches!(PeakDepth::new(2).finish(), Err(DamageError::EmptyTimeline)));
    }

    #[test]
    fn test_snapshot_validation() {
        let mut peak = PeakDepth::new(2);
        assert!(matches!(
            peak.observe(0.0, &[1.0]),
            Err(DamageError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(peak.observe(0.0, &[1.0, f64::NAN]).is_err());
        assert!(peak.observe_stage(0.0, &[1.0, 1.0], &[0.0]).is_err());
    }

    #[test]
    fn test_rejected_snapshot_not_folded() {
        let mut peak = PeakDepth::new(3);
        peak.observe(0.0, &[0.2, 0.2, 0.2]).unwrap();
        assert!(matches!(
            peak.observe(5.0, &[3.0, 3.0, f64::INFINITY]),
            Err(DamageError::NonFinite { field: "depth", index: 2, .. })
        ));
        assert_eq!(peak.snapshot_count(), 1);

        let result = peak.finish().unwrap();
        assert_eq!(result.depths, vec![0.2, 0.2, 0.2]);
        assert_eq!(result.times, vec![0.0, 0.0, 0.0]);
    }
}
