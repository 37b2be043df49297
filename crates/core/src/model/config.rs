//! Damage model configuration
//!
//! Everything a run depends on besides the assets themselves: the hazard
//! tables, the collapse random seed and the audit verbosity. Loaded from JSON;
//! omitted fields fall back to the reference calibration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DamageResult;
use crate::hazard::HazardTables;

/// Configuration for one [`super::EventDamageModel`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageModelConfig {
    /// Collapse table and damage curves
    pub hazard: HazardTables,
    /// Seed for collapse selection; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Log every collapse group at info level
    pub verbose: bool,
}

impl DamageModelConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    /// `Json` on malformed input, table errors from [`HazardTables::validate`].
    pub fn from_json_str(json: &str) -> DamageResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.hazard.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> DamageResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
