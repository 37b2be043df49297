//! Event damage model: the orchestrator over one event's asset batch
//!
//! Phases run in order, each mutating the assets in place:
//! 1. [`EventDamageModel::calc_damage_percentages`]
//! 2. [`EventDamageModel::calc_collapse_probability`]
//! 3. [`EventDamageModel::calc_collapse_structures`] (overrides fractions)
//! 4. [`EventDamageModel::calc_cost`]
//!
//! [`EventDamageModel::calc_damage_and_costs`] runs all four and returns the
//! result table. Any phase error aborts the pipeline; the model state is then
//! not guaranteed consistent and the run should be discarded.

pub mod config;
pub mod results;

pub use config::DamageModelConfig;
pub use results::{DamageReport, DamageResultRow, DataQuality, EventTotals};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::core_types::{Asset, WallCategory};
use crate::damage::{
    CollapseAudit, CollapseOutcome, CollapseResolver, CollapseSelector, CostAggregator,
    FractionCalculator, ProbabilityCalculator, ProbabilityGroups, RandomSelector,
};
use crate::error::{DamageError, DamageResult};
use crate::hazard::HazardTables;

/// Loss estimate for one inundation event
#[derive(Debug, Clone)]
pub struct EventDamageModel {
    assets: Vec<Asset>,
    hazard: HazardTables,
    resolver: CollapseResolver,
    selector: RandomSelector<ChaCha8Rng>,
    quality: DataQuality,
    collapse_audit: Vec<CollapseAudit>,
    totals: EventTotals,
}

impl EventDamageModel {
    /// Build a model from parallel per-asset arrays with the reference tables
    ///
    /// # Errors
    /// `LengthMismatch` if the arrays differ in length, plus any
    /// [`Asset::new`] validation error.
    pub fn new(
        depths: &[f64],
        shore_distances: &[f64],
        walls: &[WallCategory],
        struct_costs: &[f64],
        content_costs: &[f64],
    ) -> DamageResult<Self> {
        Self::with_config(
            depths,
            shore_distances,
            walls,
            struct_costs,
            content_costs,
            DamageModelConfig::default(),
        )
    }

    /// Build a model from parallel per-asset arrays
    ///
    /// # Errors
    /// As [`EventDamageModel::new`], plus hazard table validation errors.
    pub fn with_config(
        depths: &[f64],
        shore_distances: &[f64],
        walls: &[WallCategory],
        struct_costs: &[f64],
        content_costs: &[f64],
        config: DamageModelConfig,
    ) -> DamageResult<Self> {
        let expected = depths.len();
        check_len("shore_distance", expected, shore_distances.len())?;
        check_len("wall_category", expected, walls.len())?;
        check_len("struct_cost", expected, struct_costs.len())?;
        check_len("content_cost", expected, content_costs.len())?;

        let assets = (0..expected)
            .map(|i| {
                Asset::new(
                    i,
                    depths[i],
                    shore_distances[i],
                    walls[i],
                    struct_costs[i],
                    content_costs[i],
                )
            })
            .collect::<DamageResult<Vec<_>>>()?;

        Self::from_assets(assets, config)
    }

    /// Build a model from free-text wall categories as found in exposure data
    ///
    /// # Errors
    /// `UnknownWallCategory` for unrecognised names, otherwise as
    /// [`EventDamageModel::with_config`].
    pub fn from_raw<S: AsRef<str>>(
        depths: &[f64],
        shore_distances: &[f64],
        walls: &[S],
        struct_costs: &[f64],
        content_costs: &[f64],
        config: DamageModelConfig,
    ) -> DamageResult<Self> {
        let walls = walls
            .iter()
            .map(|w| w.as_ref().parse())
            .collect::<DamageResult<Vec<WallCategory>>>()?;
        Self::with_config(
            depths,
            shore_distances,
            &walls,
            struct_costs,
            content_costs,
            config,
        )
    }

    /// Build a model from already validated assets
    ///
    /// # Errors
    /// Hazard table validation errors.
    pub fn from_assets(assets: Vec<Asset>, config: DamageModelConfig) -> DamageResult<Self> {
        config.hazard.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        info!(
            "Creating event damage model for {} assets (seed: {:?})",
            assets.len(),
            config.seed
        );

        Ok(Self {
            totals: EventTotals {
                asset_count: assets.len(),
                ..EventTotals::default()
            },
            assets,
            hazard: config.hazard,
            resolver: CollapseResolver::new(config.verbose),
            selector: RandomSelector::new(rng),
            quality: DataQuality::default(),
            collapse_audit: Vec::new(),
        })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn hazard(&self) -> &HazardTables {
        &self.hazard
    }

    /// Toggle info-level collapse audit logging
    pub fn set_verbose(&mut self, verbose: bool) {
        self.resolver = CollapseResolver::new(verbose);
    }

    /// Structural damage fraction per asset
    pub fn struct_damage(&self) -> Vec<f64> {
        self.assets.iter().map(Asset::struct_damage_fraction).collect()
    }

    /// Contents damage fraction per asset
    pub fn contents_damage(&self) -> Vec<f64> {
        self.assets.iter().map(Asset::contents_damage_fraction).collect()
    }

    /// Structural loss per asset (after [`Self::calc_cost`])
    pub fn struct_loss(&self) -> Vec<f64> {
        self.assets.iter().map(Asset::struct_loss).collect()
    }

    /// Contents loss per asset (after [`Self::calc_cost`])
    pub fn contents_loss(&self) -> Vec<f64> {
        self.assets.iter().map(Asset::contents_loss).collect()
    }

    pub fn totals(&self) -> EventTotals {
        self.totals
    }

    pub fn quality(&self) -> DataQuality {
        self.quality
    }

    /// Phase 1: continuous damage fractions from depth and wall category.
    ///
    /// Clears collapse overrides from any earlier run.
    ///
    /// # Errors
    /// `MissingDamageCurve` if a category has no curve.
    pub fn calc_damage_percentages(&mut self) -> DamageResult<()> {
        let dry = FractionCalculator::new(&self.hazard.curves).apply(&mut self.assets)?;
        self.quality.dry_count = dry;
        self.totals.inundated_count = self.assets.len() - dry;
        self.totals.collapsed_count = 0;

        debug!(
            "Damage fractions computed: {} inundated, {} dry",
            self.totals.inundated_count, dry
        );
        Ok(())
    }

    /// Phase 2: collapse probability per asset, grouped by value.
    ///
    /// Assets with zero probability are left out of the groups.
    ///
    /// # Errors
    /// `NonFinite` for an invalid depth or distance.
    pub fn calc_collapse_probability(&mut self) -> DamageResult<ProbabilityGroups> {
        let (groups, stats) =
            ProbabilityCalculator::new(&self.hazard.collapse).group(&self.assets)?;

        for asset in &mut self.assets {
            asset.collapse_probability = None;
        }
        for group in groups.iter() {
            for &index in &group.members {
                self.assets[index].collapse_probability = Some(group.probability);
            }
        }

        self.quality.zero_probability_count = stats.zero_probability;
        self.quality.bin_boundary_count = stats.bin_edge;

        debug!(
            "Collapse probabilities: {} groups covering {} assets",
            groups.len(),
            groups.member_count()
        );
        Ok(groups)
    }

    /// Phase 3: collapse exactly `round(p * n)` members of every group, chosen
    /// by the model's own seeded random source.
    ///
    /// Collapses from an earlier call are undone first, so a rerun redraws
    /// which members collapse without changing how many.
    ///
    /// # Errors
    /// `UnknownAssetIndex` if a group names an asset the model does not hold,
    /// `DuplicateAssetIndex` if an asset sits in two groups, and
    /// `InvalidSelection` from the resolver. Assets are untouched on error.
    pub fn calc_collapse_structures(
        &mut self,
        groups: &ProbabilityGroups,
    ) -> DamageResult<CollapseOutcome> {
        let outcome =
            resolve_into(&mut self.assets, groups, &self.resolver, &mut self.selector)?;
        self.record_outcome(&outcome);
        Ok(outcome)
    }

    /// Phase 3 with an injected selector
    ///
    /// # Errors
    /// As [`Self::calc_collapse_structures`].
    pub fn calc_collapse_structures_with<S: CollapseSelector + ?Sized>(
        &mut self,
        groups: &ProbabilityGroups,
        selector: &mut S,
    ) -> DamageResult<CollapseOutcome> {
        let outcome = resolve_into(&mut self.assets, groups, &self.resolver, selector)?;
        self.record_outcome(&outcome);
        Ok(outcome)
    }

    /// Phase 4: monetary loss per asset and event totals
    ///
    /// # Errors
    /// `FractionOutOfRange` if a fraction was corrupted.
    pub fn calc_cost(&mut self) -> DamageResult<EventTotals> {
        let breakdown = CostAggregator.apply(&mut self.assets)?;
        self.totals.total_struct_loss = breakdown.total_struct_loss;
        self.totals.total_contents_loss = breakdown.total_contents_loss;
        Ok(self.totals)
    }

    /// Run every phase in order with the model's random source
    ///
    /// # Errors
    /// The first phase error; the pipeline stops there.
    pub fn calc_damage_and_costs(&mut self) -> DamageResult<DamageReport> {
        self.calc_damage_percentages()?;
        let groups = self.calc_collapse_probability()?;
        self.calc_collapse_structures(&groups)?;
        self.finish()
    }

    /// Run every phase in order with an injected selector
    ///
    /// # Errors
    /// The first phase error; the pipeline stops there.
    pub fn calc_damage_and_costs_with<S: CollapseSelector + ?Sized>(
        &mut self,
        selector: &mut S,
    ) -> DamageResult<DamageReport> {
        self.calc_damage_percentages()?;
        let groups = self.calc_collapse_probability()?;
        self.calc_collapse_structures_with(&groups, selector)?;
        self.finish()
    }

    /// Snapshot of the current per-asset results and totals
    pub fn report(&self) -> DamageReport {
        DamageReport {
            rows: self
                .assets
                .iter()
                .enumerate()
                .map(|(i, asset)| DamageResultRow::from_asset(i, asset))
                .collect(),
            totals: self.totals,
            collapse_audit: self.collapse_audit.clone(),
            quality: self.quality,
        }
    }

    fn finish(&mut self) -> DamageResult<DamageReport> {
        let totals = self.calc_cost()?;
        info!(
            "Event damage: {} of {} assets inundated, {} collapsed, structure loss {:.2}, contents loss {:.2}",
            totals.inundated_count,
            totals.asset_count,
            totals.collapsed_count,
            totals.total_struct_loss,
            totals.total_contents_loss
        );
        Ok(self.report())
    }

    fn record_outcome(&mut self, outcome: &CollapseOutcome) {
        self.totals.collapsed_count = self.assets.iter().filter(|a| a.collapsed()).count();
        self.collapse_audit.clone_from(&outcome.audit);
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> DamageResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DamageError::LengthMismatch {
            field,
            expected,
            actual,
        })
    }
}

fn resolve_into<S: CollapseSelector + ?Sized>(
    assets: &mut [Asset],
    groups: &ProbabilityGroups,
    resolver: &CollapseResolver,
    selector: &mut S,
) -> DamageResult<CollapseOutcome> {
    let asset_count = assets.len();
    let mut seen = FxHashSet::default();
    for &index in groups.iter().flat_map(|g| g.members.iter()) {
        if index >= asset_count {
            return Err(DamageError::UnknownAssetIndex { index, asset_count });
        }
        if !seen.insert(index) {
            return Err(DamageError::DuplicateAssetIndex { index });
        }
    }

    let outcome = resolver.resolve(groups, selector)?;

    // A rerun replaces the previous draw rather than adding to it
    for asset in assets.iter_mut() {
        asset.clear_collapse();
    }
    for &index in &outcome.collapsed {
        assets[index].mark_collapsed();
    }
    Ok(outcome)
}
