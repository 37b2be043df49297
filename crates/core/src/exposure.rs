//! Exposure table input and result table output (CSV)
//!
//! Exposure databases carry one row per building with replacement values,
//! wall construction and distance from the shore. Additional columns
//! (coordinates, roof type, ...) are ignored. The peak depth is either a
//! `MAX_DEPTH` column or supplied separately in row order.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use crate::core_types::{Asset, WallCategory};
use crate::error::{DamageError, DamageResult};
use crate::model::{DamageModelConfig, DamageReport, EventDamageModel};

/// One exposure row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRecord {
    #[serde(rename = "STR_VALUE")]
    pub struct_value: f64,
    #[serde(rename = "C_VALUE")]
    pub contents_value: f64,
    #[serde(rename = "WALLS")]
    pub walls: String,
    #[serde(rename = "SHORE_DIST")]
    pub shore_distance: f64,
    #[serde(rename = "MAX_DEPTH", default)]
    pub max_depth: Option<f64>,
}

/// Exposure rows in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureTable {
    pub records: Vec<ExposureRecord>,
}

impl ExposureTable {
    /// Parse exposure CSV with a header row
    ///
    /// # Errors
    /// `Csv` on malformed rows or missing required columns.
    pub fn from_reader<R: io::Read>(reader: R) -> DamageResult<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let records = reader
            .deserialize()
            .collect::<Result<Vec<ExposureRecord>, csv::Error>>()?;
        Ok(Self { records })
    }

    /// Parse an exposure CSV file
    ///
    /// # Errors
    /// `Io` if the file cannot be opened, otherwise as [`Self::from_reader`].
    pub fn from_path(path: impl AsRef<Path>) -> DamageResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validated assets, taking depth from `depths` when given, else from `MAX_DEPTH`
    ///
    /// # Errors
    /// `LengthMismatch` when `depths` does not cover every row, `MissingDepth`
    /// for a row without depth, `UnknownWallCategory` and asset validation errors.
    pub fn to_assets(&self, depths: Option<&[f64]>) -> DamageResult<Vec<Asset>> {
        if let Some(depths) = depths {
            if depths.len() != self.records.len() {
                return Err(DamageError::LengthMismatch {
                    field: "depth",
                    expected: self.records.len(),
                    actual: depths.len(),
                });
            }
        }

        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let depth = match depths {
                    Some(depths) => depths[row],
                    None => record.max_depth.ok_or(DamageError::MissingDepth { row })?,
                };
                let walls: WallCategory = record.walls.parse()?;
                Asset::new(
                    row,
                    depth,
                    record.shore_distance,
                    walls,
                    record.struct_value,
                    record.contents_value,
                )
            })
            .collect()
    }

    /// Build an event model over this exposure
    ///
    /// # Errors
    /// As [`Self::to_assets`] and [`EventDamageModel::from_assets`].
    pub fn build_model(
        &self,
        depths: Option<&[f64]>,
        config: DamageModelConfig,
    ) -> DamageResult<EventDamageModel> {
        EventDamageModel::from_assets(self.to_assets(depths)?, config)
    }
}

/// Result table row as written to CSV
#[derive(Debug, Serialize)]
struct ResultCsvRow {
    #[serde(rename = "MAX_DEPTH")]
    depth: f64,
    #[serde(rename = "SHORE_DIST")]
    shore_distance: f64,
    #[serde(rename = "WALLS")]
    walls: &'static str,
    #[serde(rename = "STRUCT_DAMAGE_fraction")]
    struct_damage: f64,
    #[serde(rename = "CONTENTS_DAMAGE_fraction")]
    contents_damage: f64,
    #[serde(rename = "STRUCT_LOSS_$")]
    struct_loss: f64,
    #[serde(rename = "CONTENTS_LOSS_$")]
    contents_loss: f64,
    #[serde(rename = "STRUCT_COLLAPSED")]
    collapsed: u8,
    #[serde(rename = "STRUCT_INUNDATED")]
    inundated: u8,
    #[serde(rename = "COLLAPSE_PROBABILITY")]
    collapse_probability: Option<f64>,
}

/// Write the per-asset result table as CSV
///
/// # Errors
/// `Csv`/`Io` on write failure.
pub fn write_results<W: io::Write>(writer: W, report: &DamageReport) -> DamageResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in &report.rows {
        writer.serialize(ResultCsvRow {
            depth: row.depth,
            shore_distance: row.shore_distance,
            walls: row.wall_category.name(),
            struct_damage: row.struct_damage_fraction,
            contents_damage: row.contents_damage_fraction,
            struct_loss: row.struct_loss,
            contents_loss: row.contents_loss,
            collapsed: u8::from(row.collapsed),
            inundated: u8::from(row.inundated),
            collapse_probability: row.collapse_probability,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the result table to a file
///
/// # Errors
/// As [`write_results`], plus `Io` if the file cannot be created.
pub fn write_results_path(path: impl AsRef<Path>, report: &DamageReport) -> DamageResult<()> {
    let file = std::fs::File::create(path)?;
    write_results(io::BufWriter::new(file), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::FirstMembersSelector;

    const EXPOSURE: &str = "\
x,y,STR_VALUE,C_VALUE,ROOF_TYPE,WALLS,SHORE_DIST
5.5,0.5,10,130000,Metal,Timber,20
4.5,1.0,150,76000,Metal,Double Brick,20
0.1,1.5,100,76000,Metal,Brick Veneer,300
6.1,1.5,100,76000,Metal,Brick Veneer,300
";

    #[test]
    fn test_read_exposure_ignores_extra_columns() {
        let table = ExposureTable::from_reader(EXPOSURE.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.records[1].walls, "Double Brick");
        assert_eq!(table.records[0].struct_value, 10.0);
        assert_eq!(table.records[2].shore_distance, 300.0);
        assert_eq!(table.records[0].max_depth, None);
    }

    #[test]
    fn test_depth_column_required_without_depths() {
        let table = ExposureTable::from_reader(EXPOSURE.as_bytes()).unwrap();
        assert!(matches!(
            table.to_assets(None),
            Err(DamageError::MissingDepth { row: 0 })
        ));
        assert!(matches!(
            table.to_assets(Some(&[1.0])),
            Err(DamageError::LengthMismatch { expected: 4, actual: 1, .. })
        ));
    }

    #[test]
    fn test_deep_inundation_near_shore() {
        let table = ExposureTable::from_reader(EXPOSURE.as_bytes()).unwrap();
        let depths = [5.5, 4.5, 0.1, -0.3];
        let mut model = table
            .build_model(Some(&depths), DamageModelConfig::default().with_seed(11))
            .unwrap();
        let report = model
            .calc_damage_and_costs_with(&mut FirstMembersSelector)
            .unwrap();

        // Both near-shore assets share 0.9 and round(1.8) = 2: both are total losses
        assert_eq!(report.rows[0].collapse_probability, Some(0.9));
        assert_eq!(report.rows[1].collapse_probability, Some(0.9));
        let struct_loss: Vec<f64> = report.rows.iter().map(|r| r.struct_loss).collect();
        assert_eq!(struct_loss[0], 10.0);
        assert_eq!(struct_loss[1], 150.0);
        assert!((struct_loss[2] - 16.9).abs() < 1e-9);
        assert_eq!(struct_loss[3], 0.0);
        assert!(!report.rows[3].inundated);
        assert_eq!(report.totals.collapsed_count, 2);
    }

    #[test]
    fn test_max_depth_column_and_result_csv() {
        let csv = "STR_VALUE,C_VALUE,WALLS,SHORE_DIST,MAX_DEPTH\n10,100,Double Brick,100,1.0\n1,10,Brick Veneer,100,-0.3\n";
        let table = ExposureTable::from_reader(csv.as_bytes()).unwrap();
        let mut model = table
            .build_model(None, DamageModelConfig::default().with_seed(2))
            .unwrap();
        let report = model
            .calc_damage_and_costs_with(&mut FirstMembersSelector)
            .unwrap();

        let mut out = Vec::new();
        write_results(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "MAX_DEPTH,SHORE_DIST,WALLS,STRUCT_DAMAGE_fraction,CONTENTS_DAMAGE_fraction,\
             STRUCT_LOSS_$,CONTENTS_LOSS_$,STRUCT_COLLAPSED,STRUCT_INUNDATED,COLLAPSE_PROBABILITY"
        );
        assert_eq!(lines.clone().count(), 2);
        assert!(lines.next().unwrap().starts_with("1.0,100.0,Double Brick,"));
        assert_eq!(lines.next().unwrap(), "-0.3,100.0,Brick Veneer,0.0,0.0,0.0,0.0,0,0,");
    }
}
