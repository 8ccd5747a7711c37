//! Curve number lookup tables and the land-cover weighted CN factor.
//!
//! A table has one row per runoff class (farmland, pasture, forest, settlement,
//! debris) and one column per hydrologic soil group. Tables are plain values:
//! built from a named default or decoded from a calibration vector, never
//! mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catchment::Catchment;
use crate::error::{HydroError, Result};
use crate::land_cover::LandCover;
use crate::soil::SoilGroup;

/// Number of rows (runoff classes) in a table.
pub const N_ROWS: usize = 5;
/// Number of columns (soil groups) in a table.
pub const N_GROUPS: usize = 4;
/// Number of cells, i.e. calibration parameters for the table.
pub const N_CELLS: usize = N_ROWS * N_GROUPS;

/// Upper bound of a curve number.
pub const CN_MAX: u8 = 100;

// ── Rows ──────────────────────────────────────────────────────────────────────

/// Row key of a curve number table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CnRow {
    Farmland,
    Pasture,
    Forest,
    Settlement,
    /// Bare ground and glaciers.
    Debris,
}

impl CnRow {
    pub const ALL: [CnRow; N_ROWS] =
        [CnRow::Farmland, CnRow::Pasture, CnRow::Forest, CnRow::Settlement, CnRow::Debris];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            CnRow::Farmland => "farmland",
            CnRow::Pasture => "pasture",
            CnRow::Forest => "forest",
            CnRow::Settlement => "settlement",
            CnRow::Debris => "debris",
        }
    }
}

// ── Named defaults ────────────────────────────────────────────────────────────

/// The published default tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CnVariant {
    /// Original Red Cross tool values.
    #[serde(rename = "redcross")]
    RedCross,
    /// Values re-tuned for the AUGUR tool.
    Augur,
}

impl FromStr for CnVariant {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redcross" => Ok(CnVariant::RedCross),
            "augur" => Ok(CnVariant::Augur),
            other => Err(HydroError::config(format!("unknown CN table variant '{other}'"))),
        }
    }
}

const REDCROSS: [[u8; N_GROUPS]; N_ROWS] = [
    [67, 76, 83, 86],
    [54, 70, 80, 84],
    [35, 61, 74, 80],
    [85, 90, 92, 94],
    [8, 10, 15, 25],
];

const AUGUR: [[u8; N_GROUPS]; N_ROWS] = [
    [35, 40, 43, 46],
    [37, 37, 40, 82],
    [20, 48, 70, 100],
    [59, 73, 100, 60],
    [8, 10, 15, 25],
];

// ── Table ─────────────────────────────────────────────────────────────────────

/// A 5 × 4 curve number table, rows in `CnRow::ALL` order, columns A-D.
///
/// Serialises as the nested row-major matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct CurveNumberTable {
    cells: [[u8; N_GROUPS]; N_ROWS],
}

impl CurveNumberTable {
    /// One of the published tables.
    pub fn for_variant(variant: CnVariant) -> Self {
        let cells = match variant {
            CnVariant::RedCross => REDCROSS,
            CnVariant::Augur => AUGUR,
        };
        Self { cells }
    }

    /// Published table by name ("redcross" or "augur").
    pub fn named(name: &str) -> Result<Self> {
        Ok(Self::for_variant(name.parse()?))
    }

    /// Build from integer cells, checking the 0-100 range.
    pub fn from_matrix(cells: [[u8; N_GROUPS]; N_ROWS]) -> Result<Self> {
        for (row, values) in CnRow::ALL.iter().zip(cells.iter()) {
            if let Some(v) = values.iter().find(|&&v| v > CN_MAX) {
                return Err(HydroError::input(format!(
                    "curve number {v} in row '{}' exceeds {CN_MAX}",
                    row.label()
                )));
            }
        }
        Ok(Self { cells })
    }

    /// Decode the flat calibration layout: 20 values ordered soil-group major
    /// (A-farmland … A-debris, B-farmland … D-debris), each rounded to the
    /// nearest integer with ties to even.
    pub fn from_cells(values: &[f64]) -> Result<Self> {
        if values.len() != N_CELLS {
            return Err(HydroError::input(format!(
                "expected {N_CELLS} curve number cells, got {}",
                values.len()
            )));
        }
        let mut cells = [[0u8; N_GROUPS]; N_ROWS];
        for (i, &v) in values.iter().enumerate() {
            let rounded = v.round_ties_even();
            if !(0.0..=CN_MAX as f64).contains(&rounded) {
                return Err(HydroError::input(format!(
                    "curve number cell {i} = {v} is outside [0, {CN_MAX}]"
                )));
            }
            let (group, row) = (i / N_ROWS, i % N_ROWS);
            cells[row][group] = rounded as u8;
        }
        Ok(Self { cells })
    }

    /// Inverse of [`CurveNumberTable::from_cells`].
    pub fn to_cells(&self) -> Vec<f64> {
        SoilGroup::ALL
            .iter()
            .flat_map(|g| CnRow::ALL.iter().map(move |r| self.get(*r, *g) as f64))
            .collect()
    }

    #[inline]
    pub fn get(&self, row: CnRow, group: SoilGroup) -> u8 {
        self.cells[row.index()][group.index()]
    }

    /// Lookup by string keys, as read from external tables.
    pub fn lookup(&self, row: &str, group: &str) -> Result<u8> {
        let key = row.trim().to_ascii_lowercase();
        let row = CnRow::ALL
            .into_iter()
            .find(|r| r.label() == key)
            .ok_or_else(|| HydroError::LookupFailure(format!("no curve number row '{key}'")))?;
        Ok(self.get(row, group.parse()?))
    }

    pub fn matrix(&self) -> [[u8; N_GROUPS]; N_ROWS] {
        self.cells
    }
}

impl Default for CurveNumberTable {
    fn default() -> Self {
        Self::for_variant(CnVariant::RedCross)
    }
}

impl TryFrom<Vec<Vec<f64>>> for CurveNumberTable {
    type Error = HydroError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != N_ROWS {
            return Err(HydroError::LookupFailure(format!(
                "curve number table needs {N_ROWS} rows, got {}",
                rows.len()
            )));
        }
        let mut cells = [[0u8; N_GROUPS]; N_ROWS];
        for (r, values) in rows.iter().enumerate() {
            if values.len() != N_GROUPS {
                return Err(HydroError::LookupFailure(format!(
                    "row '{}' needs {N_GROUPS} soil group columns, got {}",
                    CnRow::ALL[r].label(),
                    values.len()
                )));
            }
            for (g, &v) in values.iter().enumerate() {
                if !(0.0..=CN_MAX as f64).contains(&v) || v.fract() != 0.0 {
                    return Err(HydroError::input(format!(
                        "curve number {v} in row '{}' is not an integer in [0, {CN_MAX}]",
                        CnRow::ALL[r].label()
                    )));
                }
                cells[r][g] = v as u8;
            }
        }
        Ok(Self { cells })
    }
}

impl From<CurveNumberTable> for Vec<Vec<f64>> {
    fn from(table: CurveNumberTable) -> Self {
        table
            .cells
            .iter()
            .map(|row| row.iter().map(|&v| v as f64).collect())
            .collect()
    }
}

impl fmt::Display for CurveNumberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "")?;
        for g in SoilGroup::ALL {
            write!(f, "{:>5}", g.label())?;
        }
        writeln!(f)?;
        for row in CnRow::ALL {
            write!(f, "{:<12}", row.label())?;
            for g in SoilGroup::ALL {
                write!(f, "{:>5}", self.get(row, g))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ── Land-cover weighting ──────────────────────────────────────────────────────

/// Land-cover weighted curve number of `catchment` for one soil group:
///
///   cn = Σ pct(cover) / 100 × table[row(cover)][group]
///
/// Bare ground and glaciers both read the debris row; water adds nothing.
pub fn cn_factor(catchment: &Catchment, table: &CurveNumberTable, group: SoilGroup) -> f64 {
    LandCover::ALL
        .iter()
        .filter_map(|&cover| {
            cover
                .cn_row()
                .map(|row| catchment.cover(cover) / 100.0 * table.get(row, group) as f64)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catchment::tests::catchment_with_cover;
    use approx::assert_abs_diff_eq;

    #[test]
    fn redcross_corners() {
        let t = CurveNumberTable::for_variant(CnVariant::RedCross);
        assert_eq!(t.get(CnRow::Farmland, SoilGroup::A), 67);
        assert_eq!(t.get(CnRow::Farmland, SoilGroup::D), 86);
        assert_eq!(t.get(CnRow::Debris, SoilGroup::D), 25);
        assert_eq!(t.get(CnRow::Debris, SoilGroup::A), 8);
    }

    #[test]
    fn named_tables() {
        assert_eq!(CurveNumberTable::named("augur").unwrap().get(CnRow::Forest, SoilGroup::D), 100);
        assert_eq!(CurveNumberTable::named("RedCross").unwrap(), CurveNumberTable::default());
        assert!(matches!(
            CurveNumberTable::named("scs"),
            Err(HydroError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn cells_round_trip_exactly() {
        for variant in [CnVariant::RedCross, CnVariant::Augur] {
            let t = CurveNumberTable::for_variant(variant);
            let cells = t.to_cells();
            assert_eq!(cells.len(), N_CELLS);
            assert_eq!(CurveNumberTable::from_cells(&cells).unwrap(), t);
        }
    }

    #[test]
    fn cells_are_soil_group_major() {
        let cells = CurveNumberTable::default().to_cells();
        // A column first, top to bottom.
        assert_eq!(&cells[..5], &[67.0, 54.0, 35.0, 85.0, 8.0]);
        assert_eq!(cells[5], 76.0);
        assert_eq!(cells[19], 25.0);
    }

    #[test]
    fn from_cells_rounds_to_nearest() {
        let mut cells = CurveNumberTable::default().to_cells();
        cells[0] = 66.6;
        cells[1] = 54.4;
        let t = CurveNumberTable::from_cells(&cells).unwrap();
        assert_eq!(t.get(CnRow::Farmland, SoilGroup::A), 67);
        assert_eq!(t.get(CnRow::Pasture, SoilGroup::A), 54);

        // Halves go to the even neighbour.
        cells[0] = 66.5;
        cells[1] = 67.5;
        cells[2] = 0.5;
        let t = CurveNumberTable::from_cells(&cells).unwrap();
        assert_eq!(t.get(CnRow::Farmland, SoilGroup::A), 66);
        assert_eq!(t.get(CnRow::Pasture, SoilGroup::A), 68);
        assert_eq!(t.get(CnRow::Forest, SoilGroup::A), 0);
    }

    #[test]
    fn from_cells_rejects_bad_input() {
        assert!(matches!(
            CurveNumberTable::from_cells(&[50.0; 19]),
            Err(HydroError::InvalidInput(_))
        ));
        let mut cells = vec![50.0; N_CELLS];
        cells[7] = 100.6;
        assert!(CurveNumberTable::from_cells(&cells).is_err());
        cells[7] = -0.4;
        assert_eq!(CurveNumberTable::from_cells(&cells).unwrap().get(CnRow::Forest, SoilGroup::B), 0);
    }

    #[test]
    fn from_matrix_checks_range() {
        let mut m = REDCROSS;
        assert!(CurveNumberTable::from_matrix(m).is_ok());
        m[2][1] = 101;
        assert!(matches!(CurveNumberTable::from_matrix(m), Err(HydroError::InvalidInput(_))));
    }

    #[test]
    fn string_lookup() {
        let t = CurveNumberTable::default();
        assert_eq!(t.lookup("settlement", "C").unwrap(), 92);
        assert!(matches!(t.lookup("settlement", "E"), Err(HydroError::LookupFailure(_))));
        assert!(matches!(t.lookup("wetland", "A"), Err(HydroError::LookupFailure(_))));
    }

    #[test]
    fn json_matrix_shape_is_checked() {
        let t: CurveNumberTable = serde_json::from_str(
            "[[10,85,28,93],[19,75,65,50],[40,52,40,13],[15,32,88,58],[23,38,21,75]]",
        )
        .unwrap();
        assert_eq!(t.get(CnRow::Settlement, SoilGroup::C), 88);
        assert!(serde_json::from_str::<CurveNumberTable>("[[1,2,3,4]]").is_err());
        assert!(serde_json::from_str::<CurveNumberTable>(
            "[[1,2,3],[1,2,3],[1,2,3],[1,2,3],[1,2,3]]"
        )
        .is_err());
        let back = serde_json::to_string(&t).unwrap();
        assert_eq!(serde_json::from_str::<CurveNumberTable>(&back).unwrap(), t);
    }

    #[test]
    fn single_cover_factor_equals_cell() {
        let t = CurveNumberTable::for_variant(CnVariant::Augur);
        for cover in [
            LandCover::Farmland,
            LandCover::Pasture,
            LandCover::Forest,
            LandCover::Settlement,
            LandCover::Bare,
            LandCover::Cryo,
        ] {
            let c = catchment_with_cover(&[(cover, 100.0)]);
            let row = cover.cn_row().unwrap();
            for g in SoilGroup::ALL {
                assert_eq!(cn_factor(&c, &t, g), t.get(row, g) as f64, "{cover} / {g}");
            }
        }
    }

    #[test]
    fn mixed_cover_factor() {
        let t = CurveNumberTable::default();
        let c = catchment_with_cover(&[
            (LandCover::Farmland, 40.0),
            (LandCover::Pasture, 50.0),
            (LandCover::Forest, 5.0),
            (LandCover::Settlement, 5.0),
        ]);
        assert_abs_diff_eq!(cn_factor(&c, &t, SoilGroup::A), 59.8, epsilon = 1e-9);
        assert_abs_diff_eq!(cn_factor(&c, &t, SoilGroup::B), 72.95, epsilon = 1e-9);
        assert_abs_diff_eq!(cn_factor(&c, &t, SoilGroup::C), 81.5, epsilon = 1e-9);
        assert_abs_diff_eq!(cn_factor(&c, &t, SoilGroup::D), 85.1, epsilon = 1e-9);
    }

    #[test]
    fn bare_and_cryo_pool_into_debris() {
        let t = CurveNumberTable::default();
        let c = catchment_with_cover(&[
            (LandCover::Bare, 30.0),
            (LandCover::Cryo, 20.0),
            (LandCover::Water, 50.0),
        ]);
        // Half the catchment on the debris row, water contributes nothing.
        assert_abs_diff_eq!(cn_factor(&c, &t, SoilGroup::D), 12.5, epsilon = 1e-12);
    }
}
