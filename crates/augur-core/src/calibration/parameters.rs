//! Flat parameter vector ⇄ curve number table and soil thresholds.
//!
//! Layout: 20 CN cells ordered soil-group major (`A1..A5, B1..B5, C1..C5,
//! D1..D5`, rows numbered farmland = 1 … debris = 5), optionally followed by
//! `thr_soil_depth`, `thr_sand_frac`, `thr_clay_frac`.

use serde::{Deserialize, Serialize};

use crate::curve_number::{CurveNumberTable, CN_MAX, N_CELLS, N_ROWS};
use crate::error::{HydroError, Result};
use crate::soil::{SoilGroup, SoilThresholds};

/// Number of trailing threshold parameters.
pub const N_THRESHOLDS: usize = 3;

pub const THRESHOLD_NAMES: [&str; N_THRESHOLDS] = ["thr_soil_depth", "thr_sand_frac", "thr_clay_frac"];

/// Upper bounds of the threshold parameters (depth in m, fractions).
pub const THRESHOLD_BOUNDS: [f64; N_THRESHOLDS] = [10.0, 1.0, 1.0];

/// Uniform prior over one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformParameter {
    pub name: String,
    pub low: f64,
    pub high: f64,
    /// Drawn as a real, used after rounding to the nearest integer.
    pub integer: bool,
}

impl UniformParameter {
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Name of flat CN cell `index` (0-based): `A1` … `D5`.
pub fn cell_name(index: usize) -> String {
    let group = SoilGroup::ALL[index / N_ROWS];
    format!("{}{}", group.label(), index % N_ROWS + 1)
}

fn threshold_priors() -> impl Iterator<Item = UniformParameter> {
    THRESHOLD_NAMES
        .iter()
        .zip(THRESHOLD_BOUNDS)
        .map(|(name, high)| UniformParameter { name: name.to_string(), low: 0.0, high, integer: false })
}

/// The full search space, in vector order.
pub fn parameter_space(with_thresholds: bool) -> Vec<UniformParameter> {
    let cells = (0..N_CELLS).map(|i| UniformParameter {
        name: cell_name(i),
        low: 0.0,
        high: CN_MAX as f64,
        integer: true,
    });
    if with_thresholds {
        cells.chain(threshold_priors()).collect()
    } else {
        cells.collect()
    }
}

/// A parameter vector turned back into model inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedParameters {
    pub table: CurveNumberTable,
    /// Present only when thresholds are part of the search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<SoilThresholds>,
}

/// Decode `vector` laid out as [`parameter_space`] describes.
pub fn decode(vector: &[f64], with_thresholds: bool) -> Result<DecodedParameters> {
    let expected = N_CELLS + if with_thresholds { N_THRESHOLDS } else { 0 };
    if vector.len() != expected {
        return Err(HydroError::input(format!(
            "parameter vector has {} values, expected {expected}",
            vector.len()
        )));
    }
    let table = CurveNumberTable::from_cells(&vector[..N_CELLS])?;
    let thresholds = if with_thresholds {
        let t = &vector[N_CELLS..];
        for (prior, &v) in threshold_priors().zip(t) {
            if !prior.contains(v) {
                return Err(HydroError::input(format!(
                    "{} = {v} is outside [{}, {}]",
                    prior.name, prior.low, prior.high
                )));
            }
        }
        Some(SoilThresholds { depth: t[0], sand: t[1], clay: t[2] })
    } else {
        None
    };
    Ok(DecodedParameters { table, thresholds })
}

/// Inverse of [`decode`]. Threshold values are appended when given.
pub fn encode(table: &CurveNumberTable, thresholds: Option<&SoilThresholds>) -> Vec<f64> {
    let mut v = table.to_cells();
    if let Some(t) = thresholds {
        v.extend([t.depth, t.sand, t.clay]);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve_number::{CnRow, CnVariant};

    #[test]
    fn names_follow_group_major_order() {
        let names: Vec<String> = parameter_space(true).into_iter().map(|p| p.name).collect();
        assert_eq!(names.len(), 23);
        assert_eq!(&names[..6], ["A1", "A2", "A3", "A4", "A5", "B1"]);
        assert_eq!(names[19], "D5");
        assert_eq!(&names[20..], THRESHOLD_NAMES);
    }

    #[test]
    fn bounds_of_the_space() {
        let space = parameter_space(true);
        assert!(space[..20].iter().all(|p| p.low == 0.0 && p.high == 100.0 && p.integer));
        assert_eq!(space[20].high, 10.0);
        assert_eq!(space[21].high, 1.0);
        assert_eq!(space[22].high, 1.0);
        assert!(space[20..].iter().all(|p| !p.integer));
        assert_eq!(parameter_space(false).len(), 20);
    }

    #[test]
    fn encode_decode_reproduces_table() {
        for variant in [CnVariant::RedCross, CnVariant::Augur] {
            let table = CurveNumberTable::for_variant(variant);
            let decoded = decode(&encode(&table, None), false).unwrap();
            assert_eq!(decoded.table, table, "{variant:?}");
            assert_eq!(decoded.thresholds, None);
        }
    }

    #[test]
    fn cell_index_maps_to_group_and_row() {
        let mut v = vec![50.0; 20];
        v[6] = 77.0; // B2
        let t = decode(&v, false).unwrap().table;
        assert_eq!(t.get(CnRow::Pasture, SoilGroup::B), 77);
        assert_eq!(t.get(CnRow::Pasture, SoilGroup::A), 50);
    }

    #[test]
    fn cells_are_rounded() {
        let mut v = vec![0.0; 20];
        v[0] = 66.6;
        v[1] = 53.4;
        let t = decode(&v, false).unwrap().table;
        assert_eq!(t.get(CnRow::Farmland, SoilGroup::A), 67);
        assert_eq!(t.get(CnRow::Pasture, SoilGroup::A), 53);

        v[0] = 66.5;
        v[1] = 0.5;
        let t = decode(&v, false).unwrap().table;
        assert_eq!(t.get(CnRow::Farmland, SoilGroup::A), 66);
        assert_eq!(t.get(CnRow::Pasture, SoilGroup::A), 0);
    }

    #[test]
    fn thresholds_round_trip() {
        let table = CurveNumberTable::default();
        let thr = SoilThresholds { depth: 1.3, sand: 0.35, clay: 0.25 };
        let v = encode(&table, Some(&thr));
        assert_eq!(v.len(), 23);
        let d = decode(&v, true).unwrap();
        assert_eq!(d.thresholds, Some(thr));
        assert_eq!(d.table, table);
    }

    #[test]
    fn wrong_length_or_range_is_rejected() {
        assert!(decode(&[50.0; 20], true).is_err());
        assert!(decode(&[50.0; 23], false).is_err());
        let mut v = vec![50.0; 23];
        v[20] = 11.0;
        assert!(matches!(decode(&v, true), Err(HydroError::InvalidInput(_))));
        v[20] = 1.0;
        v[22] = -0.1;
        assert!(matches!(decode(&v, true), Err(HydroError::InvalidInput(_))));
        let mut v = vec![50.0; 20];
        v[3] = 101.0;
        assert!(matches!(decode(&v, false), Err(HydroError::InvalidInput(_))));
    }
}
