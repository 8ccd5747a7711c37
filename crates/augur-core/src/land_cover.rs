//! Land-cover categories and their mapping from classified raster codes.
//!
//! Raster sampling happens upstream; this module only turns a bag of sampled
//! class codes into the seven cover percentages a catchment record carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::curve_number::CnRow;
use crate::error::{HydroError, Result};

/// The seven land-cover categories tracked per catchment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandCover {
    Farmland,
    Pasture,
    Forest,
    Settlement,
    Bare,
    Cryo,
    Water,
}

impl LandCover {
    pub const ALL: [LandCover; 7] = [
        LandCover::Farmland,
        LandCover::Pasture,
        LandCover::Forest,
        LandCover::Settlement,
        LandCover::Bare,
        LandCover::Cryo,
        LandCover::Water,
    ];

    /// Curve number row used for this cover. Bare ground and glaciers share the
    /// debris row; open water produces no runoff term.
    pub fn cn_row(self) -> Option<CnRow> {
        match self {
            LandCover::Farmland => Some(CnRow::Farmland),
            LandCover::Pasture => Some(CnRow::Pasture),
            LandCover::Forest => Some(CnRow::Forest),
            LandCover::Settlement => Some(CnRow::Settlement),
            LandCover::Bare | LandCover::Cryo => Some(CnRow::Debris),
            LandCover::Water => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LandCover::Farmland => "farmland",
            LandCover::Pasture => "pasture",
            LandCover::Forest => "forest",
            LandCover::Settlement => "settlement",
            LandCover::Bare => "bare",
            LandCover::Cryo => "cryo",
            LandCover::Water => "water",
        }
    }
}

impl fmt::Display for LandCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LandCover {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        LandCover::ALL
            .into_iter()
            .find(|lc| lc.label() == key)
            .ok_or_else(|| HydroError::config(format!("land cover type '{key}' is not defined")))
    }
}

// ── Source datasets ───────────────────────────────────────────────────────────

/// Classified land-cover products whose codes we know how to fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandCoverDataset {
    /// ESA CCI land cover.
    Cci,
    /// ESA WorldCover.
    WorldCover,
}

impl FromStr for LandCoverDataset {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cci" => Ok(LandCoverDataset::Cci),
            "worldcover" => Ok(LandCoverDataset::WorldCover),
            other => Err(HydroError::config(format!("dataset '{other}' is not defined"))),
        }
    }
}

impl LandCoverDataset {
    /// Category of a raster class code. Codes outside every category (including
    /// the nodata code 0) return `None`.
    pub fn category(self, code: u16) -> Option<LandCover> {
        match self {
            LandCoverDataset::Cci => match code {
                10..=30 => Some(LandCover::Farmland),
                40 | 100..=153 => Some(LandCover::Pasture),
                50..=90 => Some(LandCover::Forest),
                190 => Some(LandCover::Settlement),
                160..=180 | 210 => Some(LandCover::Water),
                200..=202 => Some(LandCover::Bare),
                220 => Some(LandCover::Cryo),
                _ => None,
            },
            LandCoverDataset::WorldCover => match code {
                40 => Some(LandCover::Farmland),
                20..=30 | 90..=100 => Some(LandCover::Pasture),
                10 => Some(LandCover::Forest),
                50 => Some(LandCover::Settlement),
                80 => Some(LandCover::Water),
                60 => Some(LandCover::Bare),
                70 => Some(LandCover::Cryo),
                _ => None,
            },
        }
    }

    /// Percentage of valid pixels falling in `cover`.
    ///
    /// Code 0 is nodata and is not counted. Codes that are valid but belong to no
    /// category still count in the denominator, so the seven shares only sum to
    /// 100 when every pixel is categorised.
    pub fn cover_percentage(self, codes: &[u16], cover: LandCover) -> Result<f64> {
        let valid = codes.iter().filter(|&&c| c != 0).count();
        if valid == 0 {
            return Err(HydroError::input("no valid land-cover pixels in the sample"));
        }
        let hits = codes
            .iter()
            .filter(|&&c| c != 0 && self.category(c) == Some(cover))
            .count();
        Ok(100.0 * hits as f64 / valid as f64)
    }

    /// All seven cover percentages, in `LandCover::ALL` order.
    pub fn cover_percentages(self, codes: &[u16]) -> Result<[f64; 7]> {
        let mut out = [0.0; 7];
        for (slot, cover) in out.iter_mut().zip(LandCover::ALL) {
            *slot = self.cover_percentage(codes, cover)?;
        }
        Ok(out)
    }
}
