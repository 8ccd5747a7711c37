//! Catchment records as delivered by the dataset extraction step.

use serde::{Deserialize, Serialize};

use crate::error::{HydroError, Result};
use crate::land_cover::LandCover;
use crate::soil::SoilSample;

/// Land-cover percentages must sum to 100 within this absolute tolerance.
pub const LAND_COVER_TOLERANCE: f64 = 1e-9 * 100.0;

/// Return periods (years) of the design storms.
pub const RETURN_PERIODS: [u32; 3] = [10, 30, 100];

/// Design precipitation depths (mm) for the 10, 30 and 100 year storms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignPrecipitation {
    pub p10: f64,
    pub p30: f64,
    pub p100: f64,
}

impl DesignPrecipitation {
    pub fn depths(&self) -> [f64; 3] {
        [self.p10, self.p30, self.p100]
    }
}

impl From<[f64; 3]> for DesignPrecipitation {
    fn from([p10, p30, p100]: [f64; 3]) -> Self {
        Self { p10, p30, p100 }
    }
}

/// One catchment row. Field names follow the dataset columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catchment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Area in km².
    pub area: f64,
    /// Length of the main watercourse in metres.
    pub length_watercourse: f64,
    /// Mean slope gradient as a fraction.
    pub slope_gradient: f64,
    pub cover_farmland: f64,
    pub cover_pasture: f64,
    pub cover_forest: f64,
    pub cover_settlement: f64,
    pub cover_bare: f64,
    pub cover_cryo: f64,
    #[serde(default)]
    pub cover_water: f64,
    /// Depth to bedrock in metres.
    #[serde(default)]
    pub soil_depth: Option<f64>,
    #[serde(default)]
    pub sand_fra: Option<f64>,
    #[serde(default)]
    pub clay_fra: Option<f64>,
    #[serde(flatten)]
    pub precipitation: DesignPrecipitation,
    #[serde(default)]
    pub q10: Option<f64>,
    #[serde(default)]
    pub q30: Option<f64>,
    #[serde(default)]
    pub q100: Option<f64>,
}

impl Catchment {
    /// Percentage of the catchment under `cover`.
    pub fn cover(&self, cover: LandCover) -> f64 {
        match cover {
            LandCover::Farmland => self.cover_farmland,
            LandCover::Pasture => self.cover_pasture,
            LandCover::Forest => self.cover_forest,
            LandCover::Settlement => self.cover_settlement,
            LandCover::Bare => self.cover_bare,
            LandCover::Cryo => self.cover_cryo,
            LandCover::Water => self.cover_water,
        }
    }

    /// Overwrite all seven cover percentages, in `LandCover::ALL` order.
    pub fn set_covers(&mut self, pct: [f64; 7]) {
        for (cover, value) in LandCover::ALL.into_iter().zip(pct) {
            let slot = match cover {
                LandCover::Farmland => &mut self.cover_farmland,
                LandCover::Pasture => &mut self.cover_pasture,
                LandCover::Forest => &mut self.cover_forest,
                LandCover::Settlement => &mut self.cover_settlement,
                LandCover::Bare => &mut self.cover_bare,
                LandCover::Cryo => &mut self.cover_cryo,
                LandCover::Water => &mut self.cover_water,
            };
            *slot = value;
        }
    }

    pub fn cover_total(&self) -> f64 {
        LandCover::ALL.iter().map(|&c| self.cover(c)).sum()
    }

    /// Fails unless the seven land-cover percentages sum to 100.
    pub fn check_land_cover_total(&self) -> Result<()> {
        let total = self.cover_total();
        if (total - 100.0).abs() > LAND_COVER_TOLERANCE {
            return Err(HydroError::input(format!(
                "the sum of land covers should be 100%, got {total}"
            )));
        }
        Ok(())
    }

    /// Soil attributes, if all three were sampled.
    pub fn soil_sample(&self) -> Option<SoilSample> {
        Some(SoilSample { depth: self.soil_depth?, sand: self.sand_fra?, clay: self.clay_fra? })
    }

    /// Observed peak discharges (m³/s), if all three are present.
    pub fn observed_peaks(&self) -> Option<[f64; 3]> {
        Some([self.q10?, self.q30?, self.q100?])
    }

    /// Zero slope: the lag is infinite and every hydrograph is flat zero.
    pub fn is_flat(&self) -> bool {
        self.slope_gradient == 0.0
    }

    /// Name for diagnostics, falling back to the row position.
    pub fn label(&self, row: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{row}"))
    }
}

/// Snap a slope gradient to the three classes offered by the AUGUR tool.
pub fn reclassify_slope_gradient(slope: f64) -> f64 {
    if slope <= 0.1 {
        0.08
    } else if slope <= 0.5 {
        0.3
    } else {
        0.7
    }
}
