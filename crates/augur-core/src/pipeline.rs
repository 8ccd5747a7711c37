//! Design-storm hydrograph for one catchment and the three return periods.
//!
//! Steps:
//!   land-cover check → CN factor → rain-covered area → runoff depth per period
//!   → time to peak and unit peakflow → unit response on the output grid
//!   → hyetogram per period → convolution → attenuation.

use serde::{Deserialize, Serialize};

use crate::catchment::{Catchment, DesignPrecipitation};
use crate::convolution::{route, ATTENUATION};
use crate::curve_number::{cn_factor, CurveNumberTable};
use crate::error::{HydroError, Result};
use crate::hyetogram::{hyetogram, HyetogramMethod};
use crate::soil::SoilGroup;
use crate::storm::{time_to_peak, StormGeometry};
use crate::unit_hydrograph::unit_discharge;

/// Slack when deciding whether a grid time falls inside the storm.
const GRID_EPS: f64 = 1e-9;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrographConfig {
    /// Storm duration in minutes.
    pub storm_duration_min: f64,
    /// Output grid step in hours.
    pub time_step_h: f64,
    /// Output grid end in hours (exclusive).
    pub horizon_h: f64,
    pub hyetogram: HyetogramMethod,
    pub attenuation: f64,
    pub geometry: StormGeometry,
}

impl Default for HydrographConfig {
    fn default() -> Self {
        Self {
            storm_duration_min: 120.0,
            time_step_h: 0.1,
            horizon_h: 5.0,
            hyetogram: HyetogramMethod::Structured,
            attenuation: ATTENUATION,
            geometry: StormGeometry::default(),
        }
    }
}

impl HydrographConfig {
    /// Output time axis `0, dt, 2·dt, …` strictly below the horizon.
    pub fn time_axis(&self) -> Result<Vec<f64>> {
        if !(self.time_step_h > 0.0) || !(self.horizon_h > 0.0) {
            return Err(HydroError::input(format!(
                "time step ({}) and horizon ({}) must be positive",
                self.time_step_h, self.horizon_h
            )));
        }
        let n = (self.horizon_h / self.time_step_h - GRID_EPS).ceil() as usize;
        Ok((0..n).map(|i| i as f64 * self.time_step_h).collect())
    }

    /// Number of grid points in `(0, storm duration]`.
    pub fn storm_steps(&self, axis: &[f64]) -> usize {
        let end_h = self.storm_duration_min / 60.0;
        axis.iter().filter(|&&t| t > 0.0 && t <= end_h + GRID_EPS).count()
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// Discharge (m³/s) through time for the 10, 30 and 100 year storms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hydrograph {
    /// Hours since the start of rain.
    pub time: Vec<f64>,
    /// One row per time step, one column per return period.
    pub discharge: Vec<[f64; 3]>,
}

impl Hydrograph {
    /// Column-wise maximum.
    pub fn peaks(&self) -> [f64; 3] {
        let mut peaks = [0.0f64; 3];
        for row in &self.discharge {
            for (p, &q) in peaks.iter_mut().zip(row) {
                *p = p.max(q);
            }
        }
        peaks
    }

    /// Discharge series of one return period column.
    pub fn column(&self, period: usize) -> Vec<f64> {
        self.discharge.iter().map(|row| row[period]).collect()
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Compute the design hydrographs of `catchment` for soil group `group`.
///
/// Any invalid input aborts the whole computation; no partial hydrograph is
/// returned.
pub fn compute_hydrograph(
    catchment: &Catchment,
    group: SoilGroup,
    precipitation: &DesignPrecipitation,
    table: &CurveNumberTable,
    config: &HydrographConfig,
) -> Result<Hydrograph> {
    let geometry = &config.geometry;

    catchment.check_land_cover_total()?;
    let cn = cn_factor(catchment, table, group);
    let rain_area = geometry.rain_area_fraction(catchment.area)?;
    let depths = precipitation
        .depths()
        .map(|p| geometry.runoff_depth(rain_area, p, cn));

    let tp = time_to_peak(
        catchment.length_watercourse,
        catchment.slope_gradient,
        config.storm_duration_min,
    )?;
    let q_up = geometry.unit_peakflow(catchment.area, tp)?;

    let time = config.time_axis()?;
    let unit = unit_discharge(&time, q_up, tp);
    let steps = config.storm_steps(&time);

    let mut discharge = vec![[0.0f64; 3]; time.len()];
    for (col, &depth) in depths.iter().enumerate() {
        let pulses = hyetogram(steps, depth, config.hyetogram)?;
        let q = route(&unit, &pulses, config.attenuation)?;
        for (row, v) in discharge.iter_mut().zip(q) {
            row[col] = v;
        }
    }

    Ok(Hydrograph { time, discharge })
}

/// Peak discharges for a batch of `(catchment, soil group)` pairs, in input
/// order. The first failing catchment aborts the batch.
pub fn peak_discharges(
    jobs: &[(&Catchment, SoilGroup)],
    table: &CurveNumberTable,
    config: &HydrographConfig,
) -> Result<Vec<[f64; 3]>> {
    let run = |&(c, g): &(&Catchment, SoilGroup)| {
        compute_hydrograph(c, g, &c.precipitation, table, config).map(|h| h.peaks())
    };

    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        jobs.par_iter().map(run).collect()
    }
    #[cfg(not(feature = "threading"))]
    {
        jobs.iter().map(run).collect()
    }
}
