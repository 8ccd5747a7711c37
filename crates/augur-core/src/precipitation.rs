//! Gumbel (EV1) return levels from annual maxima, method of moments.
//!
//!   b = √6/π · σ,   a = μ − γ · b,   x_R = a − b · ln(−ln(1 − 1/R))
//!
//! with σ the sample standard deviation (n − 1) and γ the Euler–Mascheroni
//! constant. Used to derive p10/p30/p100 (or q10/q30/q100) for the catchment table.

use serde::{Deserialize, Serialize};

use crate::catchment::{DesignPrecipitation, RETURN_PERIODS};
use crate::error::{HydroError, Result};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Fitted Gumbel location `a` and scale `b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gumbel {
    pub location: f64,
    pub scale: f64,
}

impl Gumbel {
    pub fn fit(annual_maxima: &[f64]) -> Result<Self> {
        if annual_maxima.len() < 2 {
            return Err(HydroError::input(format!(
                "a Gumbel fit needs at least two annual maxima, got {}",
                annual_maxima.len()
            )));
        }
        if let Some(v) = annual_maxima.iter().find(|v| !v.is_finite()) {
            return Err(HydroError::input(format!("annual maximum {v} is not finite")));
        }
        let n = annual_maxima.len() as f64;
        let mean = annual_maxima.iter().sum::<f64>() / n;
        let var = annual_maxima.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let scale = 6f64.sqrt() / std::f64::consts::PI * var.sqrt();
        Ok(Self { location: mean - scale * EULER_GAMMA, scale })
    }

    /// Value exceeded on average once every `period` years.
    pub fn return_level(&self, period: f64) -> Result<f64> {
        if !(period > 1.0) {
            return Err(HydroError::input(format!(
                "return period must exceed one year, got {period}"
            )));
        }
        let reduced = -(-(1.0 - 1.0 / period).ln()).ln();
        Ok(self.location + self.scale * reduced)
    }

    /// Levels for the 10, 30 and 100 year return periods.
    pub fn design_levels(&self) -> Result<[f64; 3]> {
        let mut levels = [0.0; 3];
        for (x, r) in levels.iter_mut().zip(RETURN_PERIODS) {
            *x = self.return_level(r as f64)?;
        }
        Ok(levels)
    }
}

/// Return levels of `annual_maxima` for each of `periods`.
pub fn return_levels(annual_maxima: &[f64], periods: &[f64]) -> Result<Vec<f64>> {
    let fit = Gumbel::fit(annual_maxima)?;
    periods.iter().map(|&r| fit.return_level(r)).collect()
}

/// Depths for the 10, 30 and 100 year design storms.
pub fn design_precipitation(annual_maxima: &[f64]) -> Result<DesignPrecipitation> {
    Ok(Gumbel::fit(annual_maxima)?.design_levels()?.into())
}
