//! Triangular SCS unit hydrograph.
//!
//! Discharge rises linearly from zero at t = 0 to the unit peakflow at t = Tp
//! and falls linearly back to zero at t = 3·Tp.

/// Step of the dimensionless time axis t/Tp.
pub const Q_R_STEP: f64 = 0.1;
/// Number of points on the dimensionless axis (0.0 to 3.0 inclusive).
pub const Q_R_POINTS: usize = 31;
/// Dimensionless base time of the triangle.
pub const BASE_RATIO: f64 = 3.0;

/// Discharge of the triangle at dimensionless time `q_r = t / Tp`, without
/// clamping. The falling limb keeps going below zero past `q_r = 3`.
#[inline]
fn triangle(q_r: f64, unit_peakflow: f64) -> f64 {
    if q_r <= 1.0 {
        q_r * unit_peakflow
    } else {
        unit_peakflow - (q_r - 1.0) / (BASE_RATIO - 1.0) * unit_peakflow
    }
}

/// Unit hydrograph on the fixed dimensionless grid `q_r = 0.0, 0.1, …, 3.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitHydrograph {
    /// Time (h), `q_r · Tp`.
    pub time: Vec<f64>,
    /// Discharge (m³/s per mm of runoff).
    pub discharge: Vec<f64>,
}

impl UnitHydrograph {
    pub fn new(unit_peakflow: f64, time_to_peak: f64) -> Self {
        let (time, discharge) = (0..Q_R_POINTS)
            .map(|i| {
                let q_r = i as f64 * Q_R_STEP;
                // The last point sits exactly on the base time.
                let q = if i + 1 == Q_R_POINTS { 0.0 } else { triangle(q_r, unit_peakflow) };
                (q_r * time_to_peak, q)
            })
            .unzip();
        Self { time, discharge }
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.discharge.iter().copied())
    }
}

/// Evaluate the triangle at arbitrary times (h), clamping the falling limb at
/// zero past the base time.
pub fn unit_discharge(times: &[f64], unit_peakflow: f64, time_to_peak: f64) -> Vec<f64> {
    times
        .iter()
        .map(|&t| triangle(t / time_to_peak, unit_peakflow).max(0.0))
        .collect()
}
