//! Empirical storm and catchment geometry: rain-covered area, runoff depth,
//! time to peak and unit peakflow.

use serde::{Deserialize, Serialize};

use crate::error::{HydroError, Result};

/// Coefficient of the unit peakflow formula. The two values circulate in
/// different versions of the method; callers pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakflowConstant {
    /// 0.208, the SCS triangular hydrograph constant for km², h and mm.
    #[default]
    Scs,
    /// 0.278 = 1 / 3.6, the rational-method unit conversion.
    Rational,
}

impl PeakflowConstant {
    pub fn value(self) -> f64 {
        match self {
            PeakflowConstant::Scs => 0.208,
            PeakflowConstant::Rational => 0.278,
        }
    }
}

impl std::str::FromStr for PeakflowConstant {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scs" | "0.208" => Ok(PeakflowConstant::Scs),
            "rational" | "0.278" => Ok(PeakflowConstant::Rational),
            other => Err(HydroError::config(format!("unknown peakflow constant '{other}'"))),
        }
    }
}

/// Constant set of the geometry formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormGeometry {
    /// Multiplier `a` of the rain-area power law.
    pub rain_area_a: f64,
    /// Exponent `x` of the rain-area power law.
    pub rain_area_x: f64,
    /// Share of effective precipitation that runs off.
    pub runoff_coefficient: f64,
    pub peakflow: PeakflowConstant,
}

impl Default for StormGeometry {
    fn default() -> Self {
        Self {
            rain_area_a: 106.61,
            rain_area_x: -0.289,
            runoff_coefficient: 0.7,
            peakflow: PeakflowConstant::Scs,
        }
    }
}

impl StormGeometry {
    /// Percentage of the catchment covered by the design storm:
    ///   a · area^x
    pub fn rain_area_fraction(&self, area_km2: f64) -> Result<f64> {
        if !(area_km2 > 0.0) {
            return Err(HydroError::input(format!(
                "catchment area must be positive, got {area_km2}"
            )));
        }
        Ok(self.rain_area_a * area_km2.powf(self.rain_area_x))
    }

    /// Runoff-producing depth (mm):
    ///   c · rain_area/100 · precipitation · cn/100
    pub fn runoff_depth(&self, rain_area_pct: f64, precipitation_mm: f64, cn_factor: f64) -> f64 {
        self.runoff_coefficient * rain_area_pct / 100.0 * precipitation_mm * cn_factor / 100.0
    }

    /// Unit peakflow (m³/s per mm of runoff): k · area / tp.
    pub fn unit_peakflow(&self, area_km2: f64, time_to_peak_h: f64) -> Result<f64> {
        if !(area_km2 > 0.0) {
            return Err(HydroError::input(format!(
                "catchment area must be positive, got {area_km2}"
            )));
        }
        if !(time_to_peak_h > 0.0) {
            return Err(HydroError::input(format!(
                "time to peak must be positive, got {time_to_peak_h}"
            )));
        }
        Ok(self.peakflow.value() * area_km2 / time_to_peak_h)
    }
}

/// Time from the start of rain to the discharge peak, in hours:
///
///   (D/2 + 0.6 · 0.02 · L^0.77 · S^-0.385) / 60
///
/// with `D` the storm duration (min), `L` the watercourse length (m) and `S`
/// the slope gradient. A flat catchment (S = 0) has an infinite lag.
pub fn time_to_peak(length_m: f64, slope_gradient: f64, storm_duration_min: f64) -> Result<f64> {
    if !(length_m > 0.0) {
        return Err(HydroError::input(format!(
            "watercourse length must be positive, got {length_m}"
        )));
    }
    if !(slope_gradient >= 0.0) {
        return Err(HydroError::input(format!(
            "slope gradient cannot be negative, got {slope_gradient}"
        )));
    }
    if !(storm_duration_min > 0.0) {
        return Err(HydroError::input(format!(
            "storm duration must be positive, got {storm_duration_min}"
        )));
    }
    let lag_min = 0.6 * 0.02 * length_m.powf(0.77) * slope_gradient.powf(-0.385);
    Ok((storm_duration_min / 2.0 + lag_min) / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rain_area_reference_values() {
        let g = StormGeometry::default();
        assert_abs_diff_eq!(g.rain_area_fraction(100.0).unwrap(), 28.0, epsilon = 0.5);
        assert_abs_diff_eq!(g.rain_area_fraction(5.0).unwrap(), 67.0, epsilon = 0.5);
        assert_abs_diff_eq!(g.rain_area_fraction(250.0).unwrap(), 22.0, epsilon = 0.5);
    }

    #[test]
    fn rain_area_rejects_non_positive_area() {
        let g = StormGeometry::default();
        for area in [0.0, -1.0, f64::NAN] {
            assert!(matches!(g.rain_area_fraction(area), Err(HydroError::InvalidInput(_))));
        }
    }

    #[test]
    fn runoff_depth_reference_values() {
        let g = StormGeometry::default();
        assert_abs_diff_eq!(g.runoff_depth(38.0, 140.0, 61.9), 23.0, epsilon = 0.5);
        assert_abs_diff_eq!(g.runoff_depth(38.0, 221.0, 61.9), 36.0, epsilon = 0.5);
        assert_abs_diff_eq!(g.runoff_depth(38.0, 287.0, 61.9), 47.0, epsilon = 0.5);
    }

    #[test]
    fn time_to_peak_reference_values() {
        assert_abs_diff_eq!(time_to_peak(5000.0, 0.08, 120.0).unwrap(), 1.37, epsilon = 0.01);
        assert_abs_diff_eq!(time_to_peak(5000.0, 0.23, 120.0).unwrap(), 1.25, epsilon = 0.01);
        assert_abs_diff_eq!(time_to_peak(3500.0, 0.78, 120.0).unwrap(), 1.12, epsilon = 0.01);
    }

    #[test]
    fn time_to_peak_rejects_bad_geometry() {
        assert!(time_to_peak(0.0, 0.08, 120.0).is_err());
        assert!(time_to_peak(-1.0, 0.08, 120.0).is_err());
        assert!(time_to_peak(5000.0, -1.0, 120.0).is_err());
        assert!(time_to_peak(5000.0, 0.08, 0.0).is_err());
        assert!(time_to_peak(5000.0, 0.08, -1.0).is_err());
    }

    #[test]
    fn flat_catchment_never_peaks() {
        assert_eq!(time_to_peak(5000.0, 0.0, 120.0).unwrap(), f64::INFINITY);
    }

    #[test]
    fn unit_peakflow_reference_values() {
        let g = StormGeometry::default();
        assert_abs_diff_eq!(g.unit_peakflow(250.0, 1.1179).unwrap(), 46.52, epsilon = 0.01);
        assert_abs_diff_eq!(g.unit_peakflow(500.0, 1.2242).unwrap(), 84.96, epsilon = 0.01);
    }

    #[test]
    fn rational_constant_scales_peakflow() {
        let scs = StormGeometry::default();
        let rational = StormGeometry { peakflow: PeakflowConstant::Rational, ..scs };
        let ratio = rational.unit_peakflow(250.0, 1.1179).unwrap()
            / scs.unit_peakflow(250.0, 1.1179).unwrap();
        assert_abs_diff_eq!(ratio, 0.278 / 0.208, epsilon = 1e-12);
    }

    #[test]
    fn unit_peakflow_rejects_bad_input() {
        let g = StormGeometry::default();
        assert!(g.unit_peakflow(0.0, 1.1179).is_err());
        assert!(g.unit_peakflow(-1.0, 1.1179).is_err());
        assert!(g.unit_peakflow(250.0, 0.0).is_err());
        assert!(g.unit_peakflow(250.0, -1.0).is_err());
    }
}
