//! Discrete convolution of the unit response with an effective-rainfall pulse train.

use crate::error::{HydroError, Result};

/// Loss factor applied to the convolved discharge (routing and baseflow
/// effects the triangle does not model).
pub const ATTENUATION: f64 = 0.9;

/// Convolve `unit` (sampled on the output grid) with `pulses`, truncated to the
/// grid length:
///
///   out[t] = Σ_{k < L, k ≤ t} unit[t − k] · pulses[k]
pub fn convolve(unit: &[f64], pulses: &[f64]) -> Result<Vec<f64>> {
    if pulses.len() > unit.len() {
        return Err(HydroError::input(format!(
            "hyetogram has {} steps but the time grid only {}",
            pulses.len(),
            unit.len()
        )));
    }
    Ok((0..unit.len())
        .map(|t| {
            pulses
                .iter()
                .take(t + 1)
                .enumerate()
                .map(|(k, &p)| unit[t - k] * p)
                .sum::<f64>()
        })
        .collect())
}

/// Convolve and apply `attenuation`.
pub fn route(unit: &[f64], pulses: &[f64], attenuation: f64) -> Result<Vec<f64>> {
    let mut q = convolve(unit, pulses)?;
    for v in &mut q {
        *v *= attenuation;
    }
    Ok(q)
}
