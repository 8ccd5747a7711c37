//! Temporal disaggregation of a runoff depth over the storm duration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HydroError, Result};

/// Share of the storm depth falling in each quarter of the storm.
pub const QUARTILE_FRACTIONS: [f64; 4] = [0.18, 0.46, 0.23, 0.13];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HyetogramMethod {
    /// Front-loaded quartile distribution; step count must be a multiple of 4.
    #[default]
    Structured,
    /// Same depth in every step.
    Constant,
}

impl FromStr for HyetogramMethod {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(HyetogramMethod::Structured),
            "constant" => Ok(HyetogramMethod::Constant),
            other => Err(HydroError::config(format!("unknown hyetogram method '{other}'"))),
        }
    }
}

/// Depth per step (mm). Sums to `total_depth` for both methods.
pub fn hyetogram(steps: usize, total_depth: f64, method: HyetogramMethod) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(HydroError::input("a hyetogram needs at least one time step"));
    }
    match method {
        HyetogramMethod::Structured => {
            if steps % QUARTILE_FRACTIONS.len() != 0 {
                return Err(HydroError::input(format!(
                    "the structured hyetogram needs a multiple of 4 time steps, got {steps}"
                )));
            }
            let repeat = steps / QUARTILE_FRACTIONS.len();
            Ok(QUARTILE_FRACTIONS
                .iter()
                .flat_map(|&f| std::iter::repeat_n(f / repeat as f64 * total_depth, repeat))
                .collect())
        }
        HyetogramMethod::Constant => Ok(vec![total_depth / steps as f64; steps]),
    }
}
