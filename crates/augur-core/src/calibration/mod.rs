//! Calibration harness: the forward model seen by an external stochastic search.
//!
//! A search driver asks for the [`parameter_space`](CalibrationHarness::parameter_space),
//! proposes vectors, runs [`simulate`](CalibrationHarness::simulate) on each and
//! compares the result with [`observed_targets`](CalibrationHarness::observed_targets)
//! through [`score`](CalibrationHarness::score). `simulate` is a pure function of
//! its vector and the fixed dataset, so candidates may be evaluated in parallel.

pub mod metrics;
pub mod parameters;

use serde::{Deserialize, Serialize};

use crate::catchment::Catchment;
use crate::curve_number::CurveNumberTable;
use crate::error::{HydroError, Result};
use crate::pipeline::{peak_discharges, HydrographConfig};
use crate::soil::{resolve_unclassified, SoilClassifier, SoilGroup, SoilThresholds, UnclassifiedPolicy};

pub use metrics::{column_rmse, mean_column_rmse, relative_difference, rmse};
pub use parameters::{cell_name, DecodedParameters, UniformParameter, N_THRESHOLDS, THRESHOLD_NAMES};

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Append the three soil thresholds to the searched vector.
    pub optimize_soil_thresholds: bool,
    /// Negate the score for samplers that maximise.
    pub reverse_score: bool,
    pub unclassified: UnclassifiedPolicy,
    /// Classifier used when thresholds are not searched.
    pub classifier: SoilClassifier,
    pub hydrograph: HydrographConfig,
}

/// Peaks produced by one `simulate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Dataset row of each simulated catchment, ascending. Rows dropped as
    /// unclassified are absent.
    pub rows: Vec<usize>,
    /// Peak discharge for the 10, 30 and 100 year storms, aligned with `rows`.
    pub peaks: Vec<[f64; 3]>,
}

// ── Harness ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CalibrationHarness {
    catchments: Vec<Catchment>,
    observed: Vec<[f64; 3]>,
    settings: CalibrationSettings,
}

impl CalibrationHarness {
    /// Every catchment must carry its three observed peak discharges.
    pub fn new(catchments: Vec<Catchment>, settings: CalibrationSettings) -> Result<Self> {
        if catchments.is_empty() {
            return Err(HydroError::input("calibration needs at least one catchment"));
        }
        let observed = catchments
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.observed_peaks().ok_or_else(|| {
                    HydroError::input(format!(
                        "catchment {} has no observed q10/q30/q100",
                        c.label(i)
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { catchments, observed, settings })
    }

    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn catchments(&self) -> &[Catchment] {
        &self.catchments
    }

    /// One uniform prior per searched parameter, in vector order.
    pub fn parameter_space(&self) -> Vec<UniformParameter> {
        parameters::parameter_space(self.settings.optimize_soil_thresholds)
    }

    pub fn decode(&self, vector: &[f64]) -> Result<DecodedParameters> {
        parameters::decode(vector, self.settings.optimize_soil_thresholds)
    }

    /// Vector that decodes to `table`. When thresholds are searched and none
    /// are given, the fixed classifier's thresholds are used.
    pub fn encode(&self, table: &CurveNumberTable, thresholds: Option<&SoilThresholds>) -> Vec<f64> {
        if self.settings.optimize_soil_thresholds {
            parameters::encode(table, Some(thresholds.unwrap_or(&SoilThresholds::AUGUR)))
        } else {
            parameters::encode(table, None)
        }
    }

    fn classifier_for(&self, decoded: &DecodedParameters) -> SoilClassifier {
        match decoded.thresholds {
            Some(t) => SoilClassifier::Parametrized(t),
            None => self.settings.classifier,
        }
    }

    /// Peak discharges of every catchment that takes part under the
    /// unclassified policy. The table is rebuilt from `vector` on each call.
    pub fn simulate(&self, vector: &[f64]) -> Result<SimulationOutput> {
        let decoded = self.decode(vector)?;
        let groups = self.classifier_for(&decoded).classify_all(&self.catchments);
        let included = resolve_unclassified(&groups, self.settings.unclassified)?;

        let jobs: Vec<(&Catchment, SoilGroup)> =
            included.iter().map(|&(row, g)| (&self.catchments[row], g)).collect();
        let peaks = peak_discharges(&jobs, &decoded.table, &self.settings.hydrograph)?;

        Ok(SimulationOutput { rows: included.into_iter().map(|(row, _)| row).collect(), peaks })
    }

    /// Observed q10/q30/q100 of every dataset row.
    pub fn observed_targets(&self) -> &[[f64; 3]] {
        &self.observed
    }

    /// Mean over return periods of the per-period RMSE between the simulated
    /// peaks and the observed rows they were computed for. Negated when
    /// `reverse_score` is set.
    pub fn score(&self, simulated: &SimulationOutput, observed: &[[f64; 3]]) -> Result<f64> {
        if simulated.peaks.is_empty() {
            return Err(HydroError::input("no catchment left to score"));
        }
        if simulated.rows.len() != simulated.peaks.len() {
            return Err(HydroError::input(format!(
                "{} simulated rows but {} peak triples",
                simulated.rows.len(),
                simulated.peaks.len()
            )));
        }
        let aligned = simulated
            .rows
            .iter()
            .map(|&row| {
                observed.get(row).copied().ok_or_else(|| {
                    HydroError::input(format!(
                        "simulated row {row} has no observation ({} rows observed)",
                        observed.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let score = mean_column_rmse(&aligned, &simulated.peaks);
        Ok(if self.settings.reverse_score { -score } else { score })
    }

    /// `score(simulate(vector), observed_targets())`.
    pub fn evaluate(&self, vector: &[f64]) -> Result<f64> {
        let simulated = self.simulate(vector)?;
        self.score(&simulated, &self.observed)
    }
}
