//! SCS curve-number design hydrographs and the calibration harness around them.
//!
//! [`compute_hydrograph`] turns one catchment, its hydrologic soil group, its
//! design precipitation and a [`CurveNumberTable`] into discharge hydrographs
//! for the 10, 30 and 100 year storms. [`CalibrationHarness`] wraps that
//! pipeline as a forward model for stochastic searches over the table (and
//! optionally the soil classification thresholds).

pub mod calibration;
pub mod catchment;
pub mod convolution;
pub mod curve_number;
pub mod error;
pub mod hyetogram;
pub mod land_cover;
pub mod pipeline;
pub mod precipitation;
pub mod soil;
pub mod storm;
pub mod unit_hydrograph;

pub use calibration::{CalibrationHarness, CalibrationSettings, DecodedParameters, SimulationOutput, UniformParameter};
pub use catchment::{Catchment, DesignPrecipitation, RETURN_PERIODS};
pub use curve_number::{cn_factor, CnRow, CnVariant, CurveNumberTable};
pub use error::{HydroError, Result};
pub use hyetogram::HyetogramMethod;
pub use land_cover::{LandCover, LandCoverDataset};
pub use pipeline::{compute_hydrograph, peak_discharges, Hydrograph, HydrographConfig};
pub use precipitation::{return_levels, Gumbel};
pub use soil::{SoilClassifier, SoilGroup, SoilSample, SoilThresholds, UnclassifiedPolicy};
pub use storm::{PeakflowConstant, StormGeometry};
pub use unit_hydrograph::UnitHydrograph;
