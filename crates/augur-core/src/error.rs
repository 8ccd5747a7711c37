//! Error taxonomy shared by every stage of the runoff engine.
//!
//! All variants are validation failures: the computation in progress is aborted
//! and nothing partial is returned.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HydroError {
    /// A named variant, method or dataset key is not known.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A physical input is outside its domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catchments whose soil attributes matched no classification rule.
    #[error("{count} catchment(s) could not be assigned a hydrologic soil group")]
    ClassificationFailure { count: usize },

    /// A soil group or land-cover key is absent from a curve number table.
    #[error("lookup failed: {0}")]
    LookupFailure(String),
}

pub type Result<T> = std::result::Result<T, HydroError>;

impl HydroError {
    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
