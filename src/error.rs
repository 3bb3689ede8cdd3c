//! Errors surfaced to the user.
//!
//! Everything an analysis can fail with collapses into two kinds: the data
//! file is missing, or the computation failed for a typed reason.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    basket::BasketError, config::ConfigError, loader::LoadError, report::ReportError,
    rules::RuleError, transactions::FilterError,
};

/// Failure of a computation step.
#[derive(Debug, Error)]
pub enum ComputationError {
    /// Wrapped loader error.
    #[error(transparent)]
    Load(LoadError),

    /// Wrapped basket construction error.
    #[error(transparent)]
    Basket(#[from] BasketError),

    /// Wrapped rule mining error.
    #[error(transparent)]
    Rules(#[from] RuleError),

    /// Wrapped filter validation error.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Wrapped configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Wrapped report rendering error.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Analysis Errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The transaction log does not exist.
    #[error("data file {} not found", path.display())]
    DataFileMissing {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Any other failure, with its cause.
    #[error("an error occurred: {0}")]
    Computation(#[from] ComputationError),
}

impl From<LoadError> for AnalysisError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(path) => Self::DataFileMissing { path },
            other => Self::Computation(ComputationError::Load(other)),
        }
    }
}

macro_rules! computation_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for AnalysisError {
                fn from(err: $source) -> Self {
                    Self::Computation(ComputationError::from(err))
                }
            }
        )*
    };
}

computation_from!(BasketError, RuleError, FilterError, ConfigError, ReportError);
