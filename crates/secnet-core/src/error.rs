//! Unified error type for the sector-network parameter builders.
//!
//! Every builder in the workspace returns [`SecnetResult`]. Sparse input data
//! (a country without a discount-rate override, a node without a historical
//! share) is absorbed by fallback rules and never reaches this type; what does
//! reach it is malformed tables and configuration the builders cannot repair.
//!
//! # Example
//!
//! ```ignore
//! use secnet_core::{SecnetError, SecnetResult};
//!
//! fn build(layout: &DataFrame) -> SecnetResult<()> {
//!     let urban = secnet_core::frame::float_column(layout, "urban")?;
//!     if urban.is_empty() {
//!         return Err(SecnetError::Validation("empty layout".into()));
//!     }
//!     Ok(())
//! }
//! ```

use polars::prelude::PolarsError;
use thiserror::Error;

/// Unified error type for all parameter-builder operations.
#[derive(Error, Debug)]
pub enum SecnetError {
    /// Errors raised by polars while reading or assembling frames
    #[error("Frame error: {0}")]
    Frame(#[from] PolarsError),

    /// A table lacks a column the operation requires
    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A per-country district heating potential leaves countries uncovered
    /// and provides no `default` entry.
    #[error(
        "No default district heating potential was provided in the config \
         (countries without a potential: {})",
        .countries.join(", ")
    )]
    MissingDefaultPotential { countries: Vec<String> },

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using SecnetError.
pub type SecnetResult<T> = Result<T, SecnetError>;

impl SecnetError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        SecnetError::MissingColumn {
            column: column.into(),
        }
    }
}

impl From<String> for SecnetError {
    fn from(s: String) -> Self {
        SecnetError::Other(s)
    }
}
