//! # secnet-heat: nodal district heating shares
//!
//! Derives the district heating share of every network node for an investment
//! year from country-level historical shares, the population layout of the
//! network, and a configured maximum potential approached at a year-dependent
//! progress rate.
//!
//! ```ignore
//! use secnet_heat::{DistrictHeatingConfig, HistoricalShare};
//!
//! let config: DistrictHeatingConfig = serde_yaml::from_value(block)?;
//! let historical = HistoricalShare::from_frame(&district_heat_share, 2019)?;
//! let shares = config.project(&pop_layout, &historical, 2050)?;
//! let table = shares.to_frame()?;
//! ```

pub mod config;
pub mod schedule;
pub mod share;

pub use config::{DistrictHeatingConfig, Potential};
pub use schedule::YearDependent;
pub use share::{
    project_district_heat_share, DistrictHeatShares, HistoricalShare, NodeHeatShare,
    DISTRICT_FRACTION_COLUMN, ORIGINAL_SHARE_COLUMN, URBAN_FRACTION_COLUMN,
};
