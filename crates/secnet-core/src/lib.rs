//! # secnet-core: shared plumbing for sector-network parameter builders
//!
//! The builders in this workspace turn already-loaded input tables into derived
//! techno-economic parameters for a capacity-expansion model. This crate holds
//! what they share:
//!
//! - [`error`] - [`SecnetError`] and the [`SecnetResult`] alias
//! - [`frame`] - typed column access over polars [`DataFrame`](polars::prelude::DataFrame)s
//! - [`location`] - how a row's country code is derived ([`LocationStrategy`])
//!
//! Tables carry no index; the first column of every frame is its row identifier.

pub mod error;
pub mod frame;
pub mod location;

pub use error::{SecnetError, SecnetResult};
pub use location::{country_prefix, LocationStrategy, COUNTRY_CODE_LEN};
