//! # secnet-costs: country-specific discount rates
//!
//! Resolves the discount rate of a country, bus or network component and
//! carries it into the cost data of a capacity-expansion model:
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | [`DiscountRateResolver::resolve`] | country override → global rate → [`DEFAULT_DISCOUNT_RATE`] |
//! | [`DiscountRateResolver::country_rates`] / [`DiscountRateResolver::nodal_rates`] | batch resolution into a frame |
//! | [`apply_country_specific_costs`] | per-country copies of the technology cost table |
//! | [`adjust_capital_costs`] | rescale annualized capital costs by an annuity ratio |
//!
//! ## Example
//!
//! ```ignore
//! use secnet_costs::{CostsConfig, NetworkComponents};
//!
//! let config = CostsConfig::new(0.07).with_country_rate("UA", 0.12);
//! let report = components.apply_country_discount_rates(&config)?;
//! println!("{} components rescaled", report.total());
//! ```

pub mod adjust;
pub mod annuity;
pub mod config;
pub mod discount;
pub mod expand;

pub use adjust::{
    adjust_capital_costs, AdjustedRow, AdjustmentReport, CapitalCostAdjustment, ComponentKind,
    NetworkComponents, CAPITAL_COST_COLUMN,
};
pub use annuity::{annuity, capital_cost_factor, DEFAULT_ASSET_LIFETIME, RATE_TOLERANCE};
pub use config::CostsConfig;
pub use discount::{
    resolve_discount_rate, DiscountRateResolver, RateTier, ResolvedRate, DEFAULT_DISCOUNT_RATE,
};
pub use expand::{apply_country_specific_costs, DISCOUNT_RATE_COLUMN};
