//! Costs configuration block.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::discount::DiscountRateResolver;

/// The discount-rate part of the `costs` configuration.
///
/// ```yaml
/// costs:
///   social_discountrate: 0.07
///   country_specific_discountrate:
///     UA: 0.12
///     MD: 0.10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostsConfig {
    /// Global rate; also the rate the technology cost table was built with.
    pub social_discountrate: f64,
    #[serde(default)]
    pub country_specific_discountrate: BTreeMap<String, f64>,
}

impl CostsConfig {
    pub fn new(social_discountrate: f64) -> Self {
        Self {
            social_discountrate,
            country_specific_discountrate: BTreeMap::new(),
        }
    }

    /// Add or replace a country override.
    pub fn with_country_rate(mut self, country: impl Into<String>, rate: f64) -> Self {
        self.country_specific_discountrate.insert(country.into(), rate);
        self
    }

    pub fn resolver(&self) -> DiscountRateResolver<'_> {
        DiscountRateResolver::new(
            &self.country_specific_discountrate,
            Some(self.social_discountrate),
        )
    }
}
