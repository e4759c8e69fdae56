//! Country-level discount-rate resolution.
//!
//! A rate is resolved in three tiers: the country's own override, the global
//! (social) rate, and finally [`DEFAULT_DISCOUNT_RATE`]. Resolution never
//! fails; the tier that answered is reported on [`ResolvedRate`] and traced.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use secnet_core::frame::{index_column, index_labels};
use secnet_core::{LocationStrategy, SecnetResult};
use tracing::{debug, warn};

/// Rate used when neither a country override nor a global rate is known.
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.07;

/// Name of the rate column in batch outputs.
pub const RATE_COLUMN: &str = "discount_rate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTier {
    CountrySpecific,
    Global,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRate {
    pub rate: f64,
    pub tier: RateTier,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscountRateResolver<'a> {
    country_rates: &'a BTreeMap<String, f64>,
    global_rate: Option<f64>,
}

impl<'a> DiscountRateResolver<'a> {
    pub fn new(country_rates: &'a BTreeMap<String, f64>, global_rate: Option<f64>) -> Self {
        Self {
            country_rates,
            global_rate,
        }
    }

    pub fn global_rate(&self) -> Option<f64> {
        self.global_rate
    }

    /// Resolve the rate for a country code.
    pub fn resolve(&self, country: &str) -> ResolvedRate {
        if let Some(&rate) = self.country_rates.get(country) {
            debug!(
                "Using country-specific discount rate for {}: {:.1}%",
                country,
                rate * 100.0
            );
            return ResolvedRate {
                rate,
                tier: RateTier::CountrySpecific,
            };
        }
        self.fallback(country)
    }

    pub fn rate(&self, country: &str) -> f64 {
        self.resolve(country).rate
    }

    fn fallback(&self, label: &str) -> ResolvedRate {
        match self.global_rate {
            Some(rate) => {
                debug!("Using global discount rate for {}: {:.1}%", label, rate * 100.0);
                ResolvedRate {
                    rate,
                    tier: RateTier::Global,
                }
            }
            None => {
                warn!(
                    "No discount rate specified in config. Using default rate of {:.1}% for {}",
                    DEFAULT_DISCOUNT_RATE * 100.0,
                    label
                );
                ResolvedRate {
                    rate: DEFAULT_DISCOUNT_RATE,
                    tier: RateTier::Default,
                }
            }
        }
    }

    /// Rates for a list of country codes as a `country, discount_rate` frame.
    ///
    /// Repeated codes appear once, at their first position.
    pub fn country_rates<S: AsRef<str>>(&self, countries: &[S]) -> SecnetResult<DataFrame> {
        let mut seen = HashSet::new();
        let mut codes = Vec::with_capacity(countries.len());
        let mut rates = Vec::with_capacity(countries.len());
        for country in countries {
            let country = country.as_ref();
            if !seen.insert(country) {
                continue;
            }
            codes.push(country);
            rates.push(self.rate(country));
        }
        Ok(DataFrame::new(vec![
            Series::new("country", codes),
            Series::new(RATE_COLUMN, rates),
        ])?)
    }

    /// Rates for every row of a bus/location table, keyed by the table's
    /// identifier column.
    ///
    /// The country comes from an explicit `country` column when the table has
    /// one, otherwise from the first two characters of the identifier.
    pub fn nodal_rates(&self, buses: &DataFrame) -> SecnetResult<DataFrame> {
        let strategy = LocationStrategy::for_buses(buses);
        let countries = strategy.countries(buses)?;
        let ids = index_labels(buses)?;
        let rates: Vec<f64> = countries
            .iter()
            .zip(&ids)
            .map(|(country, id)| match country {
                Some(country) => self.rate(country),
                None => self.fallback(id).rate,
            })
            .collect();
        let id_name = index_column(buses)?.name().to_string();
        Ok(DataFrame::new(vec![
            Series::new(&id_name, ids),
            Series::new(RATE_COLUMN, rates),
        ])?)
    }
}

/// Resolve a single country's rate without keeping a resolver around.
pub fn resolve_discount_rate(
    country: &str,
    country_rates: &BTreeMap<String, f64>,
    global_rate: Option<f64>,
) -> f64 {
    DiscountRateResolver::new(country_rates, global_rate).rate(country)
}
