//! District heating configuration block.

use std::collections::{BTreeMap, BTreeSet};

use secnet_core::{SecnetError, SecnetResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schedule::YearDependent;

/// Key of the fallback entry in a per-country potential mapping.
pub const DEFAULT_KEY: &str = "default";

/// Maximum share of urban heat demand that district heating may cover.
///
/// Deserializes from a scalar (`potential: 0.6`) or from a mapping of
/// country codes with an optional `default` entry:
///
/// ```yaml
/// potential:
///   DE: 0.4
///   DK: 0.7
///   default: 0.3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PotentialRepr", into = "PotentialRepr")]
pub enum Potential {
    Uniform(f64),
    PerCountry {
        shares: BTreeMap<String, f64>,
        default: Option<f64>,
    },
}

impl Potential {
    /// Ceiling per country for every country in `countries`.
    ///
    /// A per-country mapping must either cover all countries or provide a
    /// default; otherwise [`SecnetError::MissingDefaultPotential`] is returned.
    pub fn ceilings(&self, countries: &BTreeSet<String>) -> SecnetResult<BTreeMap<String, f64>> {
        match self {
            Potential::Uniform(value) => Ok(countries
                .iter()
                .map(|country| (country.clone(), *value))
                .collect()),
            Potential::PerCountry { shares, default } => {
                let uncovered: Vec<String> = countries
                    .iter()
                    .filter(|country| !shares.contains_key(*country))
                    .cloned()
                    .collect();
                if uncovered.is_empty() {
                    return Ok(countries
                        .iter()
                        .map(|country| (country.clone(), shares[country]))
                        .collect());
                }
                let default = default.ok_or_else(|| SecnetError::MissingDefaultPotential {
                    countries: uncovered.clone(),
                })?;
                warn!(
                    "Some countries do not have a district heating potential defined. \
                     Using default value {:.2}% for these countries: {}",
                    default * 100.0,
                    uncovered.join(", ")
                );
                Ok(countries
                    .iter()
                    .map(|country| {
                        let ceiling = shares.get(country).copied().unwrap_or(default);
                        (country.clone(), ceiling)
                    })
                    .collect())
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PotentialRepr {
    Uniform(f64),
    PerCountry(BTreeMap<String, f64>),
}

impl From<PotentialRepr> for Potential {
    fn from(repr: PotentialRepr) -> Self {
        match repr {
            PotentialRepr::Uniform(value) => Potential::Uniform(value),
            PotentialRepr::PerCountry(mut shares) => {
                let default = shares.remove(DEFAULT_KEY);
                Potential::PerCountry { shares, default }
            }
        }
    }
}

impl From<Potential> for PotentialRepr {
    fn from(potential: Potential) -> Self {
        match potential {
            Potential::Uniform(value) => PotentialRepr::Uniform(value),
            Potential::PerCountry {
                mut shares,
                default,
            } => {
                if let Some(default) = default {
                    shares.insert(DEFAULT_KEY.to_string(), default);
                }
                PotentialRepr::PerCountry(shares)
            }
        }
    }
}

/// The `district_heating` part of the sector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictHeatingConfig {
    pub potential: Potential,
    /// Fraction of the gap between today's share and the potential that is
    /// closed by a given investment year.
    pub progress: YearDependent,
}
