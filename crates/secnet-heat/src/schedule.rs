//! Values that may depend on the investment year.
//!
//! A configuration entry is either a constant or a year-keyed table. Lookups
//! between table years interpolate linearly; lookups outside the table take
//! the nearest end.

use std::collections::BTreeMap;
use std::fmt;

use secnet_core::{SecnetError, SecnetResult};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "YearDependentRepr", into = "YearDependentRepr")]
pub enum YearDependent {
    Constant(f64),
    ByYear(BTreeMap<i32, f64>),
}

impl YearDependent {
    pub fn by_year(values: impl IntoIterator<Item = (i32, f64)>) -> Self {
        YearDependent::ByYear(values.into_iter().collect())
    }

    /// Value for `year`.
    ///
    /// An empty year table has no value for any year and is a configuration
    /// error.
    pub fn value_at(&self, year: i32) -> SecnetResult<f64> {
        let table = match self {
            YearDependent::Constant(value) => return Ok(*value),
            YearDependent::ByYear(table) => table,
        };
        if let Some(value) = table.get(&year) {
            return Ok(*value);
        }

        let (first_year, first) = table
            .first_key_value()
            .ok_or_else(|| SecnetError::Config("year-dependent value has no entries".into()))?;
        let (last_year, last) = table
            .last_key_value()
            .ok_or_else(|| SecnetError::Config("year-dependent value has no entries".into()))?;
        warn!("Investment year {} not found in {:?}", year, table);

        if year < *first_year {
            warn!("Lower than minimum key. Taking minimum key {}", first_year);
            return Ok(*first);
        }
        if year > *last_year {
            warn!("Higher than maximum key. Taking maximum key {}", last_year);
            return Ok(*last);
        }

        warn!("Interpolate linearly between the next lower and next higher year.");
        // Both exist: year lies strictly inside the key range and is not a key.
        let (lower_year, lower) = table
            .range(..year)
            .next_back()
            .ok_or_else(|| format!("no year below {year}"))?;
        let (upper_year, upper) = table
            .range(year..)
            .next()
            .ok_or_else(|| format!("no year above {year}"))?;
        let weight = f64::from(year - lower_year) / f64::from(upper_year - lower_year);
        Ok(lower + (upper - lower) * weight)
    }
}

impl From<f64> for YearDependent {
    fn from(value: f64) -> Self {
        YearDependent::Constant(value)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum YearDependentRepr {
    Constant(f64),
    ByYear(BTreeMap<YearKey, f64>),
}

impl From<YearDependentRepr> for YearDependent {
    fn from(repr: YearDependentRepr) -> Self {
        match repr {
            YearDependentRepr::Constant(value) => YearDependent::Constant(value),
            YearDependentRepr::ByYear(table) => {
                YearDependent::ByYear(table.into_iter().map(|(key, v)| (key.0, v)).collect())
            }
        }
    }
}

impl From<YearDependent> for YearDependentRepr {
    fn from(value: YearDependent) -> Self {
        match value {
            YearDependent::Constant(value) => YearDependentRepr::Constant(value),
            YearDependent::ByYear(table) => {
                YearDependentRepr::ByYear(table.into_iter().map(|(y, v)| (YearKey(y), v)).collect())
            }
        }
    }
}

/// Map key accepting both integer (YAML) and numeric-string (JSON) years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct YearKey(i32);

impl Serialize for YearKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for YearKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct YearVisitor;

        impl Visitor<'_> for YearVisitor {
            type Value = YearKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a year as integer or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<YearKey, E> {
                i32::try_from(v)
                    .map(YearKey)
                    .map_err(|_| E::custom(format!("year {v} out of range")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<YearKey, E> {
                i32::try_from(v)
                    .map(YearKey)
                    .map_err(|_| E::custom(format!("year {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<YearKey, E> {
                v.trim()
                    .parse()
                    .map(YearKey)
                    .map_err(|_| E::custom(format!("invalid year '{v}'")))
            }
        }

        deserializer.deserialize_any(YearVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> YearDependent {
        YearDependent::by_year([(2020, 0.0), (2030, 0.3), (2050, 1.0)])
    }

    #[test]
    fn constant_applies_to_every_year() {
        let value = YearDependent::from(0.6);
        assert_eq!(value.value_at(1990).unwrap(), 0.6);
        assert_eq!(value.value_at(2050).unwrap(), 0.6);
    }

    #[test]
    fn exact_year_is_returned() {
        assert_eq!(progress().value_at(2030).unwrap(), 0.3);
    }

    #[test]
    fn years_outside_the_table_take_the_nearest_end() {
        assert_eq!(progress().value_at(2015).unwrap(), 0.0);
        assert_eq!(progress().value_at(2060).unwrap(), 1.0);
    }

    #[test]
    fn years_inside_the_table_interpolate() {
        assert!((progress().value_at(2025).unwrap() - 0.15).abs() < 1e-12);
        assert!((progress().value_at(2040).unwrap() - 0.65).abs() < 1e-12);
    }

    #[test]
    fn empty_table_is_a_config_error() {
        let err = YearDependent::ByYear(BTreeMap::new())
            .value_at(2030)
            .unwrap_err();
        assert!(matches!(err, SecnetError::Config(_)));
    }

    #[test]
    fn parses_yaml_integer_years() {
        let value: YearDependent = serde_yaml::from_str("2020: 0.0\n2050: 1.0\n").unwrap();
        assert_eq!(value, YearDependent::by_year([(2020, 0.0), (2050, 1.0)]));
    }

    #[test]
    fn parses_json_string_years() {
        let value: YearDependent = serde_json::from_str(r#"{"2020": 0.0, "2050": 1}"#).unwrap();
        assert_eq!(value, YearDependent::by_year([(2020, 0.0), (2050, 1.0)]));
    }

    #[test]
    fn parses_scalar() {
        let value: YearDependent = serde_yaml::from_str("0.5").unwrap();
        assert_eq!(value, YearDependent::Constant(0.5));
    }
}
