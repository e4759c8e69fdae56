//! Country resolution for table rows.
//!
//! Network tables encode the country of a row in one of three ways: a bus
//! reference whose first two characters are the country code (`"DE0 3"`), an
//! explicit `country` column, or the row identifier itself (`"DE0 3 onwind"`).
//! [`LocationStrategy`] names the encoding so the choice is made once per table
//! and is visible to the caller instead of being inferred row by row.

use std::fmt;

use polars::prelude::*;

use crate::error::SecnetResult;
use crate::frame::{column, has_column, index_column, series_strings};

/// Number of leading characters that form a country code.
pub const COUNTRY_CODE_LEN: usize = 2;

pub const BUS_COLUMN: &str = "bus";
pub const COUNTRY_COLUMN: &str = "country";

/// Leading country code of a location label. Labels shorter than the code
/// length are returned whole.
pub fn country_prefix(label: &str) -> String {
    label.chars().take(COUNTRY_CODE_LEN).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationStrategy {
    /// Country code is the prefix of the named column (e.g. `bus`).
    ColumnPrefix(String),
    /// Country code is stored verbatim in the named column.
    Column(String),
    /// Country code is the prefix of the row identifier.
    IdentifierPrefix,
}

impl LocationStrategy {
    /// Strategy for network component tables: `bus` prefix, then an explicit
    /// `country` column, then the identifier prefix.
    pub fn for_components(df: &DataFrame) -> Self {
        if has_column(df, BUS_COLUMN) {
            LocationStrategy::ColumnPrefix(BUS_COLUMN.to_string())
        } else if has_column(df, COUNTRY_COLUMN) {
            LocationStrategy::Column(COUNTRY_COLUMN.to_string())
        } else {
            LocationStrategy::IdentifierPrefix
        }
    }

    /// Strategy for bus/location tables: explicit `country` column, then the
    /// identifier prefix.
    pub fn for_buses(df: &DataFrame) -> Self {
        if has_column(df, COUNTRY_COLUMN) {
            LocationStrategy::Column(COUNTRY_COLUMN.to_string())
        } else {
            LocationStrategy::IdentifierPrefix
        }
    }

    /// Country code of every row, in row order. Null locations stay `None`.
    pub fn countries(&self, df: &DataFrame) -> SecnetResult<Vec<Option<String>>> {
        let values = match self {
            LocationStrategy::ColumnPrefix(name) | LocationStrategy::Column(name) => {
                series_strings(column(df, name)?)?
            }
            LocationStrategy::IdentifierPrefix => series_strings(index_column(df)?)?,
        };
        Ok(match self {
            LocationStrategy::Column(_) => values,
            _ => values
                .into_iter()
                .map(|value| value.map(|label| country_prefix(&label)))
                .collect(),
        })
    }
}

impl fmt::Display for LocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationStrategy::ColumnPrefix(name) => write!(f, "prefix of '{name}'"),
            LocationStrategy::Column(name) => write!(f, "column '{name}'"),
            LocationStrategy::IdentifierPrefix => write!(f, "prefix of identifier"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_character_based() {
        assert_eq!(country_prefix("DE0 1"), "DE");
        assert_eq!(country_prefix("D"), "D");
        assert_eq!(country_prefix(""), "");
    }

    #[test]
    fn bus_column_takes_priority() {
        let df = df![
            "Generator" => &["XX gen"],
            "bus" => &["FR0 2"],
            "country" => &["PL"]
        ]
        .unwrap();
        let strategy = LocationStrategy::for_components(&df);
        assert_eq!(strategy, LocationStrategy::ColumnPrefix("bus".into()));
        assert_eq!(strategy.countries(&df).unwrap(), vec![Some("FR".to_string())]);
    }

    #[test]
    fn country_column_is_used_verbatim() {
        let df = df!["Store" => &["XX store"], "country" => &["PL"]].unwrap();
        let strategy = LocationStrategy::for_components(&df);
        assert_eq!(strategy, LocationStrategy::Column("country".into()));
        assert_eq!(strategy.countries(&df).unwrap(), vec![Some("PL".to_string())]);
    }

    #[test]
    fn identifier_prefix_is_the_last_resort() {
        let df = df!["Link" => &["UA0 0 H2 pipeline", "MD1 0 battery"]].unwrap();
        let strategy = LocationStrategy::for_components(&df);
        assert_eq!(strategy, LocationStrategy::IdentifierPrefix);
        assert_eq!(
            strategy.countries(&df).unwrap(),
            vec![Some("UA".to_string()), Some("MD".to_string())]
        );
    }

    #[test]
    fn bus_tables_ignore_bus_column() {
        let df = df!["Bus" => &["DE0 0"], "bus" => &["FR0 0"]].unwrap();
        assert_eq!(
            LocationStrategy::for_buses(&df),
            LocationStrategy::IdentifierPrefix
        );
    }

    #[test]
    fn null_locations_stay_unresolved() {
        let df = df!["Generator" => &["a", "b"], "bus" => &[Some("DE0 0"), None]].unwrap();
        let countries = LocationStrategy::for_components(&df).countries(&df).unwrap();
        assert_eq!(countries, vec![Some("DE".to_string()), None]);
    }
}
