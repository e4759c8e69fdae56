//! Nodal district heating shares.
//!
//! Country-level historical shares are spread over the nodes of a country by
//! where its urban population lives, then moved toward the configured
//! potential by the progress factor of the investment year.
//!
//! Per node `n` in country `c`:
//!
//! ```text
//! urban_ct_fraction = urban[n] / Σ urban[c]
//! urban_fraction    = urban[n] / (urban[n] + rural[n])
//! dist              = share[c] * urban_ct_fraction / fraction[n]
//! urban_fraction    = max(urban_fraction, dist)
//! diff              = max(0, urban_fraction * potential[c] - dist)
//! share[n]          = dist + diff * progress(year)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use secnet_core::frame::{float_column, index_column, index_labels, string_column};
use secnet_core::{SecnetError, SecnetResult};
use tracing::{debug, info};

use crate::config::{DistrictHeatingConfig, Potential};
use crate::schedule::YearDependent;

pub const COUNTRY_COLUMN: &str = "ct";
pub const URBAN_COLUMN: &str = "urban";
pub const RURAL_COLUMN: &str = "rural";
pub const FRACTION_COLUMN: &str = "fraction";

pub const ORIGINAL_SHARE_COLUMN: &str = "original district heat share";
pub const DISTRICT_FRACTION_COLUMN: &str = "district fraction of node";
pub const URBAN_FRACTION_COLUMN: &str = "urban fraction";

/// Historical district heating share per country for one reference year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalShare {
    shares: BTreeMap<String, f64>,
}

impl HistoricalShare {
    pub fn new(shares: BTreeMap<String, f64>) -> Self {
        Self { shares }
    }

    /// Read the column of `year` from a table whose first column holds
    /// country codes and whose other columns are years.
    pub fn from_frame(df: &DataFrame, year: i32) -> SecnetResult<Self> {
        let countries = index_labels(df)?;
        let values = float_column(df, &year.to_string())?;
        Ok(Self {
            shares: countries
                .into_iter()
                .zip(values)
                .filter(|(_, value)| !value.is_nan())
                .collect(),
        })
    }

    /// Share of `country`; countries without data have no district heating.
    pub fn share(&self, country: &str) -> f64 {
        self.shares.get(country).copied().unwrap_or(0.0)
    }
}

/// Result row for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHeatShare {
    pub node: String,
    pub country: String,
    /// Country share broadcast onto the node.
    pub original_share: f64,
    /// Node's part of its country's urban population.
    pub urban_ct_fraction: f64,
    /// Share before progress toward the potential is applied.
    pub base_district_fraction: f64,
    /// Projected share for the investment year.
    pub district_fraction: f64,
    /// Urban fraction, raised to the base share where it was lower.
    pub urban_fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictHeatShares {
    /// Name of the identifier column carried over from the population layout.
    pub index_name: String,
    pub nodes: Vec<NodeHeatShare>,
    pub progress: f64,
}

impl DistrictHeatShares {
    pub fn node(&self, node: &str) -> Option<&NodeHeatShare> {
        self.nodes.iter().find(|row| row.node == node)
    }

    /// Mean projected share over nodes, skipping undefined values.
    pub fn mean_share(&self) -> f64 {
        let defined: Vec<f64> = self
            .nodes
            .iter()
            .map(|row| row.district_fraction)
            .filter(|value| !value.is_nan())
            .collect();
        if defined.is_empty() {
            return f64::NAN;
        }
        defined.iter().sum::<f64>() / defined.len() as f64
    }

    /// Output table: identifier, original share, projected share, urban fraction.
    pub fn to_frame(&self) -> SecnetResult<DataFrame> {
        let nodes: Vec<&str> = self.nodes.iter().map(|row| row.node.as_str()).collect();
        let original: Vec<f64> = self.nodes.iter().map(|row| row.original_share).collect();
        let district: Vec<f64> = self.nodes.iter().map(|row| row.district_fraction).collect();
        let urban: Vec<f64> = self.nodes.iter().map(|row| row.urban_fraction).collect();
        Ok(DataFrame::new(vec![
            Series::new(&self.index_name, nodes),
            Series::new(ORIGINAL_SHARE_COLUMN, original),
            Series::new(DISTRICT_FRACTION_COLUMN, district),
            Series::new(URBAN_FRACTION_COLUMN, urban),
        ])?)
    }
}

impl DistrictHeatingConfig {
    pub fn project(
        &self,
        pop_layout: &DataFrame,
        historical: &HistoricalShare,
        investment_year: i32,
    ) -> SecnetResult<DistrictHeatShares> {
        project_district_heat_share(
            pop_layout,
            historical,
            &self.potential,
            &self.progress,
            investment_year,
        )
    }
}

/// Project nodal district heating shares for `investment_year`.
///
/// `pop_layout` holds one row per node: identifier (first column), `ct`,
/// `urban`, `rural` and `fraction` (the node's share of its country's total
/// population). Fails only when `potential` leaves a country of the layout
/// without a ceiling.
pub fn project_district_heat_share(
    pop_layout: &DataFrame,
    historical: &HistoricalShare,
    potential: &Potential,
    progress: &YearDependent,
    investment_year: i32,
) -> SecnetResult<DistrictHeatShares> {
    let index_name = index_column(pop_layout)?.name().to_string();
    let nodes = index_labels(pop_layout)?;
    let countries = string_column(pop_layout, COUNTRY_COLUMN)?
        .into_iter()
        .zip(&nodes)
        .map(|(country, node)| {
            country.ok_or_else(|| {
                SecnetError::Validation(format!("node '{node}' has no country code"))
            })
        })
        .collect::<SecnetResult<Vec<String>>>()?;
    let urban = float_column(pop_layout, URBAN_COLUMN)?;
    let rural = float_column(pop_layout, RURAL_COLUMN)?;
    let fraction = float_column(pop_layout, FRACTION_COLUMN)?;

    let ct_urban = urban_population_by_country(pop_layout)?;
    let present: BTreeSet<String> = countries.iter().cloned().collect();
    let ceilings = potential.ceilings(&present)?;
    let progress = progress.value_at(investment_year)?;

    let mut rows = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.into_iter().enumerate() {
        let country = &countries[i];
        let original_share = historical.share(country);
        let country_urban = ct_urban.get(country).copied().unwrap_or(f64::NAN);
        let urban_ct_fraction = urban[i] / country_urban;
        let urban_fraction = urban[i] / skipna_sum(&[rural[i], urban[i]]);

        let base = original_share * urban_ct_fraction / fraction[i];
        // f64::max returns the other operand when one is NaN.
        let urban_fraction = urban_fraction.max(base);
        let ceiling = ceilings.get(country).copied().unwrap_or(f64::NAN);
        let diff = clip_lower(urban_fraction * ceiling - base, 0.0);

        rows.push(NodeHeatShare {
            country: country.clone(),
            original_share,
            urban_ct_fraction,
            base_district_fraction: base,
            district_fraction: base + diff * progress,
            urban_fraction,
            node,
        });
    }

    let shares = DistrictHeatShares {
        index_name,
        nodes: rows,
        progress,
    };
    info!(
        "Increase district heating share by a progress factor of {:.2}% \
         resulting in new average share of {:.2}%",
        progress * 100.0,
        shares.mean_share() * 100.0
    );
    debug!(
        "Projected district heating shares for {} nodes in {} countries ({})",
        shares.nodes.len(),
        present.len(),
        investment_year
    );
    Ok(shares)
}

/// Total urban population per country. Undefined entries are skipped.
fn urban_population_by_country(pop_layout: &DataFrame) -> SecnetResult<BTreeMap<String, f64>> {
    let totals = pop_layout
        .clone()
        .lazy()
        .select([
            col(COUNTRY_COLUMN).cast(DataType::Utf8),
            col(URBAN_COLUMN)
                .cast(DataType::Float64)
                .fill_nan(lit(NULL)),
        ])
        .group_by([col(COUNTRY_COLUMN)])
        .agg([col(URBAN_COLUMN).sum()])
        .collect()?;

    let countries = string_column(&totals, COUNTRY_COLUMN)?;
    let sums = float_column(&totals, URBAN_COLUMN)?;
    Ok(countries
        .into_iter()
        .zip(sums)
        .filter_map(|(country, sum)| country.map(|country| (country, sum)))
        .collect())
}

/// Sum ignoring undefined values; all-undefined sums to zero.
fn skipna_sum(values: &[f64]) -> f64 {
    values.iter().filter(|value| !value.is_nan()).sum()
}

/// Lower clip that leaves undefined values undefined.
fn clip_lower(value: f64, lower: f64) -> f64 {
    if value < lower {
        lower
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> DataFrame {
        df![
            "name" => &["DE0 0", "DE0 1"],
            "ct" => &["DE", "DE"],
            "urban" => &[60.0, 40.0],
            "rural" => &[40.0, 60.0],
            "fraction" => &[0.5, 0.5]
        ]
        .unwrap()
    }

    fn historical() -> HistoricalShare {
        HistoricalShare::new(BTreeMap::from([("DE".to_string(), 0.4)]))
    }

    #[test]
    fn urban_population_is_spread_within_country() {
        let shares = project_district_heat_share(
            &layout(),
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(1.0),
            2050,
        )
        .unwrap();
        let first = shares.node("DE0 0").unwrap();
        let second = shares.node("DE0 1").unwrap();
        assert!((first.urban_ct_fraction - 0.6).abs() < 1e-12);
        assert!((second.urban_ct_fraction - 0.4).abs() < 1e-12);
        assert!((first.base_district_fraction - 0.48).abs() < 1e-12);
        assert!((second.base_district_fraction - 0.32).abs() < 1e-12);
    }

    #[test]
    fn undefined_urban_population_stays_on_its_node() {
        let layout = df![
            "name" => &["DE0 0", "DE0 1", "DE0 2"],
            "ct" => &["DE", "DE", "DE"],
            "urban" => &[60.0, 40.0, f64::NAN],
            "rural" => &[40.0, 60.0, 50.0],
            "fraction" => &[0.5, 0.5, 0.5]
        ]
        .unwrap();
        let totals = urban_population_by_country(&layout).unwrap();
        assert_eq!(totals["DE"], 100.0);

        let shares = project_district_heat_share(
            &layout,
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(1.0),
            2050,
        )
        .unwrap();
        let first = shares.node("DE0 0").unwrap();
        let second = shares.node("DE0 1").unwrap();
        assert!((first.urban_ct_fraction - 0.6).abs() < 1e-12);
        assert!((second.urban_ct_fraction - 0.4).abs() < 1e-12);
        assert!((first.base_district_fraction - 0.48).abs() < 1e-12);
        assert!(second.district_fraction.is_finite());
        assert!(shares.node("DE0 2").unwrap().urban_ct_fraction.is_nan());
    }

    #[test]
    fn no_headroom_keeps_base_share() {
        // urban_fraction * 0.5 lies below the allocated share on both nodes.
        let shares = project_district_heat_share(
            &layout(),
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(1.0),
            2050,
        )
        .unwrap();
        assert!((shares.nodes[0].district_fraction - 0.48).abs() < 1e-12);
        assert!((shares.nodes[1].district_fraction - 0.32).abs() < 1e-12);
    }

    #[test]
    fn full_progress_reaches_the_potential() {
        let shares = project_district_heat_share(
            &layout(),
            &historical(),
            &Potential::Uniform(1.0),
            &YearDependent::Constant(1.0),
            2050,
        )
        .unwrap();
        assert!((shares.nodes[0].district_fraction - 0.6).abs() < 1e-12);
        assert!((shares.nodes[1].district_fraction - 0.4).abs() < 1e-12);
    }

    #[test]
    fn partial_progress_closes_part_of_the_gap() {
        let shares = project_district_heat_share(
            &layout(),
            &historical(),
            &Potential::Uniform(1.0),
            &YearDependent::Constant(0.5),
            2030,
        )
        .unwrap();
        assert!((shares.nodes[0].district_fraction - 0.54).abs() < 1e-12);
        assert!((shares.nodes[1].district_fraction - 0.36).abs() < 1e-12);
        assert_eq!(shares.progress, 0.5);
    }

    #[test]
    fn urban_fraction_is_raised_to_allocated_share() {
        let df = df![
            "name" => &["DE0 0", "DE0 1"],
            "ct" => &["DE", "DE"],
            "urban" => &[90.0, 10.0],
            "rural" => &[110.0, 90.0],
            "fraction" => &[0.2, 0.8]
        ]
        .unwrap();
        let shares = project_district_heat_share(
            &df,
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(0.0),
            2020,
        )
        .unwrap();
        // 0.4 * 0.9 / 0.2 = 1.8 exceeds urban fraction 0.45.
        let first = &shares.nodes[0];
        assert!((first.base_district_fraction - 1.8).abs() < 1e-12);
        assert!((first.urban_fraction - 1.8).abs() < 1e-12);
        let second = &shares.nodes[1];
        // 0.4 * 0.1 / 0.8 = 0.05 stays below urban fraction 0.1.
        assert!((second.urban_fraction - 0.1).abs() < 1e-12);
    }

    #[test]
    fn missing_historical_share_is_zero() {
        let df = df![
            "name" => &["FR0 0"],
            "ct" => &["FR"],
            "urban" => &[80.0],
            "rural" => &[20.0],
            "fraction" => &[1.0]
        ]
        .unwrap();
        let shares = project_district_heat_share(
            &df,
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(0.5),
            2030,
        )
        .unwrap();
        let row = &shares.nodes[0];
        assert_eq!(row.original_share, 0.0);
        assert_eq!(row.base_district_fraction, 0.0);
        assert!((row.district_fraction - 0.2).abs() < 1e-12);
    }

    #[test]
    fn historical_share_reads_year_column() {
        let df = df![
            "country" => &["DE", "FR", "PL"],
            "2019" => &[Some(0.12), None, Some(0.4)],
            "2020" => &[Some(0.13), Some(0.05), Some(0.41)]
        ]
        .unwrap();
        let historical = HistoricalShare::from_frame(&df, 2019).unwrap();
        assert_eq!(historical.share("DE"), 0.12);
        assert_eq!(historical.share("FR"), 0.0);
        assert_eq!(historical.share("IT"), 0.0);
        assert!(matches!(
            HistoricalShare::from_frame(&df, 2018),
            Err(SecnetError::MissingColumn { .. })
        ));
    }

    #[test]
    fn null_country_code_is_rejected() {
        let df = df![
            "name" => &["DE0 0"],
            "ct" => &[None::<&str>],
            "urban" => &[1.0],
            "rural" => &[1.0],
            "fraction" => &[1.0]
        ]
        .unwrap();
        let err = project_district_heat_share(
            &df,
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(0.5),
            2030,
        )
        .unwrap_err();
        assert!(matches!(err, SecnetError::Validation(_)));
    }

    #[test]
    fn output_frame_columns() {
        let shares = project_district_heat_share(
            &layout(),
            &historical(),
            &Potential::Uniform(0.5),
            &YearDependent::Constant(1.0),
            2050,
        )
        .unwrap();
        let df = shares.to_frame().unwrap();
        assert_eq!(
            df.get_column_names(),
            vec![
                "name",
                ORIGINAL_SHARE_COLUMN,
                DISTRICT_FRACTION_COLUMN,
                URBAN_FRACTION_COLUMN
            ]
        );
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column(ORIGINAL_SHARE_COLUMN).unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn helpers_follow_undefined_value_rules() {
        assert_eq!(skipna_sum(&[f64::NAN, 2.0]), 2.0);
        assert_eq!(skipna_sum(&[f64::NAN, f64::NAN]), 0.0);
        assert!(clip_lower(f64::NAN, 0.0).is_nan());
        assert_eq!(clip_lower(-0.1, 0.0), 0.0);
    }
}
