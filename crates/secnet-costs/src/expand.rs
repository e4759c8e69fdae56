//! Per-country copies of the technology cost table.

use polars::prelude::*;
use secnet_core::location::COUNTRY_COLUMN;
use secnet_core::{SecnetError, SecnetResult};
use tracing::info;

use crate::discount::DiscountRateResolver;

/// Rate column of the technology cost table.
pub const DISCOUNT_RATE_COLUMN: &str = "discount rate";

/// Write country-specific discount rates into a technology cost table.
///
/// With several countries every technology row is repeated once per country,
/// in country order, under a leading `country` key column, so the result is
/// keyed by (country, technology) and holds `countries.len() * costs.height()`
/// rows. With a single country the table keeps its shape and only the
/// `discount rate` column changes.
pub fn apply_country_specific_costs<S: AsRef<str>>(
    costs: &DataFrame,
    countries: &[S],
    resolver: &DiscountRateResolver<'_>,
) -> SecnetResult<DataFrame> {
    let height = costs.height();
    match countries {
        [] => Err(SecnetError::Validation(
            "cannot apply country-specific costs without countries".into(),
        )),
        [country] => {
            let mut single = costs.clone();
            let rate = resolver.rate(country.as_ref());
            single.with_column(Series::new(DISCOUNT_RATE_COLUMN, vec![rate; height]))?;
            Ok(single)
        }
        _ => {
            let technology_columns: Vec<Series> = costs
                .get_columns()
                .iter()
                .filter(|series| series.name() != COUNTRY_COLUMN)
                .cloned()
                .collect();

            let mut expanded: Option<DataFrame> = None;
            for country in countries {
                let country = country.as_ref();
                let rate = resolver.rate(country);

                let mut columns = Vec::with_capacity(technology_columns.len() + 1);
                columns.push(Series::new(COUNTRY_COLUMN, vec![country; height]));
                columns.extend(technology_columns.iter().cloned());
                let mut frame = DataFrame::new(columns)?;
                frame.with_column(Series::new(DISCOUNT_RATE_COLUMN, vec![rate; height]))?;

                expanded = Some(match expanded {
                    None => frame,
                    Some(acc) => acc.vstack(&frame)?,
                });
            }

            let expanded = expanded.unwrap_or_default();
            info!(
                "Expanded {} technologies to {} country-specific rows for {} countries",
                height,
                expanded.height(),
                countries.len()
            );
            Ok(expanded)
        }
    }
}
