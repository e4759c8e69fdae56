//! Column access helpers over polars frames.
//!
//! Frames exchanged between builders carry no index; the first column holds
//! the row identifier (component name, node id, country code). Numeric columns
//! are cast to `Float64` and identifier columns to `Utf8` on read, so callers
//! can hand over frames straight from a CSV reader without normalizing dtypes.

use polars::prelude::*;

use crate::error::{SecnetError, SecnetResult};

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|column| *column == name)
}

/// Fetch a column, reporting a missing one as [`SecnetError::MissingColumn`].
pub fn column<'a>(df: &'a DataFrame, name: &str) -> SecnetResult<&'a Series> {
    if !has_column(df, name) {
        return Err(SecnetError::missing_column(name));
    }
    Ok(df.column(name)?)
}

/// The identifier column (first column) of a frame.
pub fn index_column(df: &DataFrame) -> SecnetResult<&Series> {
    df.get_columns()
        .first()
        .ok_or_else(|| SecnetError::Validation("table has no identifier column".into()))
}

/// Row identifiers as strings; null identifiers become empty strings.
pub fn index_labels(df: &DataFrame) -> SecnetResult<Vec<String>> {
    Ok(series_strings(index_column(df)?)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

pub fn series_strings(series: &Series) -> SecnetResult<Vec<Option<String>>> {
    let series = series.cast(&DataType::Utf8)?;
    Ok(series
        .utf8()?
        .into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}

pub fn series_floats(series: &Series) -> SecnetResult<Vec<Option<f64>>> {
    let series = series.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

pub fn string_column(df: &DataFrame, name: &str) -> SecnetResult<Vec<Option<String>>> {
    series_strings(column(df, name)?)
}

/// Numeric column with nulls read as `NaN`.
pub fn float_column(df: &DataFrame, name: &str) -> SecnetResult<Vec<f64>> {
    Ok(series_floats(column(df, name)?)?
        .into_iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}
