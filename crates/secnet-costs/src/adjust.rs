//! Rescaling of network capital costs to country-specific discount rates.
//!
//! Capital costs in the network were annualized with the global rate. For a
//! component located in a country with its own rate, the cost is multiplied by
//! `annuity(L, r_country) / annuity(L, r_global)` with the fixed lifetime
//! [`DEFAULT_ASSET_LIFETIME`](crate::annuity::DEFAULT_ASSET_LIFETIME).

use std::collections::BTreeMap;
use std::fmt;

use polars::prelude::*;
use secnet_core::frame::{column, has_column, index_labels, series_floats};
use secnet_core::{LocationStrategy, SecnetResult};
use tracing::{debug, info};

use crate::annuity::{capital_cost_factor, rates_differ};
use crate::config::CostsConfig;

pub const CAPITAL_COST_COLUMN: &str = "capital_cost";

/// Number of adjusted rows traced individually per component kind.
const AUDIT_SAMPLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Generators,
    StorageUnits,
    Stores,
    Links,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Generators,
        ComponentKind::StorageUnits,
        ComponentKind::Stores,
        ComponentKind::Links,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Generators => "generators",
            ComponentKind::StorageUnits => "storage_units",
            ComponentKind::Stores => "stores",
            ComponentKind::Links => "links",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component tables of a network. Absent components are empty frames.
#[derive(Debug, Clone, Default)]
pub struct NetworkComponents {
    pub generators: DataFrame,
    pub storage_units: DataFrame,
    pub stores: DataFrame,
    pub links: DataFrame,
}

impl NetworkComponents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, kind: ComponentKind, table: DataFrame) -> Self {
        *self.component_mut(kind) = table;
        self
    }

    pub fn component(&self, kind: ComponentKind) -> &DataFrame {
        match kind {
            ComponentKind::Generators => &self.generators,
            ComponentKind::StorageUnits => &self.storage_units,
            ComponentKind::Stores => &self.stores,
            ComponentKind::Links => &self.links,
        }
    }

    fn component_mut(&mut self, kind: ComponentKind) -> &mut DataFrame {
        match kind {
            ComponentKind::Generators => &mut self.generators,
            ComponentKind::StorageUnits => &mut self.storage_units,
            ComponentKind::Stores => &mut self.stores,
            ComponentKind::Links => &mut self.links,
        }
    }

    /// Rescale capital costs in place. Convenience over [`adjust_capital_costs`]
    /// for callers that own the tables.
    pub fn apply_country_discount_rates(
        &mut self,
        config: &CostsConfig,
    ) -> SecnetResult<AdjustmentReport> {
        let adjusted = adjust_capital_costs(
            self,
            &config.country_specific_discountrate,
            config.social_discountrate,
        )?;
        *self = adjusted.components;
        Ok(adjusted.report)
    }
}

/// One rescaled row, kept for the audit trace.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedRow {
    pub id: String,
    pub country: String,
    pub rate: f64,
    pub factor: f64,
}

/// Adjusted row counts per component kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustmentReport {
    per_kind: BTreeMap<ComponentKind, usize>,
}

impl AdjustmentReport {
    pub fn adjusted(&self, kind: ComponentKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.per_kind.values().sum()
    }

    fn record(&mut self, kind: ComponentKind, count: usize) {
        *self.per_kind.entry(kind).or_default() += count;
    }
}

#[derive(Debug, Clone)]
pub struct CapitalCostAdjustment {
    pub components: NetworkComponents,
    pub report: AdjustmentReport,
}

/// Rescale the capital costs of every component kind to country-specific
/// discount rates, returning new tables and the adjustment counts.
///
/// Rows whose country has no override, or whose override lies within
/// [`RATE_TOLERANCE`](crate::annuity::RATE_TOLERANCE) of `global_rate`, are
/// left untouched. Empty tables and tables without a `capital_cost` column
/// are skipped.
pub fn adjust_capital_costs(
    components: &NetworkComponents,
    country_rates: &BTreeMap<String, f64>,
    global_rate: f64,
) -> SecnetResult<CapitalCostAdjustment> {
    info!("Applying country-specific discount rates to network components...");
    let mut adjusted = components.clone();
    let mut report = AdjustmentReport::default();

    if country_rates.is_empty() {
        info!("No country-specific discount rates found, using global rate.");
        return Ok(CapitalCostAdjustment {
            components: adjusted,
            report,
        });
    }

    for kind in ComponentKind::ALL {
        let (table, rows) = adjust_component(
            components.component(kind),
            kind,
            country_rates,
            global_rate,
        )?;
        report.record(kind, rows.len());
        if let Some(table) = table {
            *adjusted.component_mut(kind) = table;
        }
    }

    if report.total() > 0 {
        info!(
            "Applied country-specific discount rates to {} components total",
            report.total()
        );
    } else {
        info!("No components required discount rate adjustments");
    }

    Ok(CapitalCostAdjustment {
        components: adjusted,
        report,
    })
}

/// Returns the rescaled table (`None` when nothing changed) and the rows that
/// were rescaled.
fn adjust_component(
    table: &DataFrame,
    kind: ComponentKind,
    country_rates: &BTreeMap<String, f64>,
    global_rate: f64,
) -> SecnetResult<(Option<DataFrame>, Vec<AdjustedRow>)> {
    if table.height() == 0 || !has_column(table, CAPITAL_COST_COLUMN) {
        return Ok((None, Vec::new()));
    }

    let strategy = LocationStrategy::for_components(table);
    let countries = strategy.countries(table)?;
    let ids = index_labels(table)?;
    let mut costs = series_floats(column(table, CAPITAL_COST_COLUMN)?)?;

    let mut changed = Vec::new();
    for (row, country) in countries.into_iter().enumerate() {
        let Some(country) = country else { continue };
        let Some(&rate) = country_rates.get(&country) else {
            continue;
        };
        if !rates_differ(rate, global_rate) {
            continue;
        }
        let factor = capital_cost_factor(rate, global_rate);
        if let Some(cost) = costs[row].as_mut() {
            *cost *= factor;
        }
        changed.push(AdjustedRow {
            id: ids[row].clone(),
            country,
            rate,
            factor,
        });
    }

    if changed.is_empty() {
        return Ok((None, changed));
    }

    info!(
        "Applied country-specific rates to {} {} (location from {})",
        changed.len(),
        kind,
        strategy
    );
    for row in changed.iter().take(AUDIT_SAMPLE) {
        debug!(
            "  {} ({}): {:.1}% (factor: {:.3})",
            row.id,
            row.country,
            row.rate * 100.0,
            row.factor
        );
    }
    if changed.len() > AUDIT_SAMPLE {
        debug!("  ... and {} more", changed.len() - AUDIT_SAMPLE);
    }

    let mut out = table.clone();
    out.with_column(Series::new(CAPITAL_COST_COLUMN, costs))?;
    Ok((Some(out), changed))
}
