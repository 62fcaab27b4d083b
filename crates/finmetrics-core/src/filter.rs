//! Year and business-unit filtering shared by every metric computation.

use std::time::Instant;

use crate::config::EmptyFilterPolicy;
use crate::dataset::{
    CogsRow, ExpenseRow, FilterSelection, ProfitRow, RevenueRow, RevenueTable, UnitSelection,
};
use crate::error::FinMetricsError;
use crate::types::{with_metadata, ComputationOutput, Year};
use crate::FinMetricsResult;

/// Any row type keyed by fiscal year.
pub trait YearKeyed {
    fn year(&self) -> Year;
}

impl YearKeyed for RevenueRow {
    fn year(&self) -> Year {
        self.year
    }
}

impl YearKeyed for CogsRow {
    fn year(&self) -> Year {
        self.year
    }
}

impl YearKeyed for ProfitRow {
    fn year(&self) -> Year {
        self.year
    }
}

impl YearKeyed for ExpenseRow {
    fn year(&self) -> Year {
        self.year
    }
}

/// Subset of `rows` whose year is in `years`, preserving input order.
///
/// An empty `years` slice means "no filter" and returns every row. A filter
/// that matches nothing follows `policy`: fall back to the full table with
/// a warning, or raise `EmptyYearFilter`.
pub fn rows_for_years<R: YearKeyed + Clone>(
    rows: &[R],
    years: &[Year],
    policy: EmptyFilterPolicy,
    warnings: &mut Vec<String>,
) -> FinMetricsResult<Vec<R>> {
    if years.is_empty() {
        return Ok(rows.to_vec());
    }

    let subset: Vec<R> = rows
        .iter()
        .filter(|r| years.contains(&r.year()))
        .cloned()
        .collect();

    if subset.is_empty() && !rows.is_empty() {
        return match policy {
            EmptyFilterPolicy::FallbackToUnfiltered => {
                warnings.push(format!(
                    "Year filter {:?} matched no rows; showing the unfiltered table",
                    years
                ));
                Ok(rows.to_vec())
            }
            EmptyFilterPolicy::Fail => Err(FinMetricsError::EmptyYearFilter {
                requested: years.to_vec(),
            }),
        };
    }

    Ok(subset)
}

/// Resolve a unit selection against the configured unit names.
///
/// Returns the selected names in the table's stable ordering. A name absent
/// from the table is a typed `UnknownUnit` error carrying the known names,
/// never a partial or defaulted result.
pub fn select_business_unit(
    table: &RevenueTable,
    selection: &UnitSelection,
) -> FinMetricsResult<Vec<String>> {
    match selection {
        UnitSelection::All => Ok(table.unit_names.clone()),
        UnitSelection::Named(unit) => {
            if table.unit_names.iter().any(|n| n == unit) {
                Ok(vec![unit.clone()])
            } else {
                Err(FinMetricsError::UnknownUnit {
                    unit: unit.clone(),
                    available: table.unit_names.clone(),
                })
            }
        }
    }
}

/// Trim each row's unit columns to the selected names, keeping the
/// consolidated total untouched.
pub(crate) fn scope_rows(rows: &[RevenueRow], selected_units: &[String]) -> Vec<RevenueRow> {
    rows.iter()
        .map(|r| RevenueRow {
            year: r.year,
            units: r
                .units
                .iter()
                .filter(|(name, _)| selected_units.iter().any(|u| u == *name))
                .map(|(name, v)| (name.clone(), *v))
                .collect(),
            consolidated: r.consolidated,
        })
        .collect()
}

/// Filtered revenue series scoped to the selected unit(s), in the standard
/// envelope. This is the plain table feed behind the revenue trend chart.
pub fn compute_revenue_series(
    table: &RevenueTable,
    selection: &FilterSelection,
    policy: EmptyFilterPolicy,
) -> FinMetricsResult<ComputationOutput<RevenueTable>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let selected_units = select_business_unit(table, &selection.unit)?;
    let rows = rows_for_years(&table.rows, &selection.years, policy, &mut warnings)?;

    let series = RevenueTable {
        unit_names: selected_units.clone(),
        rows: scope_rows(&rows, &selected_units),
    };

    let assumptions = serde_json::json!({
        "selection": selection,
        "empty_filter": policy,
    });
    Ok(with_metadata(
        "Filtered revenue series by business unit",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        series,
    ))
}
