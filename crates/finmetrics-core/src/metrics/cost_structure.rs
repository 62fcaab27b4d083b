use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::EmptyFilterPolicy;
use crate::dataset::{pct_of, CogsRow, ExpenseRow, FinancialDataset, RevenueRow};
use crate::filter::rows_for_years;
use crate::types::{with_metadata, ComputationOutput, Pct, Year};
use crate::FinMetricsResult;

/// Cost components as a percentage of consolidated revenue for one year.
/// Fields are None when that year's consolidated revenue is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostStructurePoint {
    pub year: Year,
    pub cogs_pct: Option<Pct>,
    pub salaries_pct: Option<Pct>,
    pub rent_pct: Option<Pct>,
}

/// Inner-join the three tables on year and express COGS, salaries and rent
/// as percentages of consolidated revenue. Years missing from any table are
/// dropped; a zero-revenue year yields null percentages, never an error.
pub(crate) fn cost_structure_points(
    revenue: &[RevenueRow],
    cogs: &[CogsRow],
    expenses: &[ExpenseRow],
    warnings: &mut Vec<String>,
) -> Vec<CostStructurePoint> {
    let mut points = Vec::new();

    for rev in revenue {
        let Some(cogs_row) = cogs.iter().find(|c| c.year == rev.year) else {
            continue;
        };
        let Some(exp_row) = expenses.iter().find(|e| e.year == rev.year) else {
            continue;
        };

        if rev.consolidated.is_zero() {
            warnings.push(format!(
                "Consolidated revenue is zero for {}; cost-structure percentages are undefined",
                rev.year
            ));
        }

        points.push(CostStructurePoint {
            year: rev.year,
            cogs_pct: pct_of(cogs_row.cogs, rev.consolidated),
            salaries_pct: pct_of(exp_row.salaries, rev.consolidated),
            rent_pct: pct_of(exp_row.rent, rev.consolidated),
        });
    }

    points
}

/// Compute the cost-structure series for charting, wrapped in the standard
/// output envelope.
pub fn compute_cost_structure(
    revenue: &[RevenueRow],
    cogs: &[CogsRow],
    expenses: &[ExpenseRow],
) -> FinMetricsResult<ComputationOutput<Vec<CostStructurePoint>>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let points = cost_structure_points(revenue, cogs, expenses, &mut warnings);

    let assumptions = serde_json::json!({
        "join": "inner join on year across revenue, cogs, expenses",
        "denominator": "consolidated revenue",
    });
    Ok(with_metadata(
        "Cost components as % of consolidated revenue",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        points,
    ))
}

/// Dataset-level variant honoring an active year filter: all three tables
/// are filtered before the join, and any fallback warnings come first in
/// the envelope.
pub fn compute_cost_structure_filtered(
    dataset: &FinancialDataset,
    years: &[Year],
    policy: EmptyFilterPolicy,
) -> FinMetricsResult<ComputationOutput<Vec<CostStructurePoint>>> {
    let mut filter_warnings = Vec::new();

    let revenue = rows_for_years(&dataset.revenue.rows, years, policy, &mut filter_warnings)?;
    let cogs = rows_for_years(&dataset.cogs.rows, years, policy, &mut filter_warnings)?;
    let expenses = rows_for_years(&dataset.expenses.rows, years, policy, &mut filter_warnings)?;

    let mut output = compute_cost_structure(&revenue, &cogs, &expenses)?;
    output.warnings.splice(0..0, filter_warnings);
    Ok(output)
}
