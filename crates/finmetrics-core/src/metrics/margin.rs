use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::EmptyFilterPolicy;
use crate::dataset::ProfitRow;
use crate::filter::rows_for_years;
use crate::types::{with_metadata, ComputationOutput, Money, Pct, Year};
use crate::FinMetricsResult;

/// Profit amount and margin for one year, exactly as stored in the source
/// table. The percentage is pass-through, never re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitMarginPoint {
    pub year: Year,
    pub profit: Money,
    pub profit_pct: Pct,
}

pub(crate) fn profit_margin_points(
    profit: &[ProfitRow],
    years: &[Year],
    policy: EmptyFilterPolicy,
    warnings: &mut Vec<String>,
) -> FinMetricsResult<Vec<ProfitMarginPoint>> {
    let rows = rows_for_years(profit, years, policy, warnings)?;
    Ok(rows
        .into_iter()
        .map(|r| ProfitMarginPoint {
            year: r.year,
            profit: r.profit,
            profit_pct: r.profit_pct,
        })
        .collect())
}

/// Profit margin series for the selected years, in the standard envelope.
pub fn compute_profit_margin(
    profit: &[ProfitRow],
    years: &[Year],
    policy: EmptyFilterPolicy,
) -> FinMetricsResult<ComputationOutput<Vec<ProfitMarginPoint>>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let points = profit_margin_points(profit, years, policy, &mut warnings)?;

    let assumptions = serde_json::json!({
        "years": years,
        "empty_filter": policy,
        "percentage": "pass-through from source data",
    });
    Ok(with_metadata(
        "Profit margin (filtered pass-through)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        points,
    ))
}
