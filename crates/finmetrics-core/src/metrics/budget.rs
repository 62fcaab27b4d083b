use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{BudgetActualsYear, EngineConfig};
use crate::dataset::FinancialDataset;
use crate::error::FinMetricsError;
use crate::filter::rows_for_years;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Year};
use crate::FinMetricsResult;

/// The four budget lines the comparison requires, with their category
/// labels as they appear in the budget table.
const REQUIRED_CATEGORIES: [&str; 4] = ["Revenue", "COGS", "Expenses", "Profit ($)"];

/// One budget line compared against the reference year's actual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLineComparison {
    pub category: String,
    pub budget: Money,
    pub actual: Money,
    /// actual - budget
    pub variance: Money,
    /// variance / budget, None when the budgeted amount is zero
    pub variance_pct: Option<Rate>,
    /// Revenue and profit are favorable above budget; costs below
    pub favorable: bool,
}

/// Budget-vs-actual comparison for one reference year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub reference_year: Year,
    pub lines: Vec<BudgetLineComparison>,
}

fn ratio_of(numerator: Decimal, denominator: Decimal) -> Option<Rate> {
    if denominator == Decimal::ZERO {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn line(category: &str, budget: Money, actual: Money, cost_side: bool) -> BudgetLineComparison {
    let variance = actual - budget;
    BudgetLineComparison {
        category: category.to_string(),
        budget,
        actual,
        variance,
        variance_pct: ratio_of(variance, budget),
        favorable: if cost_side {
            actual < budget
        } else {
            actual > budget
        },
    }
}

/// Compare planned values against the reference year's actuals.
///
/// All four categories must be present in the budget table before any
/// output is produced; a missing line is a typed error, never a silent
/// zero, since a zero-filled bar would misstate the comparison.
pub(crate) fn budget_lines(
    dataset: &FinancialDataset,
    reference_year: Year,
) -> FinMetricsResult<Vec<BudgetLineComparison>> {
    let mut planned = Vec::with_capacity(REQUIRED_CATEGORIES.len());
    for category in REQUIRED_CATEGORIES {
        let value = dataset.budget.value(category).ok_or_else(|| {
            FinMetricsError::MissingBudgetCategory {
                category: category.to_string(),
            }
        })?;
        planned.push(value);
    }

    let missing = |table: &str| {
        FinMetricsError::InsufficientData(format!("no {table} row for year {reference_year}"))
    };
    let revenue = dataset
        .revenue_row(reference_year)
        .ok_or_else(|| missing("revenue"))?;
    let cogs = dataset
        .cogs_row(reference_year)
        .ok_or_else(|| missing("cogs"))?;
    let expenses = dataset
        .expense_row(reference_year)
        .ok_or_else(|| missing("expenses"))?;
    let profit = dataset
        .profit_row(reference_year)
        .ok_or_else(|| missing("profit"))?;

    Ok(vec![
        line("Revenue", planned[0], revenue.consolidated, false),
        line("COGS", planned[1], cogs.cogs, true),
        line("Expenses", planned[2], expenses.total, true),
        line("Profit ($)", planned[3], profit.profit, false),
    ])
}

/// Pick the actuals year per policy: the dataset's latest year outright, or
/// the latest year surviving the active filter.
pub fn resolve_reference_year(
    dataset: &FinancialDataset,
    years: &[Year],
    config: &EngineConfig,
) -> FinMetricsResult<Year> {
    match config.budget_actuals_year {
        BudgetActualsYear::UnfilteredLatest => dataset.latest_year(),
        BudgetActualsYear::FilteredLatest => {
            let mut warnings = Vec::new();
            rows_for_years(
                &dataset.revenue.rows,
                years,
                config.empty_filter,
                &mut warnings,
            )?
            .iter()
            .map(|r| r.year)
            .max()
            .ok_or_else(|| {
                FinMetricsError::InsufficientData("revenue table has no rows".to_string())
            })
        }
    }
}

/// Budget-vs-actual for the given reference year, in the standard envelope.
///
/// The reference year is chosen by the caller (normally the dataset's
/// latest year regardless of any active filter; see `BudgetActualsYear`).
pub fn compute_budget_vs_actual(
    dataset: &FinancialDataset,
    reference_year: Year,
) -> FinMetricsResult<ComputationOutput<BudgetComparison>> {
    let start = Instant::now();

    let lines = budget_lines(dataset, reference_year)?;
    let comparison = BudgetComparison {
        reference_year,
        lines,
    };

    let assumptions = serde_json::json!({
        "reference_year": reference_year,
        "categories": REQUIRED_CATEGORIES,
    });
    Ok(with_metadata(
        "Budget vs actual for the reference year",
        &assumptions,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        comparison,
    ))
}
