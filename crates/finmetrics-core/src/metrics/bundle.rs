//! Single-call orchestrator: one filter selection in, every chart series out.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{BudgetActualsYear, EngineConfig};
use crate::dataset::{
    pct_of, ExpenseRow, FilterSelection, FinancialDataset, RevenueRow, RevenueTable,
};
use crate::error::FinMetricsError;
use crate::filter::{rows_for_years, scope_rows, select_business_unit};
use crate::metrics::budget::{budget_lines, BudgetComparison};
use crate::metrics::cost_structure::{cost_structure_points, CostStructurePoint};
use crate::metrics::growth::{cagr_per_unit, UnitGrowth};
use crate::metrics::margin::{profit_margin_points, ProfitMarginPoint};
use crate::types::{with_metadata, ComputationOutput, Money, Pct, Year};
use crate::FinMetricsResult;

/// One business unit's share of a year's consolidated revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub unit: String,
    pub amount: Money,
    /// None when consolidated revenue is zero
    pub share_pct: Option<Pct>,
}

/// Latest-year revenue split across the selected units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueDistribution {
    pub year: Year,
    pub slices: Vec<DistributionSlice>,
}

/// One balance-sheet line with its share of the sheet total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceShare {
    pub category: String,
    pub value: Money,
    pub share_pct: Option<Pct>,
}

/// Point-in-time balance-sheet composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceComposition {
    pub total: Money,
    pub lines: Vec<BalanceShare>,
}

/// Everything the display layer needs for one filter selection.
///
/// Fixed shape: the presentation layer maps fields to widgets and does all
/// styling; nothing here knows about charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsBundle {
    /// Filtered revenue rows, trimmed to the selected unit(s)
    pub revenue: RevenueTable,
    pub profit_margin: Vec<ProfitMarginPoint>,
    /// Filtered expense rows, categories plus the precomputed total
    pub expenses: Vec<ExpenseRow>,
    pub cost_structure: Vec<CostStructurePoint>,
    /// Per-unit CAGR; empty (with a warning) when the range cannot support it
    pub growth: Vec<UnitGrowth>,
    pub budget_vs_actual: BudgetComparison,
    pub revenue_distribution: RevenueDistribution,
    pub balance_sheet: BalanceComposition,
}

fn distribution(rows: &[RevenueRow], selected_units: &[String]) -> Option<RevenueDistribution> {
    let latest = rows.iter().max_by_key(|r| r.year)?;
    let slices = selected_units
        .iter()
        .map(|unit| {
            let amount = latest.unit(unit).unwrap_or_default();
            DistributionSlice {
                unit: unit.clone(),
                amount,
                share_pct: pct_of(amount, latest.consolidated),
            }
        })
        .collect();
    Some(RevenueDistribution {
        year: latest.year,
        slices,
    })
}

fn balance_composition(dataset: &FinancialDataset) -> BalanceComposition {
    let total = dataset.balance_sheet.total();
    let lines = dataset
        .balance_sheet
        .lines
        .iter()
        .map(|l| BalanceShare {
            category: l.category.clone(),
            value: l.value,
            share_pct: pct_of(l.value, total),
        })
        .collect();
    BalanceComposition { total, lines }
}

/// Compute the full metrics bundle for one filter selection.
///
/// Structural failures (unknown unit, incomplete budget table) abort the
/// whole call; soft conditions (empty filter fallback, undefined CAGR or
/// percentages) degrade per-field and surface as envelope warnings.
pub fn compute_metrics(
    dataset: &FinancialDataset,
    selection: &FilterSelection,
    config: &EngineConfig,
) -> FinMetricsResult<ComputationOutput<MetricsBundle>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let selected_units = select_business_unit(&dataset.revenue, &selection.unit)?;

    let revenue_rows = rows_for_years(
        &dataset.revenue.rows,
        &selection.years,
        config.empty_filter,
        &mut warnings,
    )?;
    let cogs_rows = rows_for_years(
        &dataset.cogs.rows,
        &selection.years,
        config.empty_filter,
        &mut warnings,
    )?;
    let expense_rows = rows_for_years(
        &dataset.expenses.rows,
        &selection.years,
        config.empty_filter,
        &mut warnings,
    )?;

    let profit_margin = profit_margin_points(
        &dataset.profit.rows,
        &selection.years,
        config.empty_filter,
        &mut warnings,
    )?;

    let cost_structure =
        cost_structure_points(&revenue_rows, &cogs_rows, &expense_rows, &mut warnings);

    // A single-year selection cannot support a growth rate; that is a
    // degraded chart, not a failed bundle.
    let growth = match cagr_per_unit(
        &selected_units,
        &revenue_rows,
        config.cagr_span,
        &mut warnings,
    ) {
        Ok(growth) => growth,
        Err(FinMetricsError::InsufficientData(reason)) => {
            warnings.push(format!("CAGR omitted: {reason}"));
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let reference_year = match config.budget_actuals_year {
        BudgetActualsYear::UnfilteredLatest => dataset.latest_year()?,
        BudgetActualsYear::FilteredLatest => revenue_rows
            .iter()
            .map(|r| r.year)
            .max()
            .ok_or_else(|| {
                FinMetricsError::InsufficientData("revenue table has no rows".to_string())
            })?,
    };
    let budget_vs_actual = BudgetComparison {
        reference_year,
        lines: budget_lines(dataset, reference_year)?,
    };

    let revenue_distribution = distribution(&revenue_rows, &selected_units).ok_or_else(|| {
        FinMetricsError::InsufficientData("revenue table has no rows".to_string())
    })?;

    let bundle = MetricsBundle {
        revenue: RevenueTable {
            unit_names: selected_units.clone(),
            rows: scope_rows(&revenue_rows, &selected_units),
        },
        profit_margin,
        expenses: expense_rows,
        cost_structure,
        growth,
        budget_vs_actual,
        revenue_distribution,
        balance_sheet: balance_composition(dataset),
    };

    let assumptions = serde_json::json!({
        "selection": selection,
        "config": config,
    });
    Ok(with_metadata(
        "Filter-driven derived financial metrics bundle",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        bundle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CagrSpan, EmptyFilterPolicy};
    use crate::dataset::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn revenue_row(year: Year, b1: Decimal, b2: Decimal, b3: Decimal) -> RevenueRow {
        let mut units = BTreeMap::new();
        units.insert("Business 1".to_string(), b1);
        units.insert("Business 2".to_string(), b2);
        units.insert("Business 3".to_string(), b3);
        RevenueRow {
            year,
            units,
            consolidated: b1 + b2 + b3,
        }
    }

    fn expense_row(year: Year) -> ExpenseRow {
        ExpenseRow {
            year,
            salaries: dec!(120),
            rent: dec!(40),
            depreciation_amortization: dec!(30),
            interest: dec!(10),
            total: dec!(200),
        }
    }

    fn dataset() -> FinancialDataset {
        FinancialDataset {
            revenue: RevenueTable {
                unit_names: vec![
                    "Business 1".to_string(),
                    "Business 2".to_string(),
                    "Business 3".to_string(),
                ],
                rows: vec![
                    revenue_row(2020, dec!(100), dec!(150), dec!(200)),
                    revenue_row(2022, dec!(300), dec!(350), dec!(400)),
                    revenue_row(2024, dec!(500), dec!(550), dec!(600)),
                ],
            },
            cogs: CogsTable {
                rows: vec![
                    CogsRow {
                        year: 2020,
                        cogs: dec!(150),
                    },
                    CogsRow {
                        year: 2022,
                        cogs: dec!(300),
                    },
                    CogsRow {
                        year: 2024,
                        cogs: dec!(500),
                    },
                ],
            },
            profit: ProfitTable {
                rows: vec![
                    ProfitRow {
                        year: 2020,
                        profit: dec!(100),
                        profit_pct: dec!(22.2),
                    },
                    ProfitRow {
                        year: 2022,
                        profit: dec!(550),
                        profit_pct: dec!(52.4),
                    },
                    ProfitRow {
                        year: 2024,
                        profit: dec!(950),
                        profit_pct: dec!(57.6),
                    },
                ],
            },
            expenses: ExpensesTable {
                rows: vec![expense_row(2020), expense_row(2022), expense_row(2024)],
            },
            budget: BudgetTable {
                lines: vec![
                    BudgetLine {
                        category: "Revenue".to_string(),
                        value: dec!(1700),
                    },
                    BudgetLine {
                        category: "COGS".to_string(),
                        value: dec!(520),
                    },
                    BudgetLine {
                        category: "Expenses".to_string(),
                        value: dec!(210),
                    },
                    BudgetLine {
                        category: "Profit ($)".to_string(),
                        value: dec!(900),
                    },
                ],
            },
            balance_sheet: BalanceSheetTable {
                lines: vec![
                    BalanceLine {
                        category: "Cash".to_string(),
                        value: dec!(300),
                    },
                    BalanceLine {
                        category: "Receivables".to_string(),
                        value: dec!(200),
                    },
                    BalanceLine {
                        category: "Equity".to_string(),
                        value: dec!(500),
                    },
                ],
            },
        }
    }

    #[test]
    fn test_unfiltered_bundle_has_no_warnings() {
        let out =
            compute_metrics(&dataset(), &FilterSelection::all(), &EngineConfig::default())
                .unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.revenue.rows.len(), 3);
        assert_eq!(out.result.growth.len(), 3);
        assert_eq!(out.result.budget_vs_actual.reference_year, 2024);
    }

    #[test]
    fn test_budget_actuals_ignore_active_filter_by_default() {
        // Filter down to 2020 only; actuals must still come from 2024
        let filtered = compute_metrics(
            &dataset(),
            &FilterSelection::years(vec![2020]),
            &EngineConfig::default(),
        )
        .unwrap();
        let unfiltered =
            compute_metrics(&dataset(), &FilterSelection::all(), &EngineConfig::default())
                .unwrap();
        assert_eq!(filtered.result.budget_vs_actual.reference_year, 2024);
        for (a, b) in filtered
            .result
            .budget_vs_actual
            .lines
            .iter()
            .zip(unfiltered.result.budget_vs_actual.lines.iter())
        {
            assert_eq!(a.actual, b.actual);
        }
    }

    #[test]
    fn test_filtered_actuals_follow_the_filter_when_configured() {
        let config = EngineConfig {
            budget_actuals_year: BudgetActualsYear::FilteredLatest,
            ..EngineConfig::default()
        };
        let out = compute_metrics(&dataset(), &FilterSelection::years(vec![2020]), &config)
            .unwrap();
        assert_eq!(out.result.budget_vs_actual.reference_year, 2020);
        // Actual revenue is 2020's consolidated 450
        assert_eq!(out.result.budget_vs_actual.lines[0].actual, dec!(450));
    }

    #[test]
    fn test_single_year_selection_degrades_growth_to_empty() {
        let out = compute_metrics(
            &dataset(),
            &FilterSelection::years(vec![2022]),
            &EngineConfig::default(),
        )
        .unwrap();
        assert!(out.result.growth.is_empty());
        assert!(out.warnings.iter().any(|w| w.contains("CAGR omitted")));
        // The rest of the bundle still computed
        assert_eq!(out.result.profit_margin.len(), 1);
        assert_eq!(out.result.cost_structure.len(), 1);
    }

    #[test]
    fn test_named_unit_scopes_revenue_and_distribution() {
        let out = compute_metrics(
            &dataset(),
            &FilterSelection::for_unit(vec![], "Business 2"),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(out.result.revenue.unit_names, vec!["Business 2"]);
        for row in &out.result.revenue.rows {
            assert_eq!(row.units.len(), 1);
        }
        let dist = &out.result.revenue_distribution;
        assert_eq!(dist.year, 2024);
        assert_eq!(dist.slices.len(), 1);
        assert_eq!(dist.slices[0].amount, dec!(550));
        // 550 / 1650 = 33.33%
        assert_eq!(
            dist.slices[0].share_pct.unwrap().round_dp(2),
            dec!(33.33)
        );
    }

    #[test]
    fn test_unknown_unit_aborts_the_whole_bundle() {
        let err = compute_metrics(
            &dataset(),
            &FilterSelection::for_unit(vec![], "Business 9"),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FinMetricsError::UnknownUnit { .. }));
    }

    #[test]
    fn test_missing_budget_category_aborts_the_whole_bundle() {
        let mut ds = dataset();
        ds.budget.lines.retain(|l| l.category != "Profit ($)");
        let err = compute_metrics(&ds, &FilterSelection::all(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FinMetricsError::MissingBudgetCategory { .. }
        ));
    }

    #[test]
    fn test_empty_filter_fallback_warns_and_fills_every_series() {
        let out = compute_metrics(
            &dataset(),
            &FilterSelection::years(vec![1999]),
            &EngineConfig::default(),
        )
        .unwrap();
        // One warning per fallen-back table (revenue, cogs, expenses, profit)
        assert_eq!(out.warnings.len(), 4);
        assert_eq!(out.result.revenue.rows.len(), 3);
    }

    #[test]
    fn test_strict_empty_filter_fails() {
        let config = EngineConfig {
            empty_filter: EmptyFilterPolicy::Fail,
            ..EngineConfig::default()
        };
        let err = compute_metrics(&dataset(), &FilterSelection::years(vec![1999]), &config)
            .unwrap_err();
        assert!(matches!(err, FinMetricsError::EmptyYearFilter { .. }));
    }

    #[test]
    fn test_fixed_span_config_reaches_growth() {
        let config = EngineConfig {
            cagr_span: CagrSpan::Fixed(4),
            ..EngineConfig::default()
        };
        let fixed = compute_metrics(&dataset(), &FilterSelection::all(), &config).unwrap();
        let dynamic =
            compute_metrics(&dataset(), &FilterSelection::all(), &EngineConfig::default())
                .unwrap();
        // 2020..2024 spans 4 years either way, so the two policies agree here
        assert_eq!(
            fixed.result.growth[0].cagr_pct.round_dp(6),
            dynamic.result.growth[0].cagr_pct.round_dp(6)
        );
    }

    #[test]
    fn test_balance_sheet_shares_sum_to_one_hundred() {
        let out =
            compute_metrics(&dataset(), &FilterSelection::all(), &EngineConfig::default())
                .unwrap();
        let bs = &out.result.balance_sheet;
        assert_eq!(bs.total, dec!(1000));
        let sum: Decimal = bs.lines.iter().filter_map(|l| l.share_pct).sum();
        assert_eq!(sum, dec!(100));
    }
}
