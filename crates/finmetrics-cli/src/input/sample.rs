//! Built-in demo dataset, shaped like the six dashboard CSVs.
//!
//! Only ever used when `--sample` is passed explicitly. Load failures
//! surface as errors; they never fall back to these numbers.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finmetrics_core::dataset::{
    BalanceLine, BalanceSheetTable, BudgetLine, BudgetTable, CogsRow, CogsTable, ExpenseRow,
    ExpensesTable, FinancialDataset, ProfitRow, ProfitTable, RevenueRow, RevenueTable,
};

fn revenue_row(year: i32, b1: Decimal, b2: Decimal, b3: Decimal) -> RevenueRow {
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

/// Five fiscal years, three business units, one budget snapshot.
pub fn dataset() -> FinancialDataset {
    FinancialDataset {
        revenue: RevenueTable {
            unit_names: vec![
                "Business 1".to_string(),
                "Business 2".to_string(),
                "Business 3".to_string(),
            ],
            rows: vec![
                revenue_row(2020, dec!(100), dec!(150), dec!(200)),
                revenue_row(2021, dec!(200), dec!(250), dec!(300)),
                revenue_row(2022, dec!(300), dec!(350), dec!(400)),
                revenue_row(2023, dec!(400), dec!(450), dec!(500)),
                revenue_row(2024, dec!(500), dec!(550), dec!(600)),
            ],
        },
        cogs: CogsTable {
            rows: vec![
                CogsRow { year: 2020, cogs: dec!(150) },
                CogsRow { year: 2021, cogs: dec!(250) },
                CogsRow { year: 2022, cogs: dec!(300) },
                CogsRow { year: 2023, cogs: dec!(400) },
                CogsRow { year: 2024, cogs: dec!(500) },
            ],
        },
        profit: ProfitTable {
            rows: vec![
                ProfitRow { year: 2020, profit: dec!(100), profit_pct: dec!(22.2) },
                ProfitRow { year: 2021, profit: dec!(280), profit_pct: dec!(37.3) },
                ProfitRow { year: 2022, profit: dec!(550), profit_pct: dec!(52.4) },
                ProfitRow { year: 2023, profit: dec!(700), profit_pct: dec!(51.9) },
                ProfitRow { year: 2024, profit: dec!(850), profit_pct: dec!(51.5) },
            ],
        },
        expenses: ExpensesTable {
            rows: vec![
                ExpenseRow {
                    year: 2020,
                    salaries: dec!(120),
                    rent: dec!(40),
                    depreciation_amortization: dec!(30),
                    interest: dec!(10),
                    total: dec!(200),
                },
                ExpenseRow {
                    year: 2021,
                    salaries: dec!(130),
                    rent: dec!(42),
                    depreciation_amortization: dec!(33),
                    interest: dec!(15),
                    total: dec!(220),
                },
                ExpenseRow {
                    year: 2022,
                    salaries: dec!(145),
                    rent: dec!(45),
                    depreciation_amortization: dec!(36),
                    interest: dec!(24),
                    total: dec!(250),
                },
                ExpenseRow {
                    year: 2023,
                    salaries: dec!(160),
                    rent: dec!(48),
                    depreciation_amortization: dec!(40),
                    interest: dec!(32),
                    total: dec!(280),
                },
                ExpenseRow {
                    year: 2024,
                    salaries: dec!(180),
                    rent: dec!(52),
                    depreciation_amortization: dec!(44),
                    interest: dec!(24),
                    total: dec!(300),
                },
            ],
        },
        budget: BudgetTable {
            lines: vec![
                BudgetLine { category: "Revenue".to_string(), value: dec!(1700) },
                BudgetLine { category: "COGS".to_string(), value: dec!(520) },
                BudgetLine { category: "Expenses".to_string(), value: dec!(310) },
                BudgetLine { category: "Profit ($)".to_string(), value: dec!(900) },
            ],
        },
        balance_sheet: BalanceSheetTable {
            lines: vec![
                BalanceLine { category: "Cash".to_string(), value: dec!(320) },
                BalanceLine { category: "Receivables".to_string(), value: dec!(210) },
                BalanceLine { category: "Inventory".to_string(), value: dec!(150) },
                BalanceLine { category: "PP&E".to_string(), value: dec!(480) },
                BalanceLine { category: "Payables".to_string(), value: dec!(190) },
                BalanceLine { category: "Long-term Debt".to_string(), value: dec!(350) },
                BalanceLine { category: "Equity".to_string(), value: dec!(620) },
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finmetrics_core::dataset::FilterSelection;
    use finmetrics_core::metrics::bundle::compute_metrics;
    use finmetrics_core::EngineConfig;

    #[test]
    fn test_sample_dataset_computes_cleanly_unfiltered() {
        let ds = dataset();
        let out = compute_metrics(&ds, &FilterSelection::all(), &EngineConfig::default())
            .unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.growth.len(), 3);
        assert_eq!(out.result.budget_vs_actual.reference_year, 2024);
    }

    #[test]
    fn test_sample_consolidated_matches_unit_sum() {
        for row in dataset().revenue.rows {
            let sum: Decimal = row.units.values().copied().sum();
            assert_eq!(row.consolidated, sum);
        }
    }
}
