use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinMetricsError;
use crate::types::{Money, Pct, Year};
use crate::FinMetricsResult;

// ---------------------------------------------------------------------------
// Tables — immutable snapshots supplied by the loader
// ---------------------------------------------------------------------------

/// One fiscal year of revenue, broken down by business unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueRow {
    pub year: Year,
    /// Per-unit revenue, keyed by unit name
    pub units: BTreeMap<String, Money>,
    /// Consolidated total as supplied by the source; trusted, not re-derived
    pub consolidated: Money,
}

impl RevenueRow {
    /// Revenue for a single named unit, if present.
    pub fn unit(&self, name: &str) -> Option<Money> {
        self.units.get(name).copied()
    }
}

/// Revenue by business unit per year.
///
/// `unit_names` fixes the display/axis ordering for every per-unit output;
/// it is supplied by the caller, not inferred from row insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueTable {
    pub unit_names: Vec<String>,
    pub rows: Vec<RevenueRow>,
}

/// Cost of goods sold for one year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogsRow {
    pub year: Year,
    pub cogs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogsTable {
    pub rows: Vec<CogsRow>,
}

/// Profit for one year. The percentage comes from the source data and is
/// never recomputed from other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitRow {
    pub year: Year,
    pub profit: Money,
    pub profit_pct: Pct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitTable {
    pub rows: Vec<ProfitRow>,
}

/// Operating expenses for one year, with the source's precomputed total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub year: Year,
    pub salaries: Money,
    pub rent: Money,
    pub depreciation_amortization: Money,
    pub interest: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpensesTable {
    pub rows: Vec<ExpenseRow>,
}

/// One planned amount per category. Single snapshot, not time-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: String,
    pub value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetTable {
    pub lines: Vec<BudgetLine>,
}

impl BudgetTable {
    /// Planned value for a category name, if the line exists.
    pub fn value(&self, category: &str) -> Option<Money> {
        self.lines
            .iter()
            .find(|l| l.category == category)
            .map(|l| l.value)
    }
}

/// One balance-sheet line item. Point-in-time snapshot, not a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceLine {
    pub category: String,
    pub value: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetTable {
    pub lines: Vec<BalanceLine>,
}

impl BalanceSheetTable {
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.value).sum()
    }
}

// ---------------------------------------------------------------------------
// Dataset — the six tables handed to the engine as one immutable snapshot
// ---------------------------------------------------------------------------

/// The full financial dataset for one session. Loaded once, never mutated;
/// the engine receives it by reference and holds no copy afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialDataset {
    pub revenue: RevenueTable,
    pub cogs: CogsTable,
    pub profit: ProfitTable,
    pub expenses: ExpensesTable,
    pub budget: BudgetTable,
    pub balance_sheet: BalanceSheetTable,
}

impl FinancialDataset {
    /// Maximum year present in the revenue table, ignoring any active filter.
    pub fn latest_year(&self) -> FinMetricsResult<Year> {
        self.revenue
            .rows
            .iter()
            .map(|r| r.year)
            .max()
            .ok_or_else(|| {
                FinMetricsError::InsufficientData("revenue table has no rows".to_string())
            })
    }

    pub fn revenue_row(&self, year: Year) -> Option<&RevenueRow> {
        self.revenue.rows.iter().find(|r| r.year == year)
    }

    pub fn cogs_row(&self, year: Year) -> Option<&CogsRow> {
        self.cogs.rows.iter().find(|r| r.year == year)
    }

    pub fn profit_row(&self, year: Year) -> Option<&ProfitRow> {
        self.profit.rows.iter().find(|r| r.year == year)
    }

    pub fn expense_row(&self, year: Year) -> Option<&ExpenseRow> {
        self.expenses.rows.iter().find(|r| r.year == year)
    }
}

// ---------------------------------------------------------------------------
// Filter selection — one per user interaction, no identity beyond the call
// ---------------------------------------------------------------------------

/// Business-unit scope: everything, or exactly one named unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSelection {
    All,
    Named(String),
}

impl Default for UnitSelection {
    fn default() -> Self {
        UnitSelection::All
    }
}

/// The user-chosen year set and business-unit scope. An empty year list
/// means "no year filter" (every known year), matching the dashboard's
/// select-all default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub years: Vec<Year>,
    pub unit: UnitSelection,
}

impl FilterSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn years(years: Vec<Year>) -> Self {
        Self {
            years,
            unit: UnitSelection::All,
        }
    }

    pub fn for_unit(years: Vec<Year>, unit: &str) -> Self {
        Self {
            years,
            unit: UnitSelection::Named(unit.to_string()),
        }
    }
}

/// Safe percentage on the 0–100 scale: None when the denominator is zero,
/// so a zero-revenue year reads as "no data" rather than an error.
pub(crate) fn pct_of(numerator: Decimal, denominator: Decimal) -> Option<Pct> {
    if denominator == Decimal::ZERO {
        None
    } else {
        Some(numerator / denominator * Decimal::ONE_HUNDRED)
    }
}
