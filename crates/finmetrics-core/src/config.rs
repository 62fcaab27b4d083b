use serde::{Deserialize, Serialize};

/// CAGR span policy. The legacy dashboard revisions disagreed: some divided
/// by a hard-coded 4-year span, later ones by the actual span of the
/// selected rows. Kept as a flag until product confirms one behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CagrSpan {
    /// n = last year − first year of the rows in scope
    Dynamic,
    /// n = a fixed number of years regardless of the rows in scope
    Fixed(u32),
}

/// What to do when the year filter matches no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFilterPolicy {
    /// Return the full unfiltered table and push a warning. Avoids blank
    /// charts, but callers see unfiltered data for that call.
    FallbackToUnfiltered,
    /// Raise `EmptyYearFilter` instead of degrading.
    Fail,
}

/// Which year supplies the "actual" side of budget-vs-actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetActualsYear {
    /// Maximum year of the whole dataset, independent of the active filter.
    /// Budget comparison always reflects the latest actuals.
    UnfilteredLatest,
    /// Maximum year of the filtered selection.
    FilteredLatest,
}

/// Engine policy flags. Defaults match the latest dashboard revision:
/// dynamic CAGR span, fallback on empty filter, unfiltered budget actuals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cagr_span: CagrSpan,
    pub empty_filter: EmptyFilterPolicy,
    pub budget_actuals_year: BudgetActualsYear,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cagr_span: CagrSpan::Dynamic,
            empty_filter: EmptyFilterPolicy::FallbackToUnfiltered,
            budget_actuals_year: BudgetActualsYear::UnfilteredLatest,
        }
    }
}
