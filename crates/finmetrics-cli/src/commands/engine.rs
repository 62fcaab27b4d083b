use clap::Args;
use serde_json::Value;

use finmetrics_core::config::{BudgetActualsYear, CagrSpan, EmptyFilterPolicy};
use finmetrics_core::dataset::{FilterSelection, FinancialDataset, UnitSelection};
use finmetrics_core::filter::compute_revenue_series;
use finmetrics_core::metrics::{budget, cost_structure, growth, margin};
use finmetrics_core::EngineConfig;

use crate::input;

type CliResult = Result<Value, Box<dyn std::error::Error>>;

/// Where the six tables come from: a CSV directory, a JSON/YAML dataset
/// file, piped stdin, or the built-in demo dataset (explicit opt-in only).
#[derive(Args)]
pub struct DatasetArgs {
    /// Directory containing the six dashboard CSV files
    #[arg(long)]
    pub data: Option<String>,

    /// Path to a JSON or YAML dataset file
    #[arg(long)]
    pub input: Option<String>,

    /// Use the built-in demo dataset
    #[arg(long)]
    pub sample: bool,
}

impl DatasetArgs {
    pub fn load(&self) -> Result<FinancialDataset, Box<dyn std::error::Error>> {
        if self.sample {
            return Ok(input::sample::dataset());
        }
        if let Some(ref dir) = self.data {
            return input::csv_load::load_dataset(dir);
        }
        if let Some(ref path) = self.input {
            return input::file::read_dataset(path);
        }
        if let Some(value) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(value)?);
        }
        Err("--data <dir>, --input <file>, --sample, or a piped dataset required".into())
    }
}

/// Filter selection and engine policy flags shared by every subcommand.
#[derive(Args)]
pub struct FilterArgs {
    /// Comma-separated fiscal years, e.g. 2020,2022 (default: every year)
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Business unit name (default: all units)
    #[arg(long)]
    pub unit: Option<String>,

    /// Divide CAGR by this fixed span instead of the actual year range
    #[arg(long, value_name = "YEARS")]
    pub fixed_span: Option<u32>,

    /// Fail when the year filter matches nothing instead of falling back
    #[arg(long)]
    pub strict_filter: bool,

    /// Take budget actuals from the filtered range, not the dataset's latest year
    #[arg(long)]
    pub filtered_actuals: bool,
}

impl FilterArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            years: self.years.clone(),
            unit: match self.unit {
                Some(ref u) => UnitSelection::Named(u.clone()),
                None => UnitSelection::All,
            },
        }
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            cagr_span: match self.fixed_span {
                Some(n) => CagrSpan::Fixed(n),
                None => CagrSpan::Dynamic,
            },
            empty_filter: if self.strict_filter {
                EmptyFilterPolicy::Fail
            } else {
                EmptyFilterPolicy::FallbackToUnfiltered
            },
            budget_actuals_year: if self.filtered_actuals {
                BudgetActualsYear::FilteredLatest
            } else {
                BudgetActualsYear::UnfilteredLatest
            },
        }
    }
}

#[derive(Args)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct RevenueArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct ProfitMarginArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct CostStructureArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct CagrArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct BudgetVsActualArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run_metrics(args: MetricsArgs) -> CliResult {
    let dataset = args.dataset.load()?;
    let result = finmetrics_core::metrics::bundle::compute_metrics(
        &dataset,
        &args.filter.selection(),
        &args.filter.config(),
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_revenue(args: RevenueArgs) -> CliResult {
    let dataset = args.dataset.load()?;
    let config = args.filter.config();
    let result =
        compute_revenue_series(&dataset.revenue, &args.filter.selection(), config.empty_filter)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_profit_margin(args: ProfitMarginArgs) -> CliResult {
    let dataset = args.dataset.load()?;
    let config = args.filter.config();
    let result = margin::compute_profit_margin(
        &dataset.profit.rows,
        &args.filter.years,
        config.empty_filter,
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cost_structure(args: CostStructureArgs) -> CliResult {
    let dataset = args.dataset.load()?;
    let config = args.filter.config();
    let result = cost_structure::compute_cost_structure_filtered(
        &dataset,
        &args.filter.years,
        config.empty_filter,
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cagr(args: CagrArgs) -> CliResult {
    let dataset = args.dataset.load()?;
    let config = args.filter.config();
    let result = growth::compute_cagr_filtered(
        &dataset.revenue,
        &args.filter.selection(),
        config.cagr_span,
        config.empty_filter,
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_budget_vs_actual(args: BudgetVsActualArgs) -> CliResult {
    let dataset = args.dataset.load()?;
    let config = args.filter.config();
    let reference_year = budget::resolve_reference_year(&dataset, &args.filter.years, &config)?;
    let result = budget::compute_budget_vs_actual(&dataset, reference_year)?;
    Ok(serde_json::to_value(result)?)
}
