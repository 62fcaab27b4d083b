mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::engine::{
    BudgetVsActualArgs, CagrArgs, CostStructureArgs, MetricsArgs, ProfitMarginArgs, RevenueArgs,
};

/// Financial dashboard metrics from the command line
#[derive(Parser)]
#[command(
    name = "fme",
    version,
    about = "Derived financial metrics for dashboard reporting",
    long_about = "Computes the derived series a financial reporting dashboard consumes: \
                  filtered revenue, profit margin, cost structure as % of revenue, \
                  per-unit CAGR, and budget-vs-actual comparison. Loads the six \
                  dashboard CSV tables or a JSON/YAML dataset."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full metrics bundle for a filter selection
    Metrics(MetricsArgs),
    /// Filtered revenue series, scoped to the selected unit(s)
    Revenue(RevenueArgs),
    /// Profit margin series (stored figures, filter-only)
    ProfitMargin(ProfitMarginArgs),
    /// COGS, salaries and rent as % of consolidated revenue
    CostStructure(CostStructureArgs),
    /// Compound annual growth rate per business unit
    Cagr(CagrArgs),
    /// Budget vs actual for the latest year
    BudgetVsActual(BudgetVsActualArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Metrics(args) => commands::engine::run_metrics(args),
        Commands::Revenue(args) => commands::engine::run_revenue(args),
        Commands::ProfitMargin(args) => commands::engine::run_profit_margin(args),
        Commands::CostStructure(args) => commands::engine::run_cost_structure(args),
        Commands::Cagr(args) => commands::engine::run_cagr(args),
        Commands::BudgetVsActual(args) => commands::engine::run_budget_vs_actual(args),
        Commands::Version => {
            println!("fme {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
