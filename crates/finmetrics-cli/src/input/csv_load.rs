//! The table loader: six fixed-name CSV files into one immutable dataset.
//!
//! Structural validation happens here, not in the engine: a missing file,
//! missing column, or unparsable number is reported with file and column
//! context before any computation runs. There is no silent fallback to
//! fabricated data; `--sample` is the only way to get demo numbers.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use finmetrics_core::dataset::{
    BalanceLine, BalanceSheetTable, BudgetLine, BudgetTable, CogsRow, CogsTable, ExpenseRow,
    ExpensesTable, FinancialDataset, ProfitRow, ProfitTable, RevenueRow, RevenueTable,
};

type LoadResult<T> = Result<T, Box<dyn std::error::Error>>;

const REVENUE_FILE: &str = "revenue_df.csv";
const COGS_FILE: &str = "cogs_df.csv";
const PROFIT_FILE: &str = "profit_df.csv";
const EXPENSES_FILE: &str = "expenses_df.csv";
const BUDGET_FILE: &str = "budget_df.csv";
const BALANCE_SHEET_FILE: &str = "balance_sheet_df.csv";

/// Load all six tables from a directory.
pub fn load_dataset(dir: &str) -> LoadResult<FinancialDataset> {
    let dir = Path::new(dir);
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()).into());
    }

    Ok(FinancialDataset {
        revenue: load_revenue(&dir.join(REVENUE_FILE))?,
        cogs: load_cogs(&dir.join(COGS_FILE))?,
        profit: load_profit(&dir.join(PROFIT_FILE))?,
        expenses: load_expenses(&dir.join(EXPENSES_FILE))?,
        budget: load_budget(&dir.join(BUDGET_FILE))?,
        balance_sheet: load_balance_sheet(&dir.join(BALANCE_SHEET_FILE))?,
    })
}

fn open(path: &Path) -> LoadResult<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e).into())
}

fn parse_money(raw: &str, path: &Path, column: &str) -> LoadResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| format!("{}: bad number in column '{}': {}", path.display(), column, e).into())
}

/// Revenue has a dynamic set of business-unit columns: everything between
/// `Year` and `Consolidated` is a unit, in header order.
fn load_revenue(path: &Path) -> LoadResult<RevenueTable> {
    let mut reader = open(path)?;
    let headers = reader.headers()?.clone();

    let year_idx = column_index(&headers, "Year", path)?;
    let consolidated_idx = column_index(&headers, "Consolidated", path)?;

    let unit_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != year_idx && *i != consolidated_idx)
        .map(|(_, h)| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let year = record[year_idx]
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("{}: bad year: {}", path.display(), e))?;

        let mut units = BTreeMap::new();
        for (i, header) in headers.iter().enumerate() {
            if i == year_idx || i == consolidated_idx {
                continue;
            }
            units.insert(header.to_string(), parse_money(&record[i], path, header)?);
        }

        rows.push(RevenueRow {
            year,
            units,
            consolidated: parse_money(&record[consolidated_idx], path, "Consolidated")?,
        });
    }

    Ok(RevenueTable { unit_names, rows })
}

fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> LoadResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| format!("{}: missing required column '{}'", path.display(), name).into())
}

#[derive(Deserialize)]
struct CogsRecord {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "COGS")]
    cogs: Decimal,
}

fn load_cogs(path: &Path) -> LoadResult<CogsTable> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<CogsRecord>() {
        let r = record.map_err(|e| format!("{}: {}", path.display(), e))?;
        rows.push(CogsRow {
            year: r.year,
            cogs: r.cogs,
        });
    }
    Ok(CogsTable { rows })
}

#[derive(Deserialize)]
struct ProfitRecord {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Profit $")]
    profit: Decimal,
    #[serde(rename = "Profit %")]
    profit_pct: Decimal,
}

fn load_profit(path: &Path) -> LoadResult<ProfitTable> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<ProfitRecord>() {
        let r = record.map_err(|e| format!("{}: {}", path.display(), e))?;
        rows.push(ProfitRow {
            year: r.year,
            profit: r.profit,
            profit_pct: r.profit_pct,
        });
    }
    Ok(ProfitTable { rows })
}

#[derive(Deserialize)]
struct ExpenseRecord {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Salaries")]
    salaries: Decimal,
    #[serde(rename = "Rent")]
    rent: Decimal,
    #[serde(rename = "D&A")]
    depreciation_amortization: Decimal,
    #[serde(rename = "Interest")]
    interest: Decimal,
    #[serde(rename = "Total")]
    total: Decimal,
}

fn load_expenses(path: &Path) -> LoadResult<ExpensesTable> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<ExpenseRecord>() {
        let r = record.map_err(|e| format!("{}: {}", path.display(), e))?;
        rows.push(ExpenseRow {
            year: r.year,
            salaries: r.salaries,
            rent: r.rent,
            depreciation_amortization: r.depreciation_amortization,
            interest: r.interest,
            total: r.total,
        });
    }
    Ok(ExpensesTable { rows })
}

#[derive(Deserialize)]
struct CategoryRecord {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Value")]
    value: Decimal,
}

fn load_budget(path: &Path) -> LoadResult<BudgetTable> {
    let mut reader = open(path)?;
    let mut lines = Vec::new();
    for record in reader.deserialize::<CategoryRecord>() {
        let r = record.map_err(|e| format!("{}: {}", path.display(), e))?;
        lines.push(BudgetLine {
            category: r.category,
            value: r.value,
        });
    }
    Ok(BudgetTable { lines })
}

fn load_balance_sheet(path: &Path) -> LoadResult<BalanceSheetTable> {
    let mut reader = open(path)?;
    let mut lines = Vec::new();
    for record in reader.deserialize::<CategoryRecord>() {
        let r = record.map_err(|e| format!("{}: {}", path.display(), e))?;
        lines.push(BalanceLine {
            category: r.category,
            value: r.value,
        });
    }
    Ok(BalanceSheetTable { lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn write_sample_dir(dir: &Path) {
        write_file(
            dir,
            REVENUE_FILE,
            "Year,Business 1,Business 2,Business 3,Consolidated\n\
             2020,100,150,200,450\n\
             2024,500,550,600,1650\n",
        );
        write_file(dir, COGS_FILE, "Year,COGS\n2020,150\n2024,500\n");
        write_file(
            dir,
            PROFIT_FILE,
            "Year,Profit $,Profit %\n2020,100,22.2\n2024,950,57.6\n",
        );
        write_file(
            dir,
            EXPENSES_FILE,
            "Year,Salaries,Rent,D&A,Interest,Total\n\
             2020,120,40,30,10,200\n\
             2024,180,60,45,15,300\n",
        );
        write_file(
            dir,
            BUDGET_FILE,
            "Category,Value\nRevenue,1700\nCOGS,520\nExpenses,310\nProfit ($),900\n",
        );
        write_file(
            dir,
            BALANCE_SHEET_FILE,
            "Category,Value\nCash,300\nReceivables,200\nEquity,500\n",
        );
    }

    #[test]
    fn test_load_dataset_from_csv_directory() {
        let dir = std::env::temp_dir().join("finmetrics_csv_load_ok");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        write_sample_dir(&dir);

        let ds = load_dataset(dir.to_str().unwrap()).unwrap();
        assert_eq!(
            ds.revenue.unit_names,
            vec!["Business 1", "Business 2", "Business 3"]
        );
        assert_eq!(ds.revenue.rows.len(), 2);
        assert_eq!(ds.revenue.rows[1].unit("Business 3").unwrap(), dec!(600));
        assert_eq!(ds.profit.rows[0].profit_pct, dec!(22.2));
        assert_eq!(ds.budget.lines.len(), 4);
        assert_eq!(ds.balance_sheet.lines.len(), 3);
    }

    #[test]
    fn test_missing_consolidated_column_names_the_column() {
        let dir = std::env::temp_dir().join("finmetrics_csv_load_badcol");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        write_sample_dir(&dir);
        write_file(
            &dir,
            REVENUE_FILE,
            "Year,Business 1,Business 2\n2020,100,150\n",
        );

        let err = load_dataset(dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Consolidated"));
    }

    #[test]
    fn test_missing_file_is_reported_with_path() {
        let dir = std::env::temp_dir().join("finmetrics_csv_load_missing");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        write_sample_dir(&dir);
        fs::remove_file(dir.join(BUDGET_FILE)).unwrap();

        let err = load_dataset(dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains(BUDGET_FILE));
    }
}
