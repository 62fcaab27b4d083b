use std::time::Instant;

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::config::{CagrSpan, EmptyFilterPolicy};
use crate::dataset::{FilterSelection, RevenueRow, RevenueTable, UnitSelection};
use crate::error::FinMetricsError;
use crate::filter::{rows_for_years, select_business_unit};
use crate::types::{with_metadata, ComputationOutput, Pct};
use crate::FinMetricsResult;

/// Compound annual growth rate for one business unit, as a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitGrowth {
    pub unit: String,
    pub cagr_pct: Pct,
}

/// CAGR per selected unit over the first and last rows in scope.
///
/// Output order follows `unit_names`, not table insertion order, so
/// radar-style consumers get a stable axis ordering. Units whose start or
/// end value is non-positive are excluded entirely (CAGR is undefined
/// there), each with a warning.
pub(crate) fn cagr_per_unit(
    unit_names: &[String],
    rows: &[RevenueRow],
    span: CagrSpan,
    warnings: &mut Vec<String>,
) -> FinMetricsResult<Vec<UnitGrowth>> {
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(f), Some(l)) if rows.len() >= 2 => (f, l),
        _ => {
            return Err(FinMetricsError::InsufficientData(
                "CAGR needs at least two revenue rows".to_string(),
            ))
        }
    };

    let n = match span {
        CagrSpan::Fixed(0) => {
            return Err(FinMetricsError::InvalidInput {
                field: "cagr_span".to_string(),
                reason: "fixed span must be positive".to_string(),
            })
        }
        CagrSpan::Fixed(n) => Decimal::from(n),
        CagrSpan::Dynamic => {
            let span_years = last.year - first.year;
            if span_years <= 0 {
                return Err(FinMetricsError::InsufficientData(format!(
                    "CAGR span is zero ({} to {})",
                    first.year, last.year
                )));
            }
            Decimal::from(span_years)
        }
    };

    let mut growth = Vec::new();
    for unit in unit_names {
        let start_value = first.unit(unit).unwrap_or(Decimal::ZERO);
        let end_value = last.unit(unit).unwrap_or(Decimal::ZERO);

        if start_value <= Decimal::ZERO || end_value <= Decimal::ZERO {
            warnings.push(format!(
                "{unit} excluded from CAGR: non-positive revenue ({start_value} to {end_value})"
            ));
            continue;
        }

        let cagr = (end_value / start_value).powd(Decimal::ONE / n) - Decimal::ONE;
        growth.push(UnitGrowth {
            unit: unit.clone(),
            cagr_pct: cagr * Decimal::ONE_HUNDRED,
        });
    }

    Ok(growth)
}

/// Compute CAGR for the selected unit(s), wrapped in the standard envelope.
pub fn compute_cagr(
    unit_names: &[String],
    rows: &[RevenueRow],
    selection: &UnitSelection,
    span: CagrSpan,
) -> FinMetricsResult<ComputationOutput<Vec<UnitGrowth>>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    // Unit resolution only needs the configured names, not the rows
    let table = RevenueTable {
        unit_names: unit_names.to_vec(),
        rows: Vec::new(),
    };
    let selected = select_business_unit(&table, selection)?;
    let growth = cagr_per_unit(&selected, rows, span, &mut warnings)?;

    let assumptions = serde_json::json!({
        "span": span,
        "selection": selection,
        "endpoints": "first and last row in scope",
    });
    Ok(with_metadata(
        "Compound annual growth rate per business unit",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        growth,
    ))
}

/// CAGR over the rows an active year filter leaves in scope, so endpoints
/// move with the filter. Fallback warnings come first in the envelope.
pub fn compute_cagr_filtered(
    table: &RevenueTable,
    selection: &FilterSelection,
    span: CagrSpan,
    policy: EmptyFilterPolicy,
) -> FinMetricsResult<ComputationOutput<Vec<UnitGrowth>>> {
    let mut filter_warnings = Vec::new();
    let rows = rows_for_years(&table.rows, &selection.years, policy, &mut filter_warnings)?;

    let mut output = compute_cagr(&table.unit_names, &rows, &selection.unit, span)?;
    output.warnings.splice(0..0, filter_warnings);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn row(year: i32, values: &[(&str, Decimal)]) -> RevenueRow {
        let mut units = BTreeMap::new();
        for (name, v) in values {
            units.insert(name.to_string(), *v);
        }
        let consolidated = values.iter().map(|(_, v)| *v).sum();
        RevenueRow {
            year,
            units,
            consolidated,
        }
    }

    fn unit_names() -> Vec<String> {
        vec![
            "Business 1".to_string(),
            "Business 2".to_string(),
            "Business 3".to_string(),
        ]
    }

    #[test]
    fn test_cagr_all_units_four_year_span() {
        let rows = vec![
            row(
                2020,
                &[
                    ("Business 1", dec!(100)),
                    ("Business 2", dec!(150)),
                    ("Business 3", dec!(200)),
                ],
            ),
            row(
                2024,
                &[
                    ("Business 1", dec!(500)),
                    ("Business 2", dec!(550)),
                    ("Business 3", dec!(600)),
                ],
            ),
        ];
        let out = compute_cagr(&unit_names(), &rows, &UnitSelection::All, CagrSpan::Dynamic)
            .unwrap();
        let pct: Vec<(String, Decimal)> = out
            .result
            .iter()
            .map(|g| (g.unit.clone(), g.cagr_pct.round_dp(1)))
            .collect();
        // B1: (500/100)^(1/4) - 1 = 0.4953 -> 49.5
        // B2: (550/150)^(1/4) - 1 = 0.3838 -> 38.4
        // B3: (600/200)^(1/4) - 1 = 0.3161 -> 31.6
        assert_eq!(pct[0], ("Business 1".to_string(), dec!(49.5)));
        assert_eq!(pct[1], ("Business 2".to_string(), dec!(38.4)));
        assert_eq!(pct[2], ("Business 3".to_string(), dec!(31.6)));
        // All three grow, so every CAGR is positive
        assert!(out.result.iter().all(|g| g.cagr_pct > Decimal::ZERO));
    }

    #[test]
    fn test_fixed_span_matches_dynamic_when_ranges_agree() {
        let rows = vec![
            row(2020, &[("Business 1", dec!(100))]),
            row(2024, &[("Business 1", dec!(500))]),
        ];
        let names = vec!["Business 1".to_string()];
        let dynamic =
            compute_cagr(&names, &rows, &UnitSelection::All, CagrSpan::Dynamic).unwrap();
        let fixed =
            compute_cagr(&names, &rows, &UnitSelection::All, CagrSpan::Fixed(4)).unwrap();
        assert_eq!(
            dynamic.result[0].cagr_pct.round_dp(6),
            fixed.result[0].cagr_pct.round_dp(6)
        );
    }

    #[test]
    fn test_fixed_span_overrides_actual_range() {
        // Two-year range, but the legacy revisions divided by 4 anyway
        let rows = vec![
            row(2022, &[("Business 1", dec!(100))]),
            row(2024, &[("Business 1", dec!(500))]),
        ];
        let names = vec!["Business 1".to_string()];
        let fixed =
            compute_cagr(&names, &rows, &UnitSelection::All, CagrSpan::Fixed(4)).unwrap();
        // 5^(1/4)-1 = 49.5%, not 5^(1/2)-1 = 123.6%
        assert_eq!(fixed.result[0].cagr_pct.round_dp(1), dec!(49.5));
    }

    #[test]
    fn test_zero_start_value_excludes_unit_entirely() {
        let rows = vec![
            row(2020, &[("Business 1", dec!(0)), ("Business 2", dec!(150))]),
            row(2024, &[("Business 1", dec!(500)), ("Business 2", dec!(550))]),
        ];
        let names = vec!["Business 1".to_string(), "Business 2".to_string()];
        let out = compute_cagr(&names, &rows, &UnitSelection::All, CagrSpan::Dynamic).unwrap();
        // Business 1 is absent, not zeroed and not infinite
        assert_eq!(out.result.len(), 1);
        assert_eq!(out.result[0].unit, "Business 2");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Business 1"));
    }

    #[test]
    fn test_single_row_is_insufficient_data() {
        let rows = vec![row(2020, &[("Business 1", dec!(100))])];
        let names = vec!["Business 1".to_string()];
        let err = compute_cagr(&names, &rows, &UnitSelection::All, CagrSpan::Dynamic)
            .unwrap_err();
        assert!(matches!(err, FinMetricsError::InsufficientData(_)));
    }

    #[test]
    fn test_named_selection_limits_output_to_one_unit() {
        let rows = vec![
            row(2020, &[("Business 1", dec!(100)), ("Business 2", dec!(150))]),
            row(2024, &[("Business 1", dec!(500)), ("Business 2", dec!(550))]),
        ];
        let names = vec!["Business 1".to_string(), "Business 2".to_string()];
        let out = compute_cagr(
            &names,
            &rows,
            &UnitSelection::Named("Business 2".to_string()),
            CagrSpan::Dynamic,
        )
        .unwrap();
        assert_eq!(out.result.len(), 1);
        assert_eq!(out.result[0].unit, "Business 2");
    }

    #[test]
    fn test_year_filter_moves_the_cagr_endpoints() {
        let table = RevenueTable {
            unit_names: vec!["Business 1".to_string()],
            rows: vec![
                row(2020, &[("Business 1", dec!(100))]),
                row(2022, &[("Business 1", dec!(300))]),
                row(2024, &[("Business 1", dec!(500))]),
            ],
        };
        let filtered = compute_cagr_filtered(
            &table,
            &FilterSelection::years(vec![2020, 2022]),
            CagrSpan::Dynamic,
            EmptyFilterPolicy::FallbackToUnfiltered,
        )
        .unwrap();
        // (300/100)^(1/2) - 1 = 73.2%, not the full-range 49.5%
        assert_eq!(filtered.result[0].cagr_pct.round_dp(1), dec!(73.2));
        assert!(filtered.warnings.is_empty());

        let unfiltered = compute_cagr_filtered(
            &table,
            &FilterSelection::all(),
            CagrSpan::Dynamic,
            EmptyFilterPolicy::FallbackToUnfiltered,
        )
        .unwrap();
        assert_eq!(unfiltered.result[0].cagr_pct.round_dp(1), dec!(49.5));
    }

    #[test]
    fn test_unknown_unit_propagates() {
        let rows = vec![
            row(2020, &[("Business 1", dec!(100))]),
            row(2024, &[("Business 1", dec!(500))]),
        ];
        let names = vec!["Business 1".to_string()];
        let err = compute_cagr(
            &names,
            &rows,
            &UnitSelection::Named("Business 9".to_string()),
            CagrSpan::Dynamic,
        )
        .unwrap_err();
        assert!(matches!(err, FinMetricsError::UnknownUnit { .. }));
    }
}
