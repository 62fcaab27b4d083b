use napi::Result as NapiResult;
use napi_derive::napi;

use finmetrics_core::config::EngineConfig;
use finmetrics_core::dataset::{FilterSelection, FinancialDataset};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Dataset plus the per-interaction selection and engine policy flags,
/// as the web presentation layer sends them.
#[derive(serde::Deserialize)]
struct EngineCall {
    dataset: FinancialDataset,
    #[serde(default)]
    selection: FilterSelection,
    #[serde(default)]
    config: EngineConfig,
}

fn parse_call(input_json: &str) -> NapiResult<EngineCall> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Engine operations
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_metrics(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let output = finmetrics_core::metrics::bundle::compute_metrics(
        &call.dataset,
        &call.selection,
        &call.config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn revenue_series(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let output = finmetrics_core::filter::compute_revenue_series(
        &call.dataset.revenue,
        &call.selection,
        call.config.empty_filter,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn profit_margin(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let output = finmetrics_core::metrics::margin::compute_profit_margin(
        &call.dataset.profit.rows,
        &call.selection.years,
        call.config.empty_filter,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn cost_structure(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let output = finmetrics_core::metrics::cost_structure::compute_cost_structure_filtered(
        &call.dataset,
        &call.selection.years,
        call.config.empty_filter,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_cagr(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let output = finmetrics_core::metrics::growth::compute_cagr_filtered(
        &call.dataset.revenue,
        &call.selection,
        call.config.cagr_span,
        call.config.empty_filter,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn budget_vs_actual(input_json: String) -> NapiResult<String> {
    let call = parse_call(&input_json)?;
    let reference_year = finmetrics_core::metrics::budget::resolve_reference_year(
        &call.dataset,
        &call.selection.years,
        &call.config,
    )
    .map_err(to_napi_error)?;
    let output =
        finmetrics_core::metrics::budget::compute_budget_vs_actual(&call.dataset, reference_year)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
