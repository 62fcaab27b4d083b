use crate::types::Year;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinMetricsError {
    #[error("Unknown business unit '{unit}' (available: {})", .available.join(", "))]
    UnknownUnit { unit: String, available: Vec<String> },

    #[error("Budget table is missing required category '{category}'")]
    MissingBudgetCategory { category: String },

    #[error("Year filter {requested:?} matched no rows")]
    EmptyYearFilter { requested: Vec<Year> },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FinMetricsError {
    fn from(e: serde_json::Error) -> Self {
        FinMetricsError::SerializationError(e.to_string())
    }
}
