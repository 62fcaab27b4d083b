pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod types;

pub use config::EngineConfig;
pub use dataset::{FilterSelection, FinancialDataset, UnitSelection};
pub use error::FinMetricsError;
pub use types::*;

/// Standard result type for all finmetrics operations
pub type FinMetricsResult<T> = Result<T, FinMetricsError>;
