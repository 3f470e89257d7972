//! Parquet export of the collected report tables.
//!
//! One writer per table; both consume [`SimReports`](crate::telemetry::SimReports)
//! and write a single record batch with stable column names.

mod agent_rows;
mod model_rows;
mod utils;

pub use agent_rows::write_agent_report_parquet;
pub use model_rows::write_model_report_parquet;
