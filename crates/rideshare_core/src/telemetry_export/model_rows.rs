use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, UInt64Array};
use arrow::datatypes::Schema;

use crate::telemetry::SimReports;

use super::utils::{u64_field, write_record_batch};

/// Write the model-level report: one row per tick.
pub fn write_model_report_parquet<P: AsRef<Path>>(
    path: P,
    reports: &SimReports,
) -> Result<(), Box<dyn Error>> {
    let mut tick = Vec::new();
    let mut manhattan = Vec::new();
    for row in &reports.model_rows {
        tick.push(row.tick);
        manhattan.push(row.manhattan);
    }

    let schema = Schema::new(vec![u64_field("tick"), u64_field("manhattan")]);
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(tick)),
        Arc::new(UInt64Array::from(manhattan)),
    ];
    write_record_batch(path, schema, arrays)
}
