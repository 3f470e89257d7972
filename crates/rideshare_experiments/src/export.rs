//! Result export: CSV for spreadsheets, Parquet for analysis pipelines.

use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::metrics::SimulationResult;

/// Export results as CSV, one row per run, headers from the field names.
pub fn export_to_csv(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export results to Parquet with one column per metric.
pub fn export_to_parquet(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    if results.is_empty() {
        return Err("No results to export".into());
    }

    let schema = Schema::new(vec![
        Field::new("experiment_id", DataType::Utf8, false),
        Field::new("run_id", DataType::UInt64, false),
        Field::new("strategy", DataType::Utf8, false),
        Field::new("multi_pass", DataType::Boolean, false),
        Field::new("seed", DataType::UInt64, false),
        Field::new("requests_spawned", DataType::UInt64, false),
        Field::new("delivered", DataType::UInt64, false),
        Field::new("abandoned", DataType::UInt64, false),
        Field::new("delivery_rate", DataType::Float64, false),
        Field::new("avg_wait_ticks", DataType::Float64, false),
        Field::new("median_wait_ticks", DataType::Float64, false),
        Field::new("p90_wait_ticks", DataType::Float64, false),
        Field::new("avg_ride_ticks", DataType::Float64, false),
        Field::new("total_steps_moved", DataType::UInt64, false),
        Field::new("total_idle_ticks", DataType::UInt64, false),
        Field::new("fleet_idle_share", DataType::Float64, false),
    ]);

    let experiment_id: Vec<&str> = results.iter().map(|r| r.experiment_id.as_str()).collect();
    let run_id: Vec<u64> = results.iter().map(|r| r.run_id).collect();
    let strategy: Vec<&str> = results.iter().map(|r| r.strategy.as_str()).collect();
    let multi_pass: Vec<bool> = results.iter().map(|r| r.multi_pass).collect();
    let seed: Vec<u64> = results.iter().map(|r| r.seed).collect();
    let requests_spawned: Vec<u64> = results.iter().map(|r| r.requests_spawned).collect();
    let delivered: Vec<u64> = results.iter().map(|r| r.delivered).collect();
    let abandoned: Vec<u64> = results.iter().map(|r| r.abandoned).collect();
    let delivery_rate: Vec<f64> = results.iter().map(|r| r.delivery_rate).collect();
    let avg_wait_ticks: Vec<f64> = results.iter().map(|r| r.avg_wait_ticks).collect();
    let median_wait_ticks: Vec<f64> = results.iter().map(|r| r.median_wait_ticks).collect();
    let p90_wait_ticks: Vec<f64> = results.iter().map(|r| r.p90_wait_ticks).collect();
    let avg_ride_ticks: Vec<f64> = results.iter().map(|r| r.avg_ride_ticks).collect();
    let total_steps_moved: Vec<u64> = results.iter().map(|r| r.total_steps_moved).collect();
    let total_idle_ticks: Vec<u64> = results.iter().map(|r| r.total_idle_ticks).collect();
    let fleet_idle_share: Vec<f64> = results.iter().map(|r| r.fleet_idle_share).collect();

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(experiment_id)),
        Arc::new(UInt64Array::from(run_id)),
        Arc::new(StringArray::from(strategy)),
        Arc::new(BooleanArray::from(multi_pass)),
        Arc::new(UInt64Array::from(seed)),
        Arc::new(UInt64Array::from(requests_spawned)),
        Arc::new(UInt64Array::from(delivered)),
        Arc::new(UInt64Array::from(abandoned)),
        Arc::new(Float64Array::from(delivery_rate)),
        Arc::new(Float64Array::from(avg_wait_ticks)),
        Arc::new(Float64Array::from(median_wait_ticks)),
        Arc::new(Float64Array::from(p90_wait_ticks)),
        Arc::new(Float64Array::from(avg_ride_ticks)),
        Arc::new(UInt64Array::from(total_steps_moved)),
        Arc::new(UInt64Array::from(total_idle_ticks)),
        Arc::new(Float64Array::from(fleet_idle_share)),
    ];

    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSet;
    use crate::runner::run_single_simulation;

    fn sample_results() -> Vec<SimulationResult> {
        let set = ParameterSet {
            total_steps: 100,
            ..ParameterSet::default()
        };
        vec![run_single_simulation(&set).unwrap()]
    }

    #[test]
    fn csv_export_writes_headers_and_rows() {
        let results = sample_results();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        export_to_csv(&results, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("experiment_id"));
        assert!(header.contains("delivery_rate"));
        assert_eq!(lines.count(), results.len());
    }

    #[test]
    fn parquet_export_writes_a_file() {
        let results = sample_results();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.parquet");
        export_to_parquet(&results, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn parquet_export_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");
        assert!(export_to_parquet(&[], &path).is_err());
    }
}
