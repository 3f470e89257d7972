use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::ecs::AgentKind;

pub(super) const AGENT_DRIVER: u8 = 0;
pub(super) const AGENT_PASSENGER: u8 = 1;
pub(super) const AGENT_DEST_MARKER: u8 = 2;

pub(super) fn u64_field(name: &'static str) -> Field {
    Field::new(name, DataType::UInt64, false)
}

pub(super) fn nullable_u64_field(name: &'static str) -> Field {
    Field::new(name, DataType::UInt64, true)
}

pub(super) fn u8_field(name: &'static str) -> Field {
    Field::new(name, DataType::UInt8, false)
}

pub(super) fn write_record_batch<P: AsRef<Path>>(
    path: P,
    schema: Schema,
    arrays: Vec<ArrayRef>,
) -> Result<(), Box<dyn Error>> {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

pub(super) fn agent_kind_code(kind: AgentKind) -> u8 {
    match kind {
        AgentKind::Driver => AGENT_DRIVER,
        AgentKind::Passenger => AGENT_PASSENGER,
        AgentKind::DestMarker => AGENT_DEST_MARKER,
    }
}
