use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, UInt64Array, UInt8Array};
use arrow::datatypes::Schema;

use crate::telemetry::SimReports;

use super::utils::{agent_kind_code, nullable_u64_field, u64_field, u8_field, write_record_batch};

/// Write the agent-level report: one row per live agent per tick. Driver
/// rows carry the counters, passenger rows the timestamps; the other columns
/// are null.
pub fn write_agent_report_parquet<P: AsRef<Path>>(
    path: P,
    reports: &SimReports,
) -> Result<(), Box<dyn Error>> {
    let mut tick = Vec::new();
    let mut kind = Vec::new();
    let mut id = Vec::new();
    let mut steps_moved = Vec::new();
    let mut idle_ticks = Vec::new();
    let mut request_time = Vec::new();
    let mut pickup_time = Vec::new();
    let mut dropoff_time = Vec::new();
    let mut secondary_id = Vec::new();

    for row in &reports.agent_rows {
        tick.push(row.tick);
        kind.push(agent_kind_code(row.kind));
        id.push(row.id);
        steps_moved.push(row.steps_moved);
        idle_ticks.push(row.idle_ticks);
        request_time.push(row.request_time);
        pickup_time.push(row.pickup_time);
        dropoff_time.push(row.dropoff_time);
        secondary_id.push(row.secondary_id);
    }

    let schema = Schema::new(vec![
        u64_field("tick"),
        u8_field("kind"),
        u64_field("id"),
        nullable_u64_field("steps_moved"),
        nullable_u64_field("idle_ticks"),
        nullable_u64_field("request_time"),
        nullable_u64_field("pickup_time"),
        nullable_u64_field("dropoff_time"),
        nullable_u64_field("secondary_id"),
    ]);
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(tick)),
        Arc::new(UInt8Array::from(kind)),
        Arc::new(UInt64Array::from(id)),
        Arc::new(UInt64Array::from_iter(steps_moved)),
        Arc::new(UInt64Array::from_iter(idle_ticks)),
        Arc::new(UInt64Array::from_iter(request_time)),
        Arc::new(UInt64Array::from_iter(pickup_time)),
        Arc::new(UInt64Array::from_iter(dropoff_time)),
        Arc::new(UInt64Array::from_iter(secondary_id)),
    ];
    write_record_batch(path, schema, arrays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{run_ticks, simulation_schedule};
    use crate::scenario::{build_scenario, ScenarioParams};
    use bevy_ecs::prelude::World;

    #[test]
    fn exports_rows_from_a_short_run() {
        let mut world = World::new();
        build_scenario(&mut world, ScenarioParams::default().with_seed(3)).unwrap();
        let mut schedule = simulation_schedule();
        run_ticks(&mut world, &mut schedule, 20);

        let reports = world.resource::<SimReports>();
        assert!(!reports.agent_rows.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.parquet");
        write_agent_report_parquet(&path, reports).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
