//! Telemetry: per-tick report rows and lifecycle counters.
//!
//! Two tabular streams are captured at the top of every tick, before any
//! agent acts:
//!
//! - **Model rows**: one per tick; the fleet's total Manhattan distance to
//!   its next stops (0 for idle drivers).
//! - **Agent rows**: one per live driver or passenger per tick, carrying the
//!   driver counters or the passenger timestamps.
//!
//! Rows are ordered by agent id within a tick so identical runs produce
//! byte-identical streams. [`SimTelemetry`] additionally accumulates
//! lifecycle counts and completion/abandonment records for post-run
//! analysis; routine domain events like abandonment are recorded here
//! rather than logged.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut, Resource};

use crate::clock::SimClock;
use crate::ecs::{AgentKind, Driver, Passenger, Position};

/// One model-level report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRow {
    pub tick: u64,
    /// Sum over drivers of the Manhattan distance to their next stop.
    pub manhattan: u64,
}

/// One agent-level report row. Driver rows carry the counters; passenger
/// rows carry the request timestamps. Absent fields stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRow {
    pub tick: u64,
    pub kind: AgentKind,
    pub id: u64,
    pub steps_moved: Option<u64>,
    pub idle_ticks: Option<u64>,
    pub request_time: Option<u64>,
    pub pickup_time: Option<u64>,
    pub dropoff_time: Option<u64>,
    pub secondary_id: Option<u64>,
}

/// The collected report tables.
#[derive(Debug, Default, Resource)]
pub struct SimReports {
    pub model_rows: Vec<ModelRow>,
    pub agent_rows: Vec<AgentRow>,
}

/// One delivered request, recorded at dropoff.
#[derive(Debug, Clone, Copy)]
pub struct CompletedRequestRecord {
    pub passenger: Entity,
    pub request_time: u64,
    pub pickup_time: u64,
    pub dropoff_time: u64,
}

/// One abandoned request, recorded when its deadline elapses unserved.
#[derive(Debug, Clone, Copy)]
pub struct AbandonedRequestRecord {
    pub passenger: Entity,
    pub request_time: u64,
    pub abandoned_at: u64,
}

/// Lifecycle counters and records for the whole run.
#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub requests_spawned: u64,
    pub pickups_total: u64,
    pub delivered_total: u64,
    pub abandoned_total: u64,
    pub completed: Vec<CompletedRequestRecord>,
    pub abandoned: Vec<AbandonedRequestRecord>,
}

/// Tick phase 1: snapshot both report tables.
pub fn capture_reports(
    clock: Res<SimClock>,
    mut reports: ResMut<SimReports>,
    drivers: Query<(Entity, &Driver, &Position)>,
    passengers: Query<(Entity, &Passenger)>,
) {
    let tick = clock.now();
    let mut rows: Vec<AgentRow> = Vec::new();

    let mut manhattan_total: u64 = 0;
    for (entity, driver, position) in drivers.iter() {
        if let Some(head) = driver.route.first() {
            manhattan_total += u64::from(position.0.manhattan(head.location));
        }
        rows.push(AgentRow {
            tick,
            kind: AgentKind::Driver,
            id: entity.to_bits(),
            steps_moved: Some(driver.steps_moved),
            idle_ticks: Some(driver.idle_ticks),
            request_time: None,
            pickup_time: None,
            dropoff_time: None,
            secondary_id: None,
        });
    }

    for (entity, passenger) in passengers.iter() {
        rows.push(AgentRow {
            tick,
            kind: AgentKind::Passenger,
            id: entity.to_bits(),
            steps_moved: None,
            idle_ticks: None,
            request_time: Some(passenger.request_time),
            pickup_time: passenger.pickup_time,
            dropoff_time: passenger.dropoff_time,
            secondary_id: Some(passenger.secondary_id),
        });
    }

    rows.sort_by_key(|row| row.id);
    reports.model_rows.push(ModelRow {
        tick,
        manhattan: manhattan_total,
    });
    reports.agent_rows.extend(rows);
}
