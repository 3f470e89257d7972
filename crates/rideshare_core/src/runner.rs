//! Simulation runner: assembles the per-tick schedule and drives it.
//!
//! One tick, in order:
//!
//! 1. [`capture_reports`](crate::telemetry::capture_reports) snapshots the
//!    report tables,
//! 2. [`activate_agents`](crate::systems::activation::activate_agents) runs
//!    every live agent once in a shuffled order,
//! 3. [`spawn_arrivals`](crate::systems::spawner::spawn_arrivals) fires new
//!    requests on arrival ticks,
//! 4. the clock advances.
//!
//! The simulation never terminates on its own; callers bound it with a tick
//! count or an end-tick resource.

use bevy_ecs::prelude::{ResMut, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::SimClock;
use crate::scenario::SimulationEndTick;
use crate::systems::activation::activate_agents;
use crate::systems::spawner::spawn_arrivals;
use crate::telemetry::capture_reports;

fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

/// Builds the per-tick schedule with the four phases in fixed order.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            capture_reports,
            activate_agents,
            spawn_arrivals,
            advance_clock,
        )
            .chain(),
    );
    schedule
}

/// Run exactly one tick.
pub fn run_tick(world: &mut World, schedule: &mut Schedule) {
    schedule.run(world);
}

/// Run exactly `ticks` ticks.
pub fn run_ticks(world: &mut World, schedule: &mut Schedule, ticks: u64) {
    for _ in 0..ticks {
        schedule.run(world);
    }
}

/// Run until the configured [`SimulationEndTick`] (when present) or
/// `max_ticks`, whichever comes first. Returns the number of ticks run.
pub fn run_to_end(world: &mut World, schedule: &mut Schedule, max_ticks: u64) -> u64 {
    let mut ran = 0;
    while ran < max_ticks {
        if let Some(end) = world.get_resource::<SimulationEndTick>() {
            if world.resource::<SimClock>().now() >= end.0 {
                break;
            }
        }
        schedule.run(world);
        ran += 1;
    }
    ran
}
