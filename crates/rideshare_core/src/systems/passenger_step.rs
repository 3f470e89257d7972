//! Passenger per-tick action: give up once the pickup deadline passes, and
//! leave the live agent set one tick after reaching a terminal state so the
//! report snapshot still captures the final timestamps.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::SimClock;
use crate::ecs::{Passenger, PassengerState};
use crate::grid::MultiGrid;
use crate::pool::RequestPool;
use crate::telemetry::{AbandonedRequestRecord, SimTelemetry};

pub fn passenger_step(world: &mut World, entity: Entity) {
    let now = world.resource::<SimClock>().now();
    let Some(passenger) = world.get::<Passenger>(entity) else {
        return;
    };

    match passenger.state {
        PassengerState::Waiting | PassengerState::Assigned => {
            // Never picked up and out of patience: off the grid, out of the
            // pool, abandoned. Pickup wins over expiry once stamped, so
            // `Onboard` is not checked here.
            if now > passenger.latest_pickup_time() {
                abandon(world, entity, now);
            }
        }
        PassengerState::Onboard => {}
        PassengerState::Delivered | PassengerState::Abandoned => {
            // Two-phase removal: stay live for the snapshot that observes the
            // terminal tick, despawn on the activation after it.
            if passenger.retired_at().is_some_and(|tick| now > tick) {
                world.despawn(entity);
            }
        }
    }
}

fn abandon(world: &mut World, entity: Entity, now: u64) {
    world.resource_mut::<RequestPool>().remove(entity);
    world.resource_mut::<MultiGrid>().remove(entity);

    let Some(mut passenger) = world.get_mut::<Passenger>(entity) else {
        return;
    };
    passenger.state = PassengerState::Abandoned;
    passenger.abandoned_time = Some(now);
    let record = AbandonedRequestRecord {
        passenger: entity,
        request_time: passenger.request_time,
        abandoned_at: now,
    };

    let mut telemetry = world.resource_mut::<SimTelemetry>();
    telemetry.abandoned_total += 1;
    telemetry.abandoned.push(record);
}
