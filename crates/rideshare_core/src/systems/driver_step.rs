//! Driver per-tick action: claim work when idle, serve stops at the current
//! cell, advance one cell toward the next stop, then look for ride-share
//! candidates along the way.
//!
//! Order within a turn matters and follows the driver state machine: the
//! arrival loop runs before the move so that consecutive stops on the same
//! cell (a dropoff immediately followed by a pickup, say) are all served in
//! one turn, and enroute insertion runs after the move so the search window
//! always starts from the cell the driver actually occupies.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::SimClock;
use crate::ecs::{DestMarker, Driver, Passenger, PassengerState, Position};
use crate::grid::{Location, MultiGrid};
use crate::matching::{assign_from_pool, insertion::onboard_headcount, try_insert_enroute};
use crate::pool::RequestPool;
use crate::route::StopKind;
use crate::telemetry::{CompletedRequestRecord, SimTelemetry};

pub fn driver_step(world: &mut World, entity: Entity) {
    let now = world.resource::<SimClock>().now();

    // 1. Idle: try to claim a request; count the tick as idle if none stuck.
    let idle = world
        .get::<Driver>(entity)
        .map(|d| d.route.is_empty())
        .unwrap_or(true);
    if idle {
        if !world.resource::<RequestPool>().is_empty() {
            assign_from_pool(world, entity, now);
        }
        let still_idle = world
            .get::<Driver>(entity)
            .map(|d| d.route.is_empty())
            .unwrap_or(true);
        if still_idle {
            if let Some(mut driver) = world.get_mut::<Driver>(entity) {
                driver.idle_ticks += 1;
            }
            return;
        }
    }

    // 2. Serve every stop sitting on the current cell.
    process_route_head(world, entity, now);

    // 3. One 4-neighbour step toward the head.
    let moved = advance_one_cell(world, entity);

    // 4. Ride-sharing: look for extra passengers along the remaining leg.
    if moved {
        let Some(driver) = world.get::<Driver>(entity) else {
            return;
        };
        let (multi_pass, capacity) = (driver.multi_pass, driver.capacity);
        if multi_pass && onboard_headcount(world, entity) < capacity {
            try_insert_enroute(world, entity, now);
        }
    }
}

/// Pickup/dropoff loop: run while the route head is the driver's cell.
fn process_route_head(world: &mut World, entity: Entity, now: u64) {
    loop {
        let Some(current) = world.get::<Position>(entity).map(|p| p.0) else {
            return;
        };
        let Some(head) = world
            .get::<Driver>(entity)
            .and_then(|d| d.route.first().copied())
        else {
            return;
        };
        if head.location != current {
            return;
        }

        let state = world.get::<Passenger>(head.passenger).map(|p| p.state);
        match (head.kind, state) {
            (StopKind::Dropoff, Some(PassengerState::Onboard)) => {
                drop_off(world, entity, head.passenger, now);
            }
            (StopKind::Pickup, Some(PassengerState::Assigned)) => {
                let standing_here = world
                    .resource::<MultiGrid>()
                    .contents(current)
                    .contains(&head.passenger);
                if standing_here {
                    pick_up(world, entity, head.passenger, now);
                } else {
                    // The passenger left the grid before we arrived; drop
                    // both of their stops so the head cannot wedge.
                    remove_stops_for(world, entity, head.passenger);
                }
            }
            // Request gone or already terminal: clear its stops and move on.
            (_, None)
            | (StopKind::Pickup, Some(_))
            | (StopKind::Dropoff, Some(PassengerState::Abandoned)) => {
                remove_stops_for(world, entity, head.passenger);
            }
            // Anything else is a plan/state mismatch; leave the route alone.
            _ => return,
        }
    }
}

fn pick_up(world: &mut World, entity: Entity, passenger_entity: Entity, now: u64) {
    world.resource_mut::<MultiGrid>().remove(passenger_entity);

    let dest = {
        let Some(mut passenger) = world.get_mut::<Passenger>(passenger_entity) else {
            return;
        };
        passenger.state = PassengerState::Onboard;
        passenger.pickup_time = Some(now);
        passenger.dest
    };

    if let Some(mut driver) = world.get_mut::<Driver>(entity) {
        if !driver.route.is_empty() {
            driver.route.remove(0);
        }
        driver.manifest.push(passenger_entity);
    }
    world.resource_mut::<SimTelemetry>().pickups_total += 1;

    let marker = world
        .spawn((
            DestMarker {
                passenger: passenger_entity,
            },
            Position(dest),
        ))
        .id();
    world.resource_mut::<MultiGrid>().place(marker, dest);
}

fn drop_off(world: &mut World, entity: Entity, passenger_entity: Entity, now: u64) {
    let record = {
        let Some(mut passenger) = world.get_mut::<Passenger>(passenger_entity) else {
            return;
        };
        passenger.state = PassengerState::Delivered;
        passenger.dropoff_time = Some(now);
        CompletedRequestRecord {
            passenger: passenger_entity,
            request_time: passenger.request_time,
            pickup_time: passenger.pickup_time.unwrap_or(passenger.request_time),
            dropoff_time: now,
        }
    };

    if let Some(mut driver) = world.get_mut::<Driver>(entity) {
        if !driver.route.is_empty() {
            driver.route.remove(0);
        }
        driver.manifest.retain(|e| *e != passenger_entity);
    }

    let mut telemetry = world.resource_mut::<SimTelemetry>();
    telemetry.delivered_total += 1;
    telemetry.completed.push(record);

    remove_marker_for(world, passenger_entity);
}

/// Drop every stop serving `passenger_entity` from the driver's route.
fn remove_stops_for(world: &mut World, entity: Entity, passenger_entity: Entity) {
    if let Some(mut driver) = world.get_mut::<Driver>(entity) {
        driver.route.retain(|step| step.passenger != passenger_entity);
    }
}

fn remove_marker_for(world: &mut World, passenger_entity: Entity) {
    let mut marker_query = world.query::<(Entity, &DestMarker)>();
    let marker = marker_query
        .iter(world)
        .find(|(_, m)| m.passenger == passenger_entity)
        .map(|(e, _)| e);
    if let Some(marker) = marker {
        world.resource_mut::<MultiGrid>().remove(marker);
        world.despawn(marker);
    }
}

/// Take one step toward the route head, x before y, and keep the grid in
/// sync. Returns whether the driver moved.
fn advance_one_cell(world: &mut World, entity: Entity) -> bool {
    let Some(current) = world.get::<Position>(entity).map(|p| p.0) else {
        return false;
    };
    let Some(target) = world
        .get::<Driver>(entity)
        .and_then(|d| d.route.first().map(|step| step.location))
    else {
        return false;
    };
    if target == current {
        return false;
    }

    let next = if current.x < target.x {
        Location::new(current.x + 1, current.y)
    } else if current.x > target.x {
        Location::new(current.x - 1, current.y)
    } else if current.y < target.y {
        Location::new(current.x, current.y + 1)
    } else {
        Location::new(current.x, current.y - 1)
    };

    world.resource_mut::<MultiGrid>().move_to(entity, next);
    if let Some(mut position) = world.get_mut::<Position>(entity) {
        position.0 = next;
    }
    if let Some(mut driver) = world.get_mut::<Driver>(entity) {
        driver.steps_moved += 1;
    }
    true
}
