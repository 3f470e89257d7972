//! Initial assignment: an idle driver claims one request from the pool.
//!
//! The driver's strategy picks a candidate; candidates whose pickup deadline
//! the driver cannot meet are passed over and the next-ranked one is tried,
//! until a feasible request is found or the pool is exhausted. Acceptance is
//! atomic within the driver's turn: the request leaves the pool, turns
//! `Assigned`, and the driver's route becomes pickup-then-dropoff.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{Driver, Passenger, PassengerState, Position};
use crate::pool::RequestPool;
use crate::route::RouteStep;

/// Try to give an idle driver a route. Returns `true` if a request was
/// claimed. Requests whose deadline has already elapsed are popped from the
/// pool defensively; their own turn marks them abandoned.
pub fn assign_from_pool(world: &mut World, driver_entity: Entity, now: u64) -> bool {
    let Some(current) = world.get::<Position>(driver_entity).map(|p| p.0) else {
        return false;
    };
    let Some((strategy, capacity)) = world
        .get::<Driver>(driver_entity)
        .map(|d| (d.strategy, d.capacity))
    else {
        return false;
    };

    let mut passed_over: Vec<Entity> = Vec::new();
    loop {
        let mut best: Option<(Entity, u64)> = None;
        {
            let pool = world.resource::<RequestPool>();
            for request in pool.iter() {
                if passed_over.contains(&request) {
                    continue;
                }
                let Some(passenger) = world.get::<Passenger>(request) else {
                    continue;
                };
                let key = strategy.rank(current, passenger);
                match best {
                    Some((_, best_key)) if key >= best_key => {}
                    _ => best = Some((request, key)),
                }
            }
        }
        let Some((request, _)) = best else {
            return false;
        };

        let Some(passenger) = world.get::<Passenger>(request) else {
            passed_over.push(request);
            continue;
        };
        let (src, dest, latest, people) =
            (passenger.src, passenger.dest, passenger.latest_pickup_time(), passenger.num_people);

        if now > latest {
            // Stale: the deadline is already gone for everyone.
            world.resource_mut::<RequestPool>().remove(request);
            continue;
        }
        if now + u64::from(current.manhattan(src)) > latest || people > capacity {
            passed_over.push(request);
            continue;
        }

        world.resource_mut::<RequestPool>().remove(request);
        if let Some(mut passenger) = world.get_mut::<Passenger>(request) {
            passenger.state = PassengerState::Assigned;
        }
        if let Some(mut driver) = world.get_mut::<Driver>(driver_entity) {
            driver.route = vec![
                RouteStep::pickup(src, request),
                RouteStep::dropoff(dest, request),
            ];
        }
        return true;
    }
}
