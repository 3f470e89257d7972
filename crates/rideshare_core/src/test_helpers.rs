//! Test helpers: canned worlds, hand-placed agents, and the invariant
//! checker shared across test modules.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, World};

use crate::clock::SimClock;
use crate::ecs::{Driver, Passenger, PassengerState, Position};
use crate::grid::{Location, MultiGrid};
use crate::matching::DispatchStrategy;
use crate::pool::RequestPool;
use crate::rng::SimRng;
use crate::route::StopKind;
use crate::systems::spawner::ArrivalSpawner;
use crate::telemetry::{SimReports, SimTelemetry};

/// World with all core resources and no agents. Seeded with a fixed value;
/// tests that need randomness control it through explicit placements.
pub fn create_test_world(width: u32, height: u32) -> World {
    let mut world = World::new();
    world.insert_resource(SimClock::new());
    world.insert_resource(SimRng::seed_from(1));
    world.insert_resource(MultiGrid::new(width, height));
    world.insert_resource(RequestPool::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(SimReports::default());
    world.insert_resource(ArrivalSpawner::new(5, None, 0, 1));
    world
}

/// Advance the clock to `tick` (forward only).
pub fn set_tick(world: &mut World, tick: u64) {
    let mut clock = world.resource_mut::<SimClock>();
    while clock.now() < tick {
        clock.advance();
    }
}

/// Spawn a waiting request at a fixed cell and put it in pool and grid.
pub fn spawn_request(
    world: &mut World,
    src: Location,
    dest: Location,
    request_time: u64,
    waiting_budget: u64,
) -> Entity {
    let request = world
        .spawn((
            Passenger {
                src,
                dest,
                num_people: 1,
                request_time,
                waiting_budget,
                pickup_time: None,
                dropoff_time: None,
                abandoned_time: None,
                state: PassengerState::Waiting,
                secondary_id: 0,
            },
            Position(src),
        ))
        .id();
    world.resource_mut::<MultiGrid>().place(request, src);
    world.resource_mut::<RequestPool>().push(request);
    request
}

/// Spawn a driver with the default capacity (4) and detour budget (10).
pub fn spawn_driver_at(
    world: &mut World,
    loc: Location,
    strategy: DispatchStrategy,
    multi_pass: bool,
) -> Entity {
    spawn_driver(world, loc, strategy, multi_pass, 4, 10)
}

pub fn spawn_driver(
    world: &mut World,
    loc: Location,
    strategy: DispatchStrategy,
    multi_pass: bool,
    capacity: u32,
    detour_max: u32,
) -> Entity {
    let driver = world
        .spawn((
            Driver::new(capacity, strategy, multi_pass, detour_max),
            Position(loc),
        ))
        .id();
    world.resource_mut::<MultiGrid>().place(driver, loc);
    driver
}

/// Assert the cross-agent invariants that must hold at every turn boundary.
pub fn assert_invariants(world: &mut World) {
    let mut route_owner: HashMap<Entity, Entity> = HashMap::new();
    let mut manifest_owner: HashMap<Entity, Entity> = HashMap::new();

    let drivers: Vec<(Entity, Driver)> = {
        let mut query = world.query::<(Entity, &Driver)>();
        query
            .iter(world)
            .map(|(e, d)| (e, d.clone()))
            .collect()
    };

    for (driver_entity, driver) in &drivers {
        // Capacity holds on the manifest and the onboard headcount.
        assert!(
            driver.manifest.len() <= driver.capacity as usize,
            "manifest overflow on {driver_entity:?}"
        );
        let headcount: u32 = driver
            .manifest
            .iter()
            .filter_map(|e| world.get::<Passenger>(*e))
            .map(|p| p.num_people)
            .sum();
        assert!(headcount <= driver.capacity);

        for riding in &driver.manifest {
            // At most one manifest per request; a dropoff planned, no pickup.
            assert!(manifest_owner.insert(*riding, *driver_entity).is_none());
            assert!(
                !driver
                    .route
                    .iter()
                    .any(|s| s.passenger == *riding && s.kind == StopKind::Pickup),
                "onboard passenger still has a pickup stop"
            );
            assert!(
                driver
                    .route
                    .iter()
                    .any(|s| s.passenger == *riding && s.kind == StopKind::Dropoff),
                "onboard passenger has no dropoff stop"
            );
        }

        let mut seen_pickup: HashMap<Entity, usize> = HashMap::new();
        for (index, step) in driver.route.iter().enumerate() {
            if step.kind == StopKind::Pickup {
                seen_pickup.insert(step.passenger, index);
            }
            let owner = route_owner.insert(step.passenger, *driver_entity);
            assert!(
                owner.is_none() || owner == Some(*driver_entity),
                "request planned by two drivers"
            );
        }
        for step in &driver.route {
            if step.kind == StopKind::Dropoff && !driver.manifest.contains(&step.passenger) {
                // Pickup must precede the dropoff for requests not yet aboard.
                let pickup_index = seen_pickup.get(&step.passenger);
                let dropoff_index = driver
                    .route
                    .iter()
                    .position(|s| s.passenger == step.passenger && s.kind == StopKind::Dropoff);
                match (pickup_index, dropoff_index) {
                    (Some(p), Some(d)) => assert!(*p < d),
                    _ => panic!("route lists a dropoff with no preceding pickup"),
                }
            }
        }
    }

    // Pool holds only waiting requests.
    let pooled: Vec<Entity> = world.resource::<RequestPool>().iter().collect();
    for request in pooled {
        let passenger = world
            .get::<Passenger>(request)
            .expect("pooled request must exist");
        assert_eq!(passenger.state, PassengerState::Waiting);
        assert!(
            !route_owner.contains_key(&request),
            "pooled request appears in a route"
        );
    }

    // Grid and positions agree for everything the grid tracks.
    let placed: Vec<(Entity, Position)> = {
        let mut query = world.query::<(Entity, &Position)>();
        query.iter(world).map(|(e, p)| (e, *p)).collect()
    };
    for (entity, position) in placed {
        if let Some(cell) = world.resource::<MultiGrid>().position_of(entity) {
            assert_eq!(cell, position.0, "grid and position out of sync");
        }
    }
}
