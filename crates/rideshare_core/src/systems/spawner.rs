//! Request arrivals: spawn a new passenger every `rate` ticks at a random
//! cell, with a random destination and waiting budget, all drawn from the
//! single simulation RNG.
//!
//! The same spawn path seeds the initial population during scenario build,
//! so arrival-time requests and initial requests are sampled identically.

use bevy_ecs::prelude::{Entity, Resource, World};
use rand::Rng;

use crate::clock::SimClock;
use crate::ecs::{Passenger, PassengerState, Position};
use crate::grid::{Location, MultiGrid};
use crate::pool::RequestPool;
use crate::rng::SimRng;
use crate::telemetry::SimTelemetry;

/// Waiting-budget sampling range when no base is configured.
const DEFAULT_BUDGET_MIN: u64 = 10;
const DEFAULT_BUDGET_MAX: u64 = 40;

/// Spread above a configured waiting-time base.
const BUDGET_SPREAD: u64 = 10;

/// Arrival configuration plus the bounded secondary-id allocator.
#[derive(Debug, Resource)]
pub struct ArrivalSpawner {
    /// Ticks between arrivals.
    pub rate: u64,
    /// Base waiting budget; `None` samples from the default range.
    pub waiting_time: Option<u64>,
    /// Requests spawned so far (initial population included).
    pub spawned: u64,
    secondary_ids: SecondaryIdAllocator,
}

impl ArrivalSpawner {
    pub fn new(rate: u64, waiting_time: Option<u64>, total_steps: u64, num_drivers: u32) -> Self {
        Self {
            rate,
            waiting_time,
            spawned: 0,
            secondary_ids: SecondaryIdAllocator::for_run(total_steps, rate, num_drivers),
        }
    }
}

/// Hands out tags `1..=limit` in order, then 0 forever. Disabled (always 0)
/// when the run length is unknown.
#[derive(Debug, Clone, Copy)]
pub struct SecondaryIdAllocator {
    next: u64,
    limit: u64,
}

impl SecondaryIdAllocator {
    pub fn for_run(total_steps: u64, rate: u64, num_drivers: u32) -> Self {
        let limit = if total_steps == 0 || rate == 0 {
            0
        } else {
            total_steps / rate + u64::from(num_drivers)
        };
        Self { next: 1, limit }
    }

    pub fn allocate(&mut self) -> u64 {
        if self.limit == 0 || self.next > self.limit {
            return 0;
        }
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Tick phase 3: spawn one request on arrival ticks.
pub fn spawn_arrivals(world: &mut World) {
    let now = world.resource::<SimClock>().now();
    let rate = world.resource::<ArrivalSpawner>().rate;
    if rate == 0 || now % rate != 0 {
        return;
    }
    spawn_passenger(world, now);
}

/// Create one passenger request at a random cell: uniform src, uniform dest
/// re-drawn until it differs from src, budget from the configured range.
/// Places the request on the grid and into the pool.
pub fn spawn_passenger(world: &mut World, request_time: u64) -> Entity {
    let (width, height) = {
        let grid = world.resource::<MultiGrid>();
        (grid.width(), grid.height())
    };
    let waiting_time = world.resource::<ArrivalSpawner>().waiting_time;

    let (src, dest, budget) = {
        let mut rng = world.resource_mut::<SimRng>();
        let src = Location::new(
            rng.0.gen_range(0..width),
            rng.0.gen_range(0..height),
        );
        let mut dest = Location::new(
            rng.0.gen_range(0..width),
            rng.0.gen_range(0..height),
        );
        while dest == src {
            dest = Location::new(
                rng.0.gen_range(0..width),
                rng.0.gen_range(0..height),
            );
        }
        let budget = match waiting_time {
            Some(base) => rng.0.gen_range(base..=base + BUDGET_SPREAD),
            None => rng.0.gen_range(DEFAULT_BUDGET_MIN..=DEFAULT_BUDGET_MAX),
        };
        (src, dest, budget)
    };

    let secondary_id = {
        let mut spawner = world.resource_mut::<ArrivalSpawner>();
        spawner.spawned += 1;
        spawner.secondary_ids.allocate()
    };

    let request = world
        .spawn((
            Passenger {
                src,
                dest,
                num_people: 1,
                request_time,
                waiting_budget: budget,
                pickup_time: None,
                dropoff_time: None,
                abandoned_time: None,
                state: PassengerState::Waiting,
                secondary_id,
            },
            Position(src),
        ))
        .id();
    world.resource_mut::<MultiGrid>().place(request, src);
    world.resource_mut::<RequestPool>().push(request);
    world.resource_mut::<SimTelemetry>().requests_spawned += 1;
    request
}
