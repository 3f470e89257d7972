//! Enroute insertion: ride-sharing for drivers already on a route.
//!
//! After each one-cell move, a `multi_pass` driver with spare capacity scans
//! the axis-aligned rectangle between itself and its next stop. Pooled
//! requests standing in that window are ranked by the driver's strategy and
//! spliced into the route when feasible:
//!
//! - the pickup must lie on an existing segment (zero detour);
//! - the dropoff is placed on-path if possible, otherwise at the position
//!   with the smallest detour that stays within `detour_max` and does not
//!   push any later pickup past its deadline;
//! - the tentative route must never exceed the vehicle's capacity.
//!
//! Successful insertion removes the request from the pool and marks it
//! assigned, exactly like initial assignment.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{Driver, Passenger, PassengerState, Position};
use crate::grid::{Location, MultiGrid};
use crate::pool::RequestPool;
use crate::route::{arrival_offsets, detour_cost, RouteStep, StopKind};

/// A candidate's stops plus what feasibility needs to know about it.
struct Candidate {
    request: Entity,
    src: Location,
    dest: Location,
    latest_pickup: u64,
}

/// Scan the search window and insert every feasible candidate, best-ranked
/// first. The window is fixed at invocation; the route is re-read per
/// candidate so later candidates see earlier insertions.
pub fn try_insert_enroute(world: &mut World, driver_entity: Entity, now: u64) {
    let Some(current) = world.get::<Position>(driver_entity).map(|p| p.0) else {
        return;
    };
    let Some(driver) = world.get::<Driver>(driver_entity) else {
        return;
    };
    let (strategy, capacity, detour_max) = (driver.strategy, driver.capacity, driver.detour_max);
    let Some(head_loc) = driver.route.first().map(|step| step.location) else {
        return;
    };

    let in_window = world
        .resource::<MultiGrid>()
        .contents_rect(current, head_loc);

    // Candidates in pool order so the stable sort below breaks rank ties the
    // same way initial assignment does.
    let mut candidates: Vec<(Entity, u64)> = Vec::new();
    {
        let pool = world.resource::<RequestPool>();
        let Some(driver) = world.get::<Driver>(driver_entity) else {
            return;
        };
        for request in pool.iter() {
            if !in_window.contains(&request) || driver.route_contains(request) {
                continue;
            }
            let Some(passenger) = world.get::<Passenger>(request) else {
                continue;
            };
            candidates.push((request, strategy.rank(current, passenger)));
        }
    }
    candidates.sort_by_key(|(_, key)| *key);

    for (request, _) in candidates {
        if !world.resource::<RequestPool>().contains(request) {
            continue;
        }
        let Some(passenger) = world.get::<Passenger>(request) else {
            continue;
        };
        let candidate = Candidate {
            request,
            src: passenger.src,
            dest: passenger.dest,
            latest_pickup: passenger.latest_pickup_time(),
        };
        if candidate.latest_pickup < now + u64::from(current.manhattan(candidate.src)) {
            continue;
        }

        let Some(route) = world.get::<Driver>(driver_entity).map(|d| d.route.clone()) else {
            return;
        };
        let start_load = onboard_headcount(world, driver_entity);
        let Some(tentative) = place_stops(
            world, now, current, &route, &candidate, detour_max, capacity, start_load,
        ) else {
            continue;
        };

        world.resource_mut::<RequestPool>().remove(request);
        if let Some(mut passenger) = world.get_mut::<Passenger>(request) {
            passenger.state = PassengerState::Assigned;
        }
        if let Some(mut driver) = world.get_mut::<Driver>(driver_entity) {
            driver.route = tentative;
        }
    }
}

/// Headcount currently riding in the vehicle.
pub fn onboard_headcount(world: &World, driver_entity: Entity) -> u32 {
    let Some(driver) = world.get::<Driver>(driver_entity) else {
        return 0;
    };
    driver
        .manifest
        .iter()
        .filter_map(|e| world.get::<Passenger>(*e))
        .map(|p| p.num_people)
        .sum()
}

/// Find positions for a candidate's stops in `route`. Returns the tentative
/// route on success.
fn place_stops(
    world: &World,
    now: u64,
    current: Location,
    route: &[RouteStep],
    candidate: &Candidate,
    detour_max: u32,
    capacity: u32,
    start_load: u32,
) -> Option<Vec<RouteStep>> {
    let n = route.len();

    // Pickup placement: the earliest segment the src lies on. Segment 0 runs
    // from the driver's current cell to the route head.
    let src_pos = (0..n).find(|&i| {
        let from = if i == 0 { current } else { route[i - 1].location };
        candidate.src.within_rect(from, route[i].location)
    })?;

    let src_step = RouteStep::pickup(candidate.src, candidate.request);
    let dest_step = RouteStep::dropoff(candidate.dest, candidate.request);

    // Dropoff, on-path: earliest segment at or after the pickup. The segment
    // at `src_pos` now starts from the freshly inserted pickup.
    let on_path = (src_pos..n).find(|&j| {
        let from = if j == src_pos {
            candidate.src
        } else {
            route[j - 1].location
        };
        candidate.dest.within_rect(from, route[j].location)
    });
    if let Some(j) = on_path {
        let tentative = splice(route, src_pos, j, src_step, dest_step);
        if load_profile_ok(world, start_load, &tentative, capacity) {
            return Some(tentative);
        }
        return None;
    }

    // Dropoff, detour: try positions in ascending detour-cost order.
    let mut options: Vec<(u32, usize)> = (src_pos..n)
        .map(|j| {
            let from = if j == src_pos {
                candidate.src
            } else {
                route[j - 1].location
            };
            (detour_cost(from, candidate.dest, route[j].location), j)
        })
        .collect();
    options.sort_by_key(|&(cost, j)| (cost, j));

    for (cost, j) in options {
        if cost > detour_max {
            break;
        }
        let tentative = splice(route, src_pos, j, src_step, dest_step);
        if !load_profile_ok(world, start_load, &tentative, capacity) {
            continue;
        }
        if deadlines_hold_after(world, now, current, &tentative, j + 1, candidate.request) {
            return Some(tentative);
        }
    }
    None
}

/// Insert the pickup at `src_pos` and the dropoff into segment `dest_seg`
/// (immediately after the pickup when the segments coincide).
fn splice(
    route: &[RouteStep],
    src_pos: usize,
    dest_seg: usize,
    src_step: RouteStep,
    dest_step: RouteStep,
) -> Vec<RouteStep> {
    let mut out = route.to_vec();
    out.insert(src_pos, src_step);
    out.insert(dest_seg + 1, dest_step);
    out
}

/// Walk the tentative route's onboard headcount and reject any point where
/// it would exceed capacity. Stops for passengers that will not board (gone
/// or already terminal) contribute nothing.
fn load_profile_ok(world: &World, start_load: u32, route: &[RouteStep], capacity: u32) -> bool {
    let mut load = start_load;
    for step in route {
        let Some(passenger) = world.get::<Passenger>(step.passenger) else {
            continue;
        };
        match step.kind {
            StopKind::Pickup => {
                if matches!(
                    passenger.state,
                    PassengerState::Waiting | PassengerState::Assigned
                ) {
                    load += passenger.num_people;
                    if load > capacity {
                        return false;
                    }
                }
            }
            StopKind::Dropoff => {
                if !matches!(
                    passenger.state,
                    PassengerState::Delivered | PassengerState::Abandoned
                ) {
                    load = load.saturating_sub(passenger.num_people);
                }
            }
        }
    }
    true
}

/// Check that every pickup after the inserted dropoff still meets its
/// deadline. Earlier stops are unaffected because the pickup lies on-path.
fn deadlines_hold_after(
    world: &World,
    now: u64,
    current: Location,
    tentative: &[RouteStep],
    dest_index: usize,
    inserted: Entity,
) -> bool {
    let offsets = arrival_offsets(current, tentative);
    for (step, offset) in tentative.iter().zip(offsets).skip(dest_index + 1) {
        if step.kind != StopKind::Pickup || step.passenger == inserted {
            continue;
        }
        let Some(passenger) = world.get::<Passenger>(step.passenger) else {
            continue;
        };
        // Stops for requests no longer assigned get cleaned up on arrival;
        // they cannot veto an insertion.
        if passenger.state != PassengerState::Assigned {
            continue;
        }
        if now + offset > passenger.latest_pickup_time() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::DispatchStrategy;
    use crate::test_helpers::{
        create_test_world, spawn_driver, spawn_driver_at, spawn_request,
    };

    fn route_of(world: &World, driver: Entity) -> Vec<(Location, StopKind)> {
        world
            .get::<Driver>(driver)
            .unwrap()
            .route
            .iter()
            .map(|s| (s.location, s.kind))
            .collect()
    }

    #[test]
    fn on_path_candidate_is_spliced_before_the_original_head() {
        let mut world = create_test_world(10, 10);
        let driver = spawn_driver_at(&mut world, Location::new(2, 0), DispatchStrategy::Queue, true);
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        let extra = spawn_request(&mut world, Location::new(2, 0), Location::new(4, 0), 1, 20);
        try_insert_enroute(&mut world, driver, 1);

        assert_eq!(
            route_of(&world, driver),
            vec![
                (Location::new(2, 0), StopKind::Pickup),
                (Location::new(4, 0), StopKind::Dropoff),
                (Location::new(5, 0), StopKind::Pickup),
                (Location::new(5, 5), StopKind::Dropoff),
            ]
        );
        assert!(!world.resource::<RequestPool>().contains(extra));
        assert_eq!(
            world.get::<Passenger>(extra).unwrap().state,
            PassengerState::Assigned
        );
    }

    #[test]
    fn off_path_dropoff_is_accepted_within_detour_budget() {
        let mut world = create_test_world(10, 10);
        let driver = spawn_driver_at(&mut world, Location::new(2, 0), DispatchStrategy::Queue, true);
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        // (2,1) is off the straight path to (5,0); detour cost 2 <= 10.
        spawn_request(&mut world, Location::new(2, 0), Location::new(2, 1), 1, 20);
        try_insert_enroute(&mut world, driver, 1);

        assert_eq!(
            route_of(&world, driver)[..3],
            [
                (Location::new(2, 0), StopKind::Pickup),
                (Location::new(2, 1), StopKind::Dropoff),
                (Location::new(5, 0), StopKind::Pickup),
            ]
        );
    }

    #[test]
    fn detour_beyond_budget_is_rejected() {
        let mut world = create_test_world(12, 12);
        let driver = spawn_driver(
            &mut world,
            Location::new(2, 0),
            DispatchStrategy::Queue,
            true,
            4,
            1, // detour_max
        );
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        // Dropoff (2,3) costs 6 extra cells; over the budget of 1.
        let extra = spawn_request(&mut world, Location::new(2, 0), Location::new(2, 3), 1, 30);
        try_insert_enroute(&mut world, driver, 1);

        assert_eq!(route_of(&world, driver).len(), 2);
        assert!(world.resource::<RequestPool>().contains(extra));
    }

    #[test]
    fn detour_that_breaks_a_later_deadline_is_rejected() {
        let mut world = create_test_world(12, 12);
        let driver = spawn_driver(
            &mut world,
            Location::new(2, 0),
            DispatchStrategy::Queue,
            true,
            4,
            2, // detour_max: allows the cheap position, forbids the fallback
        );
        // Original pickup at (5,0) with no slack at tick 1: arrival must be
        // by tick 4 and the direct path takes exactly 3 more ticks.
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 4);
        assert!(assign_head(&mut world, driver, original));

        let extra = spawn_request(&mut world, Location::new(2, 0), Location::new(2, 1), 1, 30);
        try_insert_enroute(&mut world, driver, 1);

        // Dropping at (2,1) before the original pickup costs 2 (within
        // budget) but would push that pickup to tick 1 + 6 > 4; dropping
        // after it costs 6, over the budget. No feasible position remains.
        assert_eq!(route_of(&world, driver).len(), 2);
        assert!(world.resource::<RequestPool>().contains(extra));
    }

    #[test]
    fn deadline_safe_position_later_in_the_route_is_found() {
        let mut world = create_test_world(12, 12);
        let driver = spawn_driver_at(&mut world, Location::new(2, 0), DispatchStrategy::Queue, true);
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 4);
        assert!(assign_head(&mut world, driver, original));

        // Same candidate as above but with the default detour budget of 10:
        // the planner falls through to the position after the original
        // pickup, which leaves that deadline untouched.
        spawn_request(&mut world, Location::new(2, 0), Location::new(2, 1), 1, 30);
        try_insert_enroute(&mut world, driver, 1);

        assert_eq!(
            route_of(&world, driver),
            vec![
                (Location::new(2, 0), StopKind::Pickup),
                (Location::new(5, 0), StopKind::Pickup),
                (Location::new(2, 1), StopKind::Dropoff),
                (Location::new(5, 5), StopKind::Dropoff),
            ]
        );
    }

    #[test]
    fn candidate_outside_the_search_window_is_ignored() {
        let mut world = create_test_world(10, 10);
        let driver = spawn_driver_at(&mut world, Location::new(2, 0), DispatchStrategy::Queue, true);
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        let outside = spawn_request(&mut world, Location::new(2, 4), Location::new(4, 4), 1, 30);
        try_insert_enroute(&mut world, driver, 1);

        assert_eq!(route_of(&world, driver).len(), 2);
        assert!(world.resource::<RequestPool>().contains(outside));
    }

    #[test]
    fn candidates_are_taken_in_strategy_order() {
        let mut world = create_test_world(12, 12);
        let driver = spawn_driver(
            &mut world,
            Location::new(0, 0),
            DispatchStrategy::Closest,
            true,
            1, // capacity: the two overlapping candidates compete for it
            10,
        );
        let original = spawn_request(&mut world, Location::new(9, 0), Location::new(11, 0), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        // Both candidates overlap each other; with one seat only the
        // closer-ranked one fits, and closest ranks (2,0) over (3,0).
        let farther = spawn_request(&mut world, Location::new(3, 0), Location::new(6, 0), 0, 50);
        let nearer = spawn_request(&mut world, Location::new(2, 0), Location::new(5, 0), 0, 50);
        try_insert_enroute(&mut world, driver, 0);

        let driver_ref = world.get::<Driver>(driver).unwrap();
        assert!(driver_ref.route_contains(nearer));
        assert!(!driver_ref.route_contains(farther));
        assert!(world.resource::<RequestPool>().contains(farther));
    }

    #[test]
    fn capacity_cap_blocks_extra_pickup_overlap() {
        let mut world = create_test_world(10, 10);
        let driver = spawn_driver(
            &mut world,
            Location::new(0, 0),
            DispatchStrategy::Queue,
            true,
            1, // capacity
            10,
        );
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(9, 0), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        // Overlapping ride: pickup (2,0) and dropoff (7,0) are both on-path,
        // but two riders would share the vehicle between (5,0) and (7,0).
        let extra = spawn_request(&mut world, Location::new(2, 0), Location::new(7, 0), 0, 50);
        try_insert_enroute(&mut world, driver, 0);

        assert_eq!(route_of(&world, driver).len(), 2);
        assert!(world.resource::<RequestPool>().contains(extra));
    }

    #[test]
    fn disjoint_rides_fit_a_single_seat() {
        let mut world = create_test_world(10, 10);
        let driver = spawn_driver(
            &mut world,
            Location::new(0, 0),
            DispatchStrategy::Queue,
            true,
            1,
            10,
        );
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(9, 0), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        // Dropoff (4,0) lands before the original pickup: never two onboard.
        spawn_request(&mut world, Location::new(2, 0), Location::new(4, 0), 0, 50);
        try_insert_enroute(&mut world, driver, 0);

        assert_eq!(route_of(&world, driver).len(), 4);
    }

    #[test]
    fn expired_candidate_in_window_is_not_inserted() {
        let mut world = create_test_world(10, 10);
        let driver = spawn_driver_at(&mut world, Location::new(2, 0), DispatchStrategy::Queue, true);
        let original = spawn_request(&mut world, Location::new(5, 0), Location::new(5, 5), 0, 50);
        assert!(assign_head(&mut world, driver, original));

        // Deadline (tick 2) cannot be met from (2,0) at tick 2 + 2 cells.
        let expired = spawn_request(&mut world, Location::new(4, 0), Location::new(4, 4), 0, 2);
        try_insert_enroute(&mut world, driver, 2);

        assert_eq!(route_of(&world, driver).len(), 2);
        assert!(world.resource::<RequestPool>().contains(expired));
    }

    /// Give a driver its initial two-stop route for `request`.
    fn assign_head(world: &mut World, driver: Entity, request: Entity) -> bool {
        let assigned = crate::matching::assign_from_pool(world, driver, 0);
        assigned && world.get::<Driver>(driver).unwrap().route_contains(request)
    }
}
