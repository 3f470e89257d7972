//! Route plans: the per-driver stop sequence and the pure helpers behind
//! insertion feasibility.
//!
//! A route is an ordered list of [`RouteStep`]s, head first. Drivers walk
//! toward the head one cell per tick; reaching it triggers a pickup or a
//! dropoff. The helpers here are pure over locations so the planner in
//! [`crate::matching`] can score tentative routes without touching the
//! world.

use bevy_ecs::prelude::Entity;

use crate::grid::Location;

/// Whether a stop serves a passenger's source or destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Pickup,
    Dropoff,
}

/// One planned stop: a cell and the passenger the stop serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteStep {
    pub location: Location,
    pub passenger: Entity,
    pub kind: StopKind,
}

impl RouteStep {
    pub fn pickup(location: Location, passenger: Entity) -> Self {
        Self {
            location,
            passenger,
            kind: StopKind::Pickup,
        }
    }

    pub fn dropoff(location: Location, passenger: Entity) -> Self {
        Self {
            location,
            passenger,
            kind: StopKind::Dropoff,
        }
    }
}

/// Extra Manhattan cells incurred by visiting `via` between `prev` and
/// `next`. Zero exactly when `via` lies inside the rectangle spanned by the
/// endpoints (the triangle inequality guarantees the subtraction is safe).
pub fn detour_cost(prev: Location, via: Location, next: Location) -> u32 {
    prev.manhattan(via) + via.manhattan(next) - prev.manhattan(next)
}

/// Cumulative Manhattan offsets from `start` to each stop of `route`, in
/// order. Offsets equal arrival ticks relative to "now" because drivers
/// cover one cell per tick.
pub fn arrival_offsets(start: Location, route: &[RouteStep]) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(route.len());
    let mut at = start;
    let mut total: u64 = 0;
    for step in route {
        total += u64::from(at.manhattan(step.location));
        offsets.push(total);
        at = step.location;
    }
    offsets
}
