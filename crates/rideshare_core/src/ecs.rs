//! Entity Component System: components and state enums for passengers,
//! drivers, and destination markers.
//!
//! This module defines the core data structures used in the simulation:
//!
//! - **Components**: `Passenger`, `Driver`, `DestMarker`, `Position`
//! - **State Enums**: `PassengerState`, `DriverState`
//!
//! Agents are entities carrying exactly one of the agent components; the
//! scheduler dispatches on which one is present. Cross references between
//! agents (route stops, manifests, marker backlinks) are plain `Entity` ids
//! resolved against the world, never owning references.

use bevy_ecs::prelude::{Component, Entity};

use crate::grid::Location;
use crate::matching::DispatchStrategy;
use crate::route::RouteStep;

/// Passenger request lifecycle. `Delivered` and `Abandoned` are terminal;
/// a terminal passenger is observed by one more report snapshot and then
/// leaves the live agent set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerState {
    /// In the request pool, standing on the grid at `src`.
    Waiting,
    /// Claimed by a driver's route; still on the grid awaiting pickup.
    Assigned,
    /// Picked up; riding in a vehicle, off the grid.
    Onboard,
    /// Dropped off at `dest`.
    Delivered,
    /// Deadline elapsed before pickup; removed from pool and grid.
    Abandoned,
}

/// A passenger request: where from, where to, and how long they will wait.
#[derive(Debug, Clone, Component)]
pub struct Passenger {
    pub src: Location,
    pub dest: Location,
    /// Party size boarding together. Defaults to 1.
    pub num_people: u32,
    /// Tick at which the request entered the pool.
    pub request_time: u64,
    /// Ticks the passenger is willing to wait for pickup.
    pub waiting_budget: u64,
    pub pickup_time: Option<u64>,
    pub dropoff_time: Option<u64>,
    /// Tick at which the passenger gave up (deadline elapsed before pickup).
    pub abandoned_time: Option<u64>,
    pub state: PassengerState,
    /// Optional bounded tag assigned at spawn when the run has a known
    /// length; 0 when disabled or exhausted. Not semantically load-bearing.
    pub secondary_id: u64,
}

impl Passenger {
    /// Latest tick at which pickup is still acceptable.
    pub fn latest_pickup_time(&self) -> u64 {
        self.request_time + self.waiting_budget
    }

    /// Tick at which the passenger reached a terminal state, if any.
    pub fn retired_at(&self) -> Option<u64> {
        match self.state {
            PassengerState::Delivered => self.dropoff_time,
            PassengerState::Abandoned => self.abandoned_time,
            _ => None,
        }
    }
}

/// Driver activity, derived from the route: an empty route means idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    EnRoute,
}

/// A fleet vehicle: current plan, onboard manifest, and dispatch behavior.
#[derive(Debug, Clone, Component)]
pub struct Driver {
    /// Maximum simultaneous onboard headcount.
    pub capacity: u32,
    /// Passengers currently riding, in pickup order.
    pub manifest: Vec<Entity>,
    /// Planned stops, head first. For every passenger in the route but not
    /// in the manifest, the pickup stop precedes the dropoff stop.
    pub route: Vec<RouteStep>,
    pub strategy: DispatchStrategy,
    /// Enables enroute insertion (ride-sharing) after each move.
    pub multi_pass: bool,
    /// Maximum extra Manhattan cells accepted per enroute insertion.
    pub detour_max: u32,
    pub steps_moved: u64,
    pub idle_ticks: u64,
}

impl Driver {
    pub fn new(
        capacity: u32,
        strategy: DispatchStrategy,
        multi_pass: bool,
        detour_max: u32,
    ) -> Self {
        Self {
            capacity,
            manifest: Vec::new(),
            route: Vec::new(),
            strategy,
            multi_pass,
            detour_max,
            steps_moved: 0,
            idle_ticks: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        if self.route.is_empty() {
            DriverState::Idle
        } else {
            DriverState::EnRoute
        }
    }

    /// Whether `passenger` appears anywhere in the planned route.
    pub fn route_contains(&self, passenger: Entity) -> bool {
        self.route.iter().any(|step| step.passenger == passenger)
    }
}

/// Decorative marker standing on a riding passenger's destination cell.
/// Placed at pickup, removed at dropoff; not part of core semantics.
#[derive(Debug, Clone, Copy, Component)]
pub struct DestMarker {
    pub passenger: Entity,
}

/// Grid cell an agent currently occupies. Mirrors the `MultiGrid` entry for
/// the entity; grid mutations keep the two in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub Location);

/// Which agent component an entity carries. Renderers and reports key off
/// these labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Driver,
    Passenger,
    DestMarker,
}

impl AgentKind {
    pub fn label(self) -> &'static str {
        match self {
            AgentKind::Driver => "Driver",
            AgentKind::Passenger => "Passenger",
            AgentKind::DestMarker => "DestMarker",
        }
    }
}
