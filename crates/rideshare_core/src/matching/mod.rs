//! Dispatch and route planning: pluggable request selection plus the
//! per-driver insertion machinery.
//!
//! Two entry points, both driven from the driver's per-tick action:
//!
//! - [`assignment::assign_from_pool`]: an idle driver claims one request
//!   from the pool according to its strategy.
//! - [`insertion::try_insert_enroute`]: a moving `multi_pass` driver scans
//!   the rectangle between itself and its next stop for extra passengers
//!   and splices feasible ones into its route.

pub mod assignment;
pub mod insertion;

use serde::{Deserialize, Serialize};

use crate::ecs::Passenger;
use crate::grid::Location;

pub use assignment::assign_from_pool;
pub use insertion::try_insert_enroute;

/// How a driver chooses among unassigned requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStrategy {
    /// Oldest request first (arrival order).
    Queue = 1,
    /// Nearest pickup first (Manhattan distance from the driver).
    Closest = 2,
    /// Most urgent deadline first.
    Waiting = 3,
}

impl DispatchStrategy {
    /// Ranking key for a candidate request; lower is better. Ties are broken
    /// by pool order (callers scan candidates in arrival order and keep the
    /// first minimum).
    pub fn rank(self, driver_at: Location, passenger: &Passenger) -> u64 {
        match self {
            DispatchStrategy::Queue => passenger.request_time,
            DispatchStrategy::Closest => u64::from(driver_at.manhattan(passenger.src)),
            DispatchStrategy::Waiting => passenger.latest_pickup_time(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DispatchStrategy::Queue => "queue",
            DispatchStrategy::Closest => "closest",
            DispatchStrategy::Waiting => "waiting",
        }
    }
}
