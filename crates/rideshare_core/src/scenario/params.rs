//! Run parameters and their validation.

use std::error::Error;
use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::matching::DispatchStrategy;

/// Hard stop for the run, in ticks. Inserted when `total_steps` is set;
/// absent means the simulation runs until externally stopped.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTick(pub u64);

/// Parameters for building a simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Fleet size. The initial request population matches it.
    pub num_drivers: u32,
    pub width: u32,
    pub height: u32,
    /// Enable ride-sharing (enroute insertion).
    pub multi_pass: bool,
    pub seed: u64,
    pub strategy: DispatchStrategy,
    /// Base waiting budget; `None` samples from the default range [10, 40].
    pub waiting_time: Option<u64>,
    /// Ticks between request arrivals.
    pub rate: u64,
    /// Run length in ticks; 0 means unbounded (and disables secondary ids).
    pub total_steps: u64,
    /// Max simultaneous onboard headcount per vehicle.
    pub capacity: u32,
    /// Max extra Manhattan cells accepted per enroute insertion.
    pub detour_max: u32,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_drivers: 5,
            width: 10,
            height: 10,
            multi_pass: false,
            seed: 125,
            strategy: DispatchStrategy::Closest,
            waiting_time: None,
            rate: 5,
            total_steps: 0,
            capacity: 4,
            detour_max: 10,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Square grid of the given extent.
    pub fn with_size(mut self, size: u32) -> Self {
        self.width = size;
        self.height = size;
        self
    }

    pub fn with_num_drivers(mut self, num_drivers: u32) -> Self {
        self.num_drivers = num_drivers;
        self
    }

    pub fn with_strategy(mut self, strategy: DispatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_multi_pass(mut self, multi_pass: bool) -> Self {
        self.multi_pass = multi_pass;
        self
    }

    pub fn with_waiting_time(mut self, waiting_time: u64) -> Self {
        self.waiting_time = Some(waiting_time);
        self
    }

    pub fn with_rate(mut self, rate: u64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_total_steps(mut self, total_steps: u64) -> Self {
        self.total_steps = total_steps;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_detour_max(mut self, detour_max: u32) -> Self {
        self.detour_max = detour_max;
        self
    }

    /// Reject configurations the simulation cannot run on.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        // Destination sampling redraws until dest != src, so a one-cell grid
        // would never terminate.
        if self.width == 0 || self.height == 0 || self.width as u64 * (self.height as u64) < 2 {
            return Err(ScenarioError::InvalidGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.num_drivers == 0 {
            return Err(ScenarioError::InvalidFleet(self.num_drivers));
        }
        if self.rate == 0 {
            return Err(ScenarioError::InvalidRate(self.rate));
        }
        if self.capacity == 0 {
            return Err(ScenarioError::InvalidCapacity(self.capacity));
        }
        if self.waiting_time == Some(0) {
            return Err(ScenarioError::InvalidWaitingTime(0));
        }
        Ok(())
    }
}

/// Rejected configuration. Fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioError {
    InvalidGrid { width: u32, height: u32 },
    InvalidFleet(u32),
    InvalidRate(u64),
    InvalidCapacity(u32),
    InvalidWaitingTime(u64),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::InvalidGrid { width, height } => {
                write!(f, "grid {width}x{height} needs at least two cells")
            }
            ScenarioError::InvalidFleet(n) => write!(f, "fleet size must be positive, got {n}"),
            ScenarioError::InvalidRate(r) => write!(f, "arrival rate must be positive, got {r}"),
            ScenarioError::InvalidCapacity(c) => {
                write!(f, "vehicle capacity must be positive, got {c}")
            }
            ScenarioError::InvalidWaitingTime(w) => {
                write!(f, "waiting time must be positive, got {w}")
            }
        }
    }
}

impl Error for ScenarioError {}
