//! The simulation PRNG: one seeded generator for the whole run.
//!
//! Every random draw (activation shuffles, spawn cells, destinations,
//! waiting budgets) comes from this single resource, so a run is exactly
//! reproducible from `(seed, params)`.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded RNG resource. All randomness in the simulation flows through it.
#[derive(Debug, Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seed_from(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}
