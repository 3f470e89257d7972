//! Random activation: every live agent acts exactly once per tick, in a
//! fresh permutation drawn from the simulation RNG.
//!
//! The permutation is fixed at the top of the tick; agents despawned by an
//! earlier actor in the same tick are skipped when their turn comes. Agent
//! ids are collected in spawn order before shuffling so the shuffle is the
//! only source of ordering randomness.

use bevy_ecs::prelude::{Entity, With, World};
use rand::seq::SliceRandom;

use crate::ecs::{Driver, Passenger};
use crate::rng::SimRng;
use crate::systems::driver_step::driver_step;
use crate::systems::passenger_step::passenger_step;

#[derive(Debug, Clone, Copy)]
enum AgentClass {
    Driver,
    Passenger,
}

/// Tick phase 2: activate all drivers and passengers in shuffled order.
/// Destination markers are decorative and take no turn.
pub fn activate_agents(world: &mut World) {
    let mut agents: Vec<(Entity, AgentClass)> = Vec::new();
    {
        let mut drivers = world.query_filtered::<Entity, With<Driver>>();
        agents.extend(drivers.iter(world).map(|e| (e, AgentClass::Driver)));
    }
    {
        let mut passengers = world.query_filtered::<Entity, With<Passenger>>();
        agents.extend(passengers.iter(world).map(|e| (e, AgentClass::Passenger)));
    }
    agents.sort_by_key(|(entity, _)| entity.to_bits());

    {
        let mut rng = world.resource_mut::<SimRng>();
        agents.shuffle(&mut rng.0);
    }

    for (entity, class) in agents {
        if world.get_entity(entity).is_none() {
            continue;
        }
        match class {
            AgentClass::Driver => driver_step(world, entity),
            AgentClass::Passenger => passenger_step(world, entity),
        }
    }
}
