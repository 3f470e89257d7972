//! World building: insert the resources and spawn the initial population.

use bevy_ecs::prelude::World;
use rand::Rng;

use crate::clock::SimClock;
use crate::ecs::{Driver, Position};
use crate::grid::{Location, MultiGrid};
use crate::pool::RequestPool;
use crate::rng::SimRng;
use crate::scenario::params::{ScenarioError, ScenarioParams, SimulationEndTick};
use crate::systems::spawner::{spawn_passenger, ArrivalSpawner};
use crate::telemetry::{SimReports, SimTelemetry};

/// Build a runnable world from validated parameters.
///
/// Resources first, then the initial population: one waiting request per
/// driver, then the drivers themselves, all at cells drawn from the run's
/// single RNG in that order.
pub fn build_scenario(world: &mut World, params: ScenarioParams) -> Result<(), ScenarioError> {
    params.validate()?;

    world.insert_resource(SimClock::new());
    world.insert_resource(SimRng::seed_from(params.seed));
    world.insert_resource(MultiGrid::new(params.width, params.height));
    world.insert_resource(RequestPool::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(SimReports::default());
    world.insert_resource(ArrivalSpawner::new(
        params.rate,
        params.waiting_time,
        params.total_steps,
        params.num_drivers,
    ));
    if params.total_steps > 0 {
        world.insert_resource(SimulationEndTick(params.total_steps));
    }

    for _ in 0..params.num_drivers {
        spawn_passenger(world, 0);
    }

    for _ in 0..params.num_drivers {
        let loc = {
            let mut rng = world.resource_mut::<SimRng>();
            Location::new(
                rng.0.gen_range(0..params.width),
                rng.0.gen_range(0..params.height),
            )
        };
        let driver = world
            .spawn((
                Driver::new(
                    params.capacity,
                    params.strategy,
                    params.multi_pass,
                    params.detour_max,
                ),
                Position(loc),
            ))
            .id();
        world.resource_mut::<MultiGrid>().place(driver, loc);
    }

    Ok(())
}
