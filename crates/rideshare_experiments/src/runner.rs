//! Parallel experiment execution using rayon.
//!
//! Each parameter set gets its own world, runs to its configured length, and
//! reduces to a [`SimulationResult`]. Runs are independent and deterministic
//! per set, so the sweep parallelizes without affecting results.

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rideshare_core::runner::{run_to_end, simulation_schedule};
use rideshare_core::scenario::build_scenario;

use crate::metrics::{extract_metrics, SimulationResult};
use crate::parameters::ParameterSet;

/// Safety cap for runs without a configured length.
const MAX_TICKS: u64 = 1_000_000;

/// Run a single parameter set to completion and extract its metrics.
pub fn run_single_simulation(param_set: &ParameterSet) -> Result<SimulationResult, String> {
    let mut world = World::new();
    build_scenario(&mut world, param_set.scenario_params())
        .map_err(|error| format!("invalid parameter set {}: {error}", param_set.run_id))?;

    let mut schedule = simulation_schedule();
    run_to_end(&mut world, &mut schedule, MAX_TICKS);

    Ok(extract_metrics(&mut world, param_set))
}

/// Run all parameter sets in parallel with a progress bar. Failed runs are
/// reported on the bar and skipped.
pub fn run_parallel(param_sets: &[ParameterSet]) -> Vec<SimulationResult> {
    let progress = ProgressBar::new(param_sets.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} runs ({eta})")
            .expect("valid progress template")
            .progress_chars("#>-"),
    );

    let mut results: Vec<SimulationResult> = param_sets
        .par_iter()
        .filter_map(|param_set| {
            let result = run_single_simulation(param_set);
            progress.inc(1);
            match result {
                Ok(result) => Some(result),
                Err(error) => {
                    progress.println(error);
                    None
                }
            }
        })
        .collect();
    progress.finish_and_clear();

    // par_iter preserves order, but make the contract explicit for exports.
    results.sort_by_key(|result| result.run_id);
    results
}
