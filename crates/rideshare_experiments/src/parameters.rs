//! Parameter sets for dispatch-strategy experiments.
//!
//! A [`ParameterSet`] is one simulation run; [`strategy_matrix`] expands the
//! cross product {strategy} x {multi_pass} x {seed} into runnable sets so
//! sweeps compare strategies under identical demand.

use rideshare_core::matching::DispatchStrategy;
use rideshare_core::scenario::ScenarioParams;
use serde::{Deserialize, Serialize};

/// Parameter configuration for a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSet {
    pub experiment_id: String,
    pub run_id: usize,
    pub strategy: DispatchStrategy,
    pub multi_pass: bool,
    pub seed: u64,
    pub num_drivers: u32,
    pub size: u32,
    pub rate: u64,
    /// Run length in ticks.
    pub total_steps: u64,
    pub capacity: u32,
    pub detour_max: u32,
    pub waiting_time: Option<u64>,
}

impl ParameterSet {
    pub fn scenario_params(&self) -> ScenarioParams {
        let mut params = ScenarioParams::default()
            .with_seed(self.seed)
            .with_num_drivers(self.num_drivers)
            .with_size(self.size)
            .with_strategy(self.strategy)
            .with_multi_pass(self.multi_pass)
            .with_rate(self.rate)
            .with_total_steps(self.total_steps)
            .with_capacity(self.capacity)
            .with_detour_max(self.detour_max);
        if let Some(waiting_time) = self.waiting_time {
            params = params.with_waiting_time(waiting_time);
        }
        params
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        let base = ScenarioParams::default();
        Self {
            experiment_id: "default".to_string(),
            run_id: 0,
            strategy: base.strategy,
            multi_pass: base.multi_pass,
            seed: base.seed,
            num_drivers: base.num_drivers,
            size: base.width,
            rate: base.rate,
            total_steps: 2000,
            capacity: base.capacity,
            detour_max: base.detour_max,
            waiting_time: base.waiting_time,
        }
    }
}

/// All strategies, with and without ride-sharing, for each seed.
pub fn strategy_matrix(experiment_id: &str, seeds: &[u64], total_steps: u64) -> Vec<ParameterSet> {
    let strategies = [
        DispatchStrategy::Queue,
        DispatchStrategy::Closest,
        DispatchStrategy::Waiting,
    ];
    let mut param_sets = Vec::new();
    let mut run_id = 0;
    for strategy in strategies {
        for multi_pass in [false, true] {
            for &seed in seeds {
                param_sets.push(ParameterSet {
                    experiment_id: experiment_id.to_string(),
                    run_id,
                    strategy,
                    multi_pass,
                    seed,
                    total_steps,
                    ..ParameterSet::default()
                });
                run_id += 1;
            }
        }
    }
    param_sets
}
