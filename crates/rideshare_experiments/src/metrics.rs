//! Metrics extraction from completed simulation runs.
//!
//! Aggregates the core's telemetry records into one flat row per run:
//! delivery counts, waiting/riding time statistics, and fleet utilization.

use bevy_ecs::prelude::World;
use rideshare_core::clock::SimClock;
use rideshare_core::ecs::Driver;
use rideshare_core::telemetry::SimTelemetry;
use serde::Serialize;

use crate::parameters::ParameterSet;

/// Aggregated metrics from a single simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub experiment_id: String,
    pub run_id: u64,
    pub strategy: String,
    pub multi_pass: bool,
    pub seed: u64,
    /// Requests spawned over the whole run, initial population included.
    pub requests_spawned: u64,
    pub delivered: u64,
    pub abandoned: u64,
    /// Delivered / (delivered + abandoned); 1.0 when nothing resolved.
    pub delivery_rate: f64,
    /// Ticks from request to pickup, over delivered requests.
    pub avg_wait_ticks: f64,
    pub median_wait_ticks: f64,
    pub p90_wait_ticks: f64,
    /// Ticks from pickup to dropoff, over delivered requests.
    pub avg_ride_ticks: f64,
    pub total_steps_moved: u64,
    pub total_idle_ticks: u64,
    /// Share of fleet tick-slots spent idle.
    pub fleet_idle_share: f64,
}

/// Calculate (average, median, p90) of a sample.
fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
    let median = sorted[sorted.len() / 2] as f64;
    let p90_index = ((sorted.len() as f64) * 0.9) as usize;
    let p90 = sorted[p90_index.min(sorted.len() - 1)] as f64;
    (avg, median, p90)
}

/// Extract a [`SimulationResult`] from a finished world.
pub fn extract_metrics(world: &mut World, param_set: &ParameterSet) -> SimulationResult {
    let ticks = world.resource::<SimClock>().now();

    let (requests_spawned, delivered, abandoned, waits, rides) = {
        let telemetry = world.resource::<SimTelemetry>();
        let waits: Vec<u64> = telemetry
            .completed
            .iter()
            .map(|r| r.pickup_time - r.request_time)
            .collect();
        let rides: Vec<u64> = telemetry
            .completed
            .iter()
            .map(|r| r.dropoff_time - r.pickup_time)
            .collect();
        (
            telemetry.requests_spawned,
            telemetry.delivered_total,
            telemetry.abandoned_total,
            waits,
            rides,
        )
    };

    let (mut total_steps_moved, mut total_idle_ticks, mut fleet_size) = (0u64, 0u64, 0u64);
    let mut drivers = world.query::<&Driver>();
    for driver in drivers.iter(world) {
        total_steps_moved += driver.steps_moved;
        total_idle_ticks += driver.idle_ticks;
        fleet_size += 1;
    }

    let resolved = delivered + abandoned;
    let delivery_rate = if resolved == 0 {
        1.0
    } else {
        delivered as f64 / resolved as f64
    };
    let fleet_idle_share = if fleet_size == 0 || ticks == 0 {
        0.0
    } else {
        total_idle_ticks as f64 / (fleet_size * ticks) as f64
    };

    let (avg_wait_ticks, median_wait_ticks, p90_wait_ticks) = calculate_stats(&waits);
    let (avg_ride_ticks, _, _) = calculate_stats(&rides);

    SimulationResult {
        experiment_id: param_set.experiment_id.clone(),
        run_id: param_set.run_id as u64,
        strategy: param_set.strategy.label().to_string(),
        multi_pass: param_set.multi_pass,
        seed: param_set.seed,
        requests_spawned,
        delivered,
        abandoned,
        delivery_rate,
        avg_wait_ticks,
        median_wait_ticks,
        p90_wait_ticks,
        avg_ride_ticks,
        total_steps_moved,
        total_idle_ticks,
        fleet_idle_share,
    }
}
