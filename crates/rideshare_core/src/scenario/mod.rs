//! Scenario construction: run parameters, validation, and world building.

mod build;
mod params;

pub use build::build_scenario;
pub use params::{ScenarioError, ScenarioParams, SimulationEndTick};
