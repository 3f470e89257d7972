//! # Grid Ride-Sharing Simulation Core
//!
//! An agent-based simulation engine for an on-demand ride-hailing fleet on a
//! discrete rectangular grid.
//!
//! ## Overview
//!
//! This crate provides the core simulation engine, including:
//!
//! - **Multi-occupancy grid**: bounded 2D cell container for all agents
//! - **ECS Framework**: Entity Component System for multi-agent state management
//! - **Dispatch Strategies**: pluggable request selection (queue / closest / most urgent)
//! - **Route Planning**: per-driver stop insertion with detour and deadline checks
//! - **Telemetry**: per-tick report rows and parquet export
//!
//! ## Key Concepts
//!
//! - **Ticks**: time advances in discrete steps; drivers move one cell per tick
//! - **Random Activation**: every live agent acts once per tick in a shuffled order
//! - **Deterministic**: a single seeded RNG makes runs byte-for-byte reproducible
//! - **Ride-sharing**: drivers with `multi_pass` pick up extra passengers enroute
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy_ecs::prelude::World;
//! use rideshare_core::scenario::{build_scenario, ScenarioParams};
//! use rideshare_core::runner::{run_ticks, simulation_schedule};
//!
//! let mut world = World::new();
//! build_scenario(&mut world, ScenarioParams::default().with_seed(42)).unwrap();
//!
//! let mut schedule = simulation_schedule();
//! run_ticks(&mut world, &mut schedule, 2000);
//! ```

pub mod clock;
pub mod ecs;
pub mod grid;
pub mod matching;
pub mod pool;
pub mod portrayal;
pub mod rng;
pub mod route;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;
pub mod telemetry_export;

#[cfg(test)]
pub mod test_helpers;
