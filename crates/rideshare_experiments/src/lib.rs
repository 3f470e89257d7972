//! # Ride-Share Experiments
//!
//! Strategy-comparison harness for the grid ride-sharing simulator: define a
//! matrix of parameter sets, run them in parallel, extract per-run
//! aggregates, and export the results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rideshare_experiments::parameters::strategy_matrix;
//! use rideshare_experiments::runner::run_parallel;
//! use rideshare_experiments::export::export_to_csv;
//!
//! let param_sets = strategy_matrix("dispatch-comparison", &[1, 2, 3], 2000);
//! let results = run_parallel(&param_sets);
//! export_to_csv(&results, "results.csv").unwrap();
//! ```

pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;
