//! Per-tick agent behavior, one module per concern:
//!
//! - [`activation`]: shuffled once-per-tick dispatch over all live agents
//! - [`driver_step`]: assignment, arrivals, movement, enroute insertion
//! - [`passenger_step`]: deadline abandonment and two-phase retirement
//! - [`spawner`]: periodic request arrivals and secondary-id allocation

pub mod activation;
pub mod driver_step;
pub mod passenger_step;
pub mod spawner;
