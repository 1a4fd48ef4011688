//! # Ecoevo Runtime
//!
//! The step engine and the simulation driver.
//!
//! The engine advances a graph by one tick: inject inputs, propagate,
//! bridge over-excited nodes, perturb weights, then flip or delete edges
//! that decayed to near zero. The simulation wraps a graph with its
//! parameters, a seeded generator and the tick counter, and records the
//! output norm as it goes.

pub mod engine;
pub mod metrics;
pub mod prelude;
pub mod sampling;
pub mod simulation;
pub mod snapshot;
