//! # Ecoevo
//!
//! Self-rewiring directed computation graphs.
//!
//! A small graph sits between fixed input and output nodes. Every tick it
//! is driven by an input signal, propagates activations forward, and then
//! rewrites itself: over-excited internal nodes grow a relay (bridging),
//! weights drift or revert under noise, and edges that decay to near zero
//! either flip sign or are deleted, with dead-end nodes pruned upstream.
//!
//! ## Quick Start
//!
//! ```rust
//! use ecoevo::prelude::*;
//!
//! let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
//! let totals = sim.run(100);
//!
//! let stats = sim.stats();
//! println!(
//!     "tick {}: {} nodes, {} edges, {} bridges, ‖y‖ = {:.3}",
//!     stats.tick, stats.node_count, stats.edge_count, totals.bridges, stats.output_norm
//! );
//! sim.graph().check_invariants().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`ecoevo_core`] - Graph store, parameters, input sources, errors
//! - [`ecoevo_runtime`] - Step engine, simulation driver, metrics, snapshots
//!
//! ## Key Concepts
//!
//! ### The step
//!
//! | Phase | What It Does |
//! |-------|--------------|
//! | Inject | Drive input nodes from the configured source |
//! | Propagate | One forward pass in creation order |
//! | Trigger | Pick internal nodes over threshold and out of cooldown |
//! | Bridge | Grow a two-node relay around each trigger |
//! | Update | Drift or mean-revert every weight under noise |
//! | Near-zero | Flip small edges, or delete them and prune dead ends |
//!
//! ### Protected nodes
//!
//! Input and output nodes created at genesis are never removed. Only
//! internal nodes are grown, dissolved or pruned.
//!
//! ### Reproducibility
//!
//! All randomness flows from the seeded generator the simulation owns.
//! Two simulations built from the same config evolve identically.

// Re-export all subcrates
pub use ecoevo_core as core;
pub use ecoevo_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use ecoevo::prelude::*;
/// ```
pub mod prelude {
    pub use ecoevo_runtime::prelude::*;
}
