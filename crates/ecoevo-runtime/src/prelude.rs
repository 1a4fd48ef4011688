//! Ecoevo Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use ecoevo_runtime::prelude::*;
//! ```

// Re-export simulation
pub use crate::simulation::{RunTotals, Simulation, SimulationConfig, SimulationStats};

// Re-export engine
pub use crate::engine::{inject_inputs, propagate, prune_sinks, step, StepEvents};

// Re-export metrics
pub use crate::metrics::{
    activation_histogram, output_norm, weight_histogram, GraphMetrics, Histogram,
};

// Re-export snapshots
pub use crate::snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot, SnapshotMetadata};

// Re-export from core
pub use ecoevo_core::prelude::*;
