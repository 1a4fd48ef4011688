//! Ecoevo Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use ecoevo_core::prelude::*;
//! ```

pub use crate::types::{weight_sign, Edge, EdgeId, Node, NodeId, NodeKind, Tick};

pub use crate::graph::{EcoGraph, RemovedNode};

pub use crate::input::InputSource;

pub use crate::params::{Activation, StepParams, WeightTransform, WeightUpdate};

pub use crate::error::{ConfigError, EcoError, GraphError, Result};
