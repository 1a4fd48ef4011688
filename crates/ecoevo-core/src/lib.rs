//! # Ecoevo Core
//!
//! Shared types and the graph store for the ecoevo simulation.
//!
//! The simulation grows and rewires a small directed computation graph
//! between fixed input and output nodes. This crate holds the pieces the
//! step engine builds on:
//!
//! - **graph** - nodes, edges, bidirectional adjacency, monotonic ids
//! - **params** - the per-step parameter bundle and its variant selectors
//! - **input** - stateless input signal sources
//! - **error** - configuration and referential errors
//!
//! ## Quick Start
//!
//! ```rust
//! use ecoevo_core::prelude::*;
//!
//! let graph = EcoGraph::genesis(3, 2).unwrap();
//! assert_eq!(graph.node_count(), 6);
//! assert_eq!(graph.edge_count(), 5);
//! ```

pub mod error;
pub mod graph;
pub mod input;
pub mod params;
pub mod prelude;
pub mod types;
