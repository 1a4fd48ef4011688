//! Error types for ecoevo operations.
//!
//! Configuration problems are rejected before genesis; the step engine
//! itself never fails on a well-formed graph.

use crate::types::{EdgeId, NodeId};
use thiserror::Error;

/// Result type for ecoevo operations.
pub type Result<T> = std::result::Result<T, EcoError>;

/// Errors that can occur while building or driving a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EcoError {
    /// Graph-related errors.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Graph-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An edge was requested between nodes that do not exist.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    /// An edge endpoint references a node that is no longer present.
    #[error("Edge {edge} references missing node {node}")]
    DanglingEdge { edge: EdgeId, node: NodeId },
    /// An edge starts and ends at the same node.
    #[error("Edge {edge} loops on node {node}")]
    SelfLoop { edge: EdgeId, node: NodeId },
    /// The id tables disagree with the backing graph.
    #[error("Index out of sync: {0}")]
    IndexMismatch(String),
    /// A genesis input or output node has been removed.
    #[error("Protected node removed: {0}")]
    ProtectedNodeRemoved(NodeId),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
    /// Parameter bundle does not match the graph it drives.
    #[error("Input channel count {params} does not match graph input count {graph}")]
    ChannelMismatch { params: usize, graph: usize },
}

// Convenience constructors
impl EcoError {
    pub fn node_not_found(id: NodeId) -> Self {
        EcoError::Graph(GraphError::NodeNotFound(id))
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        EcoError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        EcoError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wraps_inner_error() {
        let err = EcoError::invalid_config("inputs", 0, "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Config error: Invalid value for inputs: 0 (must be at least 1)"
        );
    }

    #[test]
    fn graph_error_converts() {
        let err: EcoError = GraphError::NodeNotFound(NodeId(7)).into();
        assert_eq!(err, EcoError::node_not_found(NodeId(7)));
        assert_eq!(err.to_string(), "Graph error: Node not found: n7");
    }
}
