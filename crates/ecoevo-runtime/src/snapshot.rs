//! Serializable graph snapshots for renderers and exporters.

use ecoevo_core::graph::EcoGraph;
use ecoevo_core::types::*;
use serde::{Deserialize, Serialize};

/// A complete serializable snapshot of the graph at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub metadata: SnapshotMetadata,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

/// Snapshot metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub snapshot_id: String,
    pub tick: Tick,
    pub node_count: usize,
    pub edge_count: usize,
}

/// A serializable snapshot of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: NodeKind,
    pub activation: f64,
}

/// A serializable snapshot of a graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl GraphSnapshot {
    /// Capture nodes and edges in creation order.
    pub fn capture(graph: &EcoGraph, tick: Tick) -> Self {
        let nodes: Vec<NodeSnapshot> = graph
            .nodes()
            .map(|n| NodeSnapshot {
                id: n.id,
                kind: n.kind,
                activation: n.activation,
            })
            .collect();
        let edges: Vec<EdgeSnapshot> = graph
            .edges()
            .map(|e| EdgeSnapshot {
                id: e.id,
                source: e.source,
                target: e.target,
                weight: e.weight,
            })
            .collect();

        Self {
            metadata: SnapshotMetadata {
                snapshot_id: uuid::Uuid::new_v4().to_string(),
                tick,
                node_count: nodes.len(),
                edge_count: edges.len(),
            },
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
