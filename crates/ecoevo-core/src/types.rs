//! Shared types used across the ecoevo crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete simulation time.
pub type Tick = u64;

/// Identifier for a node in the computation graph.
///
/// Ids are handed out monotonically by the graph store and never reused,
/// so ordering by id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifier for a directed edge. Same lifetime guarantees as [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Role of a node. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Driven by an input channel; never computed, never removed.
    Input,
    /// Hub or bridge-spawned relay; subject to pruning.
    Internal,
    /// Readout node; never removed.
    Output,
}

impl NodeKind {
    /// Input and output nodes survive for the lifetime of the graph.
    pub fn is_protected(self) -> bool {
        !matches!(self, NodeKind::Internal)
    }
}

/// A node in the computation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Last computed activation.
    pub activation: f64,
    /// Tick of the most recent bridging event, `None` if it never bridged.
    pub last_bridge_tick: Option<Tick>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            activation: 0.0,
            last_bridge_tick: None,
        }
    }

    /// Whether enough ticks have elapsed since the last bridge.
    pub fn cooled_down(&self, tick: Tick, cooldown_ticks: u64) -> bool {
        match self.last_bridge_tick {
            None => true,
            Some(last) => tick.saturating_sub(last) >= cooldown_ticks,
        }
    }
}

/// A weighted directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

/// Sign of a weight, `None` when it is exactly zero.
///
/// `f64::signum` maps `0.0` to `1.0`, which is not what the decay rules want.
pub fn weight_sign(w: f64) -> Option<f64> {
    if w > 0.0 {
        Some(1.0)
    } else if w < 0.0 {
        Some(-1.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_bridged_node_is_always_cooled_down() {
        let node = Node::new(NodeId(0), NodeKind::Internal);
        assert!(node.cooled_down(0, 10));
    }

    #[test]
    fn cooldown_counts_elapsed_ticks() {
        let mut node = Node::new(NodeId(0), NodeKind::Internal);
        node.last_bridge_tick = Some(5);
        assert!(!node.cooled_down(14, 10));
        assert!(node.cooled_down(15, 10));
    }

    #[test]
    fn zero_weight_has_no_sign() {
        assert_eq!(weight_sign(0.0), None);
        assert_eq!(weight_sign(-0.0), None);
        assert_eq!(weight_sign(0.3), Some(1.0));
        assert_eq!(weight_sign(-2.0), Some(-1.0));
    }

    #[test]
    fn only_internal_nodes_are_unprotected() {
        assert!(NodeKind::Input.is_protected());
        assert!(NodeKind::Output.is_protected());
        assert!(!NodeKind::Internal.is_protected());
    }
}
