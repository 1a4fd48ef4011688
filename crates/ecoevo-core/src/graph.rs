//! The mutable computation graph.
//!
//! Backed by petgraph's `StableDiGraph` so that removals never shift the
//! indices of surviving nodes and edges. Our own monotonic [`NodeId`] /
//! [`EdgeId`] sit on top of it in ordered maps: petgraph recycles vacant
//! slots, our ids are never reused, and iterating the maps yields creation
//! order for free.

use crate::error::{EcoError, GraphError, Result};
use crate::types::*;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::BTreeMap;

/// A node removed from the graph together with the incident edges that went with it.
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

/// Directed, weighted graph with bidirectional adjacency.
#[derive(Debug, Clone)]
pub struct EcoGraph {
    graph: StableDiGraph<Node, Edge>,
    node_index: BTreeMap<NodeId, NodeIndex>,
    edge_index: BTreeMap<EdgeId, EdgeIndex>,
    /// Input nodes in creation order; position = input channel.
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl EcoGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: BTreeMap::new(),
            edge_index: BTreeMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    /// Build the genesis graph: `m` inputs feeding one internal hub that
    /// fans out to `n` outputs.
    ///
    /// Input→hub edges carry `1/m`, hub→output edges carry `1`.
    /// Zero counts are rejected rather than clamped.
    pub fn genesis(m: usize, n: usize) -> Result<Self> {
        if m < 1 {
            return Err(EcoError::invalid_config("inputs", m, "must be at least 1"));
        }
        if n < 1 {
            return Err(EcoError::invalid_config("outputs", n, "must be at least 1"));
        }

        let mut g = Self::new();
        let inputs: Vec<NodeId> = (0..m).map(|_| g.add_node(NodeKind::Input)).collect();
        let hub = g.add_node(NodeKind::Internal);
        let outputs: Vec<NodeId> = (0..n).map(|_| g.add_node(NodeKind::Output)).collect();

        let w_in = 1.0 / m as f64;
        for input in inputs {
            g.add_edge(input, hub, w_in)?;
        }
        for output in outputs {
            g.add_edge(hub, output, 1.0)?;
        }
        Ok(g)
    }

    /// Add a node with zero activation that has never bridged.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        let idx = self.graph.add_node(Node::new(id, kind));
        self.node_index.insert(id, idx);
        match kind {
            NodeKind::Input => self.inputs.push(id),
            NodeKind::Output => self.outputs.push(id),
            NodeKind::Internal => {}
        }
        id
    }

    /// Add a directed edge. Both endpoints must exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) -> Result<EdgeId> {
        let Some(&src_idx) = self.node_index.get(&source) else {
            return Err(EcoError::node_not_found(source));
        };
        let Some(&dst_idx) = self.node_index.get(&target) else {
            return Err(EcoError::node_not_found(target));
        };

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        let idx = self.graph.add_edge(
            src_idx,
            dst_idx,
            Edge {
                id,
                source,
                target,
                weight,
            },
        );
        self.edge_index.insert(id, idx);
        Ok(id)
    }

    /// Remove an edge. Returns `None` if it was already gone.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let idx = self.edge_index.remove(&id)?;
        self.graph.remove_edge(idx)
    }

    /// Remove an internal node and every edge touching it.
    ///
    /// Returns `None` for unknown ids and for input/output nodes, which
    /// live as long as the graph does.
    pub fn remove_node(&mut self, id: NodeId) -> Option<RemovedNode> {
        let idx = *self.node_index.get(&id)?;
        if self.graph[idx].kind.is_protected() {
            return None;
        }

        let mut incident = self.out_edges(id);
        incident.extend(self.in_edges(id));
        let edges: Vec<Edge> = incident
            .into_iter()
            .filter_map(|eid| self.remove_edge(eid))
            .collect();

        self.node_index.remove(&id);
        let node = self.graph.remove_node(idx)?;
        Some(RemovedNode { node, edges })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    /// Activation of a node, 0 for unknown ids.
    pub fn activation(&self, id: NodeId) -> f64 {
        self.node(id).map(|n| n.activation).unwrap_or(0.0)
    }

    /// Set a node's activation. Returns false if the node is absent.
    pub fn set_activation(&mut self, id: NodeId, activation: f64) -> bool {
        match self.node_index.get(&id) {
            Some(&idx) => {
                self.graph[idx].activation = activation;
                true
            }
            None => false,
        }
    }

    /// Zero every activation without touching structure.
    pub fn reset_activations(&mut self) {
        for &idx in self.node_index.values() {
            self.graph[idx].activation = 0.0;
        }
    }

    /// Record that `id` bridged at `tick`.
    pub fn mark_bridged(&mut self, id: NodeId, tick: Tick) -> bool {
        match self.node_index.get(&id) {
            Some(&idx) => {
                self.graph[idx].last_bridge_tick = Some(tick);
                true
            }
            None => false,
        }
    }

    pub fn weight(&self, id: EdgeId) -> Option<f64> {
        self.edge(id).map(|e| e.weight)
    }

    /// Overwrite an edge weight. Returns false if the edge is absent.
    pub fn set_weight(&mut self, id: EdgeId, weight: f64) -> bool {
        match self.edge_index.get(&id) {
            Some(&idx) => {
                self.graph[idx].weight = weight;
                true
            }
            None => false,
        }
    }

    /// Apply `f` to every edge weight, in edge creation order.
    pub fn update_weights(&mut self, mut f: impl FnMut(f64) -> f64) {
        for &idx in self.edge_index.values() {
            let edge = &mut self.graph[idx];
            edge.weight = f(edge.weight);
        }
    }

    fn adjacent(&self, id: NodeId, dir: Direction) -> Vec<EdgeId> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut ids: Vec<EdgeId> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| e.weight().id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Incoming edge ids in creation order.
    pub fn in_edges(&self, id: NodeId) -> Vec<EdgeId> {
        self.adjacent(id, Direction::Incoming)
    }

    /// Outgoing edge ids in creation order.
    pub fn out_edges(&self, id: NodeId) -> Vec<EdgeId> {
        self.adjacent(id, Direction::Outgoing)
    }

    /// Incoming edges in creation order.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.in_edges(id)
            .into_iter()
            .filter_map(move |eid| self.edge(eid))
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    pub fn total_degree(&self, id: NodeId) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }

    fn degree(&self, id: NodeId, dir: Direction) -> usize {
        self.node_index
            .get(&id)
            .map(|&idx| self.graph.edges_directed(idx, dir).count())
            .unwrap_or(0)
    }

    /// Map from total degree `k` to the number of nodes with that degree.
    pub fn degree_histogram(&self) -> BTreeMap<usize, usize> {
        let mut hist = BTreeMap::new();
        for &id in self.node_index.keys() {
            *hist.entry(self.total_degree(id)).or_insert(0) += 1;
        }
        hist
    }

    /// Propagation order: all inputs in creation order, then every other
    /// node in creation order.
    pub fn forward_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_index.len());
        order.extend(
            self.nodes()
                .filter(|n| n.kind == NodeKind::Input)
                .map(|n| n.id),
        );
        order.extend(
            self.nodes()
                .filter(|n| n.kind != NodeKind::Input)
                .map(|n| n.id),
        );
        order
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_index.values().map(|&idx| &self.graph[idx])
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_index.values().map(|&idx| &self.graph[idx])
    }

    /// Input nodes; position `i` is input channel `i`.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// Verify the structural invariants the engine relies on.
    ///
    /// Checks that every edge's endpoints exist and differ, that the id
    /// tables agree with the backing graph in both directions, and that no
    /// input or output node has disappeared.
    pub fn check_invariants(&self) -> std::result::Result<(), GraphError> {
        if self.node_index.len() != self.graph.node_count() {
            return Err(GraphError::IndexMismatch(format!(
                "{} node ids for {} stored nodes",
                self.node_index.len(),
                self.graph.node_count()
            )));
        }
        if self.edge_index.len() != self.graph.edge_count() {
            return Err(GraphError::IndexMismatch(format!(
                "{} edge ids for {} stored edges",
                self.edge_index.len(),
                self.graph.edge_count()
            )));
        }

        for (&id, &idx) in &self.node_index {
            match self.graph.node_weight(idx) {
                Some(node) if node.id == id && id.0 < self.next_node_id => {}
                _ => {
                    return Err(GraphError::IndexMismatch(format!(
                        "node {id} does not resolve to itself"
                    )))
                }
            }
        }

        let mut out_total = 0;
        let mut in_total = 0;
        for (&id, &idx) in &self.edge_index {
            let Some(edge) = self.graph.edge_weight(idx) else {
                return Err(GraphError::IndexMismatch(format!("edge {id} has no storage")));
            };
            if edge.id != id || id.0 >= self.next_edge_id {
                return Err(GraphError::IndexMismatch(format!(
                    "edge {id} does not resolve to itself"
                )));
            }
            if edge.source == edge.target {
                return Err(GraphError::SelfLoop {
                    edge: id,
                    node: edge.source,
                });
            }
            for endpoint in [edge.source, edge.target] {
                if !self.node_index.contains_key(&endpoint) {
                    return Err(GraphError::DanglingEdge {
                        edge: id,
                        node: endpoint,
                    });
                }
            }
            let (a, b) = self
                .graph
                .edge_endpoints(idx)
                .ok_or_else(|| GraphError::IndexMismatch(format!("edge {id} has no endpoints")))?;
            if self.graph[a].id != edge.source || self.graph[b].id != edge.target {
                return Err(GraphError::IndexMismatch(format!(
                    "edge {id} endpoints disagree with adjacency"
                )));
            }
        }
        for &id in self.node_index.keys() {
            out_total += self.out_degree(id);
            in_total += self.in_degree(id);
        }
        if out_total != self.edge_index.len() || in_total != self.edge_index.len() {
            return Err(GraphError::IndexMismatch(format!(
                "adjacency totals out={out_total} in={in_total} for {} edges",
                self.edge_index.len()
            )));
        }

        for &id in self.inputs.iter().chain(&self.outputs) {
            if !self.node_index.contains_key(&id) {
                return Err(GraphError::ProtectedNodeRemoved(id));
            }
        }
        Ok(())
    }
}

impl Default for EcoGraph {
    fn default() -> Self {
        Self::new()
    }
}
