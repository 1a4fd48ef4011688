//! The step engine: one discrete tick of graph evolution.
//!
//! Each tick runs these phases in a fixed order:
//! 1. Input injection from the configured source
//! 2. Forward propagation in forward order
//! 3. Bridging trigger on over-threshold internal nodes
//! 4. Bridging action (structural growth)
//! 5. Stochastic weight update
//! 6. Near-zero handling: sign flip, or deletion with rewiring and
//!    sink pruning
//!
//! Internal nodes left without outgoing edges are removed by the cascades
//! in the last phase rather than by a separate sweep.
//!
//! Reordering the phases changes the simulation. Nodes read activations
//! computed earlier in the same pass, so propagation depends on forward
//! order, not on a topological sort.

use crate::sampling::{random_sign, standard_normal, uniform_open};
use ecoevo_core::graph::EcoGraph;
use ecoevo_core::params::{Activation, StepParams, WeightTransform, WeightUpdate};
use ecoevo_core::types::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::{debug, trace};

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepEvents {
    pub tick: Tick,
    /// Nodes that bridged this tick, in creation order.
    pub triggered: Vec<NodeId>,
    pub nodes_added: usize,
    pub edges_added: usize,
    /// Near-zero edges that kept their place with a flipped sign.
    pub edges_flipped: usize,
    /// Edges copied forward when a pure-source node was dissolved.
    pub edges_rewired: usize,
    /// Every edge removed in the near-zero phase, including those taken
    /// down with pruned nodes.
    pub edges_removed: usize,
    pub nodes_removed: usize,
}

impl StepEvents {
    pub fn is_quiet(&self) -> bool {
        self.triggered.is_empty() && self.edges_removed == 0 && self.nodes_removed == 0
    }
}

/// Run one tick on `graph`.
///
/// `params` is expected to have passed [`StepParams::validate`]. All
/// randomness comes from `rng`, so a seeded generator gives a
/// reproducible run.
pub fn step<R: Rng>(
    graph: &mut EcoGraph,
    tick: Tick,
    params: &StepParams,
    rng: &mut R,
) -> StepEvents {
    let mut events = StepEvents {
        tick,
        ..Default::default()
    };

    inject_inputs(graph, tick, params);
    propagate(graph, params.activation, params.weight_transform);

    for z0 in bridging_candidates(graph, tick, params) {
        bridge(graph, z0, tick, params.omega, &mut events);
    }

    update_weights(graph, params, rng);
    handle_near_zero(graph, params, rng, &mut events);

    if !events.is_quiet() {
        debug!(
            tick,
            bridged = events.triggered.len(),
            edges_removed = events.edges_removed,
            nodes_removed = events.nodes_removed,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "step complete"
        );
    }
    events
}

/// Phase 1: drive each input channel from the configured source.
pub fn inject_inputs(graph: &mut EcoGraph, tick: Tick, params: &StepParams) {
    let inputs: Vec<NodeId> = graph
        .inputs()
        .iter()
        .take(params.input_channel_count)
        .copied()
        .collect();
    for (channel, id) in inputs.into_iter().enumerate() {
        graph.set_activation(id, params.input_source.sample(channel, tick));
    }
}

/// Phase 2: one pass over non-input nodes in forward order.
///
/// Contributions are read in edge creation order, so a MaxMagnitude tie
/// keeps the earliest edge. Nodes without incoming edges settle at 0.
pub fn propagate(graph: &mut EcoGraph, activation: Activation, transform: WeightTransform) {
    for id in graph.forward_order() {
        if graph.kind(id) == Some(NodeKind::Input) {
            continue;
        }

        let contributions = graph
            .incoming(id)
            .map(|e| transform.apply(e.weight) * graph.activation(e.source));

        let value = match activation {
            Activation::MaxMagnitude => contributions
                .fold(None, |best: Option<f64>, c| match best {
                    Some(b) if b.abs() >= c.abs() => Some(b),
                    _ => Some(c),
                })
                .unwrap_or(0.0),
            f => {
                let (z, count) = contributions.fold((0.0, 0usize), |(z, n), c| (z + c, n + 1));
                if count == 0 {
                    0.0
                } else {
                    f.apply(z)
                }
            }
        };
        graph.set_activation(id, value);
    }
}

/// Phase 3: internal nodes over threshold whose cooldown has elapsed.
fn bridging_candidates(graph: &EcoGraph, tick: Tick, params: &StepParams) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| n.kind == NodeKind::Internal)
        .filter(|n| n.activation.abs() > params.bridge_threshold)
        .filter(|n| n.cooled_down(tick, params.cooldown_ticks))
        .map(|n| n.id)
        .collect()
}

/// Phase 4: grow a relay around `z0`.
///
/// Spawns an upstream node `z1` and a downstream node `z2` joined in a
/// 2-cycle. Every input of `z0` is halved and mirrored onto `z1`; every
/// output of `z0` is duplicated from `z2`. Two weak feedback edges tie the
/// relay back to `z0`.
fn bridge(graph: &mut EcoGraph, z0: NodeId, tick: Tick, omega: f64, events: &mut StepEvents) {
    if !graph.mark_bridged(z0, tick) {
        return;
    }
    let incoming = graph.in_edges(z0);
    let outgoing = graph.out_edges(z0);

    let z1 = graph.add_node(NodeKind::Internal);
    let z2 = graph.add_node(NodeKind::Internal);
    events.nodes_added += 2;

    link(graph, z1, z2, FRAC_1_SQRT_2, events);
    link(graph, z2, z1, FRAC_1_SQRT_2, events);

    for eid in &incoming {
        let Some(edge) = graph.edge(*eid).cloned() else {
            continue;
        };
        let halved = edge.weight / 2.0;
        graph.set_weight(*eid, halved);
        link(graph, edge.source, z1, FRAC_1_SQRT_2 * halved, events);
    }
    for eid in &outgoing {
        let Some(edge) = graph.edge(*eid).cloned() else {
            continue;
        };
        link(graph, z2, edge.target, edge.weight, events);
    }

    link(graph, z1, z0, -omega, events);
    link(graph, z0, z2, omega, events);

    debug!(
        tick,
        node = %z0,
        %z1,
        %z2,
        fan_in = incoming.len(),
        fan_out = outgoing.len(),
        "bridged"
    );
    events.triggered.push(z0);
}

/// Add an edge between nodes the engine already holds.
fn link(graph: &mut EcoGraph, source: NodeId, target: NodeId, weight: f64, events: &mut StepEvents) {
    if graph.add_edge(source, target, weight).is_ok() {
        events.edges_added += 1;
    }
}

/// Phase 5: perturb every edge weight.
fn update_weights<R: Rng>(graph: &mut EcoGraph, params: &StepParams, rng: &mut R) {
    let sigma = params.sigma;
    match params.weight_update {
        WeightUpdate::Drift => {
            let mu = params.mu;
            graph.update_weights(|w| {
                w + sigma * standard_normal(rng) + mu * weight_sign(w).unwrap_or(0.0)
            });
        }
        WeightUpdate::MeanReverting { target, gamma } => {
            let a = (-gamma).exp();
            let b = sigma * ((1.0 - a * a) / (2.0 * gamma)).sqrt();
            let magnitude = target.abs();
            graph.update_weights(|w| {
                let sign = weight_sign(w).unwrap_or_else(|| random_sign(rng));
                let t = sign * magnitude;
                t + a * (w - t) + b * standard_normal(rng)
            });
        }
    }
}

/// Phase 6: flip or delete every edge that decayed below `epsilon_zero`.
///
/// Candidates are fixed before anything changes. A candidate already
/// taken down by an earlier cascade in the same tick is skipped.
fn handle_near_zero<R: Rng>(
    graph: &mut EcoGraph,
    params: &StepParams,
    rng: &mut R,
    events: &mut StepEvents,
) {
    let eps = params.epsilon_zero;
    let candidates: Vec<EdgeId> = graph
        .edges()
        .filter(|e| e.weight.abs() < eps)
        .map(|e| e.id)
        .collect();

    for id in candidates {
        let Some(edge) = graph.edge(id).cloned() else {
            continue;
        };

        if rng.random::<f64>() < params.p_flip {
            let sign = match weight_sign(edge.weight) {
                Some(s) => -s,
                None => random_sign(rng),
            };
            graph.set_weight(id, sign * uniform_open(rng, eps));
            events.edges_flipped += 1;
            continue;
        }

        if graph.remove_edge(id).is_none() {
            continue;
        }
        events.edges_removed += 1;

        let source_kind = graph.kind(edge.source);
        let target_kind = graph.kind(edge.target);
        match (source_kind, target_kind) {
            (Some(NodeKind::Internal), Some(NodeKind::Internal)) => {
                dissolve_or_prune(graph, &edge, eps, rng, events);
            }
            (Some(NodeKind::Internal), _) => {
                prune_sinks(graph, edge.source, events);
            }
            _ => {}
        }
    }
}

/// Structural cleanup after an internal→internal edge `z1→z2` is deleted.
///
/// If `z2` can no longer receive anything but still feeds others, its
/// outputs are copied onto `z1` at `epsilon_zero` scale (signed by the
/// deleted weight) and `z2` is dissolved. Otherwise `z1` may have become a
/// dead end and is handed to the sink-pruning cascade.
fn dissolve_or_prune<R: Rng>(
    graph: &mut EcoGraph,
    deleted: &Edge,
    eps: f64,
    rng: &mut R,
    events: &mut StepEvents,
) {
    let (z1, z2) = (deleted.source, deleted.target);
    if z1 == z2 || graph.in_degree(z2) != 0 || graph.out_degree(z2) == 0 {
        prune_sinks(graph, z1, events);
        return;
    }

    let sign = weight_sign(deleted.weight).unwrap_or_else(|| random_sign(rng));
    for eid in graph.out_edges(z2) {
        let Some(out) = graph.edge(eid).cloned() else {
            continue;
        };
        // Copying z2→z1 forward would loop z1 onto itself.
        if out.target == z1 {
            continue;
        }
        if graph
            .add_edge(z1, out.target, eps * out.weight * sign)
            .is_ok()
        {
            events.edges_added += 1;
            events.edges_rewired += 1;
        }
    }

    if let Some(removed) = graph.remove_node(z2) {
        trace!(node = %z2, into = %z1, edges = removed.edges.len(), "dissolved pure source");
        events.nodes_removed += 1;
        events.edges_removed += removed.edges.len();
    }
    prune_sinks(graph, z1, events);
}

/// Remove internal nodes with no outgoing edges, walking upstream.
///
/// Each removed node enqueues the predecessors that fed it, since they
/// may just have lost their last outgoing edge. Every node id is examined
/// at most once, so a predecessor reached while it still had another live
/// successor is not looked at again when that successor is pruned later in
/// the same cascade. It can be left as an internal node with no outgoing
/// edges. Returns the number of nodes removed.
pub fn prune_sinks(graph: &mut EcoGraph, start: NodeId, events: &mut StepEvents) -> usize {
    let mut queue = VecDeque::from([start]);
    let mut visited = HashSet::new();
    let mut pruned = 0;

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        if graph.kind(id) != Some(NodeKind::Internal) || graph.out_degree(id) > 0 {
            continue;
        }
        let Some(removed) = graph.remove_node(id) else {
            continue;
        };
        trace!(node = %id, edges = removed.edges.len(), "pruned sink");
        pruned += 1;
        events.nodes_removed += 1;
        events.edges_removed += removed.edges.len();

        for edge in &removed.edges {
            if edge.target == id && edge.source != id && !visited.contains(&edge.source) {
                queue.push_back(edge.source);
            }
        }
    }
    pruned
}
