//! Structural properties of a single step on hand-built and genesis graphs.

use ecoevo_core::prelude::*;
use ecoevo_runtime::engine::{self, StepEvents};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::FRAC_1_SQRT_2;

/// No noise, no drift, constant drive of 1.0, identity everywhere.
fn still_params(channels: usize) -> StepParams {
    StepParams {
        mu: 0.0,
        sigma: 0.0,
        p_flip: 1.0,
        bridge_threshold: f64::INFINITY,
        input_channel_count: channels,
        input_source: InputSource::Constant { value: 1.0 },
        activation: Activation::Identity,
        weight_transform: WeightTransform::Identity,
        ..StepParams::default()
    }
}

fn run_step(graph: &mut EcoGraph, tick: Tick, params: &StepParams, seed: u64) -> StepEvents {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    engine::step(graph, tick, params, &mut rng)
}

#[test]
fn genesis_three_by_two() {
    let g = EcoGraph::genesis(3, 2).unwrap();
    assert_eq!(g.node_count(), 6);
    assert_eq!(g.edge_count(), 5);

    let kinds: Vec<NodeKind> = g.nodes().map(|n| n.kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == NodeKind::Input).count(), 3);
    assert_eq!(kinds.iter().filter(|k| **k == NodeKind::Internal).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == NodeKind::Output).count(), 2);

    let hub = g.nodes().find(|n| n.kind == NodeKind::Internal).unwrap().id;
    for &input in g.inputs() {
        let edges = g.out_edges(input);
        assert_eq!(edges.len(), 1);
        let e = g.edge(edges[0]).unwrap();
        assert_eq!(e.target, hub);
        assert_eq!(e.weight, 1.0 / 3.0);
    }
    for &output in g.outputs() {
        let edges = g.in_edges(output);
        assert_eq!(edges.len(), 1);
        let e = g.edge(edges[0]).unwrap();
        assert_eq!(e.source, hub);
        assert_eq!(e.weight, 1.0);
    }
}

#[test]
fn genesis_rejects_empty_sides() {
    assert!(EcoGraph::genesis(0, 2).is_err());
    assert!(EcoGraph::genesis(3, 0).is_err());
}

#[test]
fn forward_order_is_stable_and_inputs_first() {
    let mut g = EcoGraph::genesis(3, 2).unwrap();
    let params = StepParams {
        bridge_threshold: 0.0,
        ..still_params(3)
    };
    for tick in 0..3 {
        run_step(&mut g, tick, &params, tick);
    }

    let first = g.forward_order();
    let second = g.forward_order();
    assert_eq!(first, second);

    let input_count = g.inputs().len();
    assert!(first[..input_count]
        .iter()
        .all(|id| g.kind(*id) == Some(NodeKind::Input)));
    assert!(first[input_count..]
        .iter()
        .all(|id| g.kind(*id) != Some(NodeKind::Input)));
}

#[test]
fn end_to_end_single_path() {
    let mut g = EcoGraph::genesis(1, 1).unwrap();
    run_step(&mut g, 0, &still_params(1), 0);
    assert_eq!(g.activation(g.outputs()[0]), 1.0);
}

#[test]
fn bridging_adds_relay_and_halves_inputs() {
    let mut g = EcoGraph::genesis(3, 2).unwrap();
    let hub = g.nodes().find(|n| n.kind == NodeKind::Internal).unwrap().id;
    let in_before: Vec<(EdgeId, f64)> = g
        .in_edges(hub)
        .into_iter()
        .map(|e| (e, g.weight(e).unwrap()))
        .collect();
    let out_degree = g.out_degree(hub);
    let nodes_before = g.node_count();
    let edges_before = g.edge_count();

    // Hub sees 3 · ⅓ · 1.0 = 1.0, above the threshold.
    let params = StepParams {
        bridge_threshold: 0.9,
        ..still_params(3)
    };
    let events = run_step(&mut g, 0, &params, 0);

    assert_eq!(events.triggered, vec![hub]);
    assert_eq!(events.nodes_added, 2);
    let expected_edges = 2 + in_before.len() + out_degree + 2;
    assert_eq!(events.edges_added, expected_edges);
    assert_eq!(g.node_count(), nodes_before + 2);
    assert_eq!(g.edge_count(), edges_before + expected_edges);

    for (id, weight) in &in_before {
        assert_eq!(g.weight(*id).unwrap(), weight / 2.0);
    }

    // The two new nodes are the two highest ids.
    let fresh: Vec<NodeId> = g.nodes().map(|n| n.id).filter(|id| id.0 >= 6).collect();
    let (z1, z2) = (fresh[0], fresh[1]);
    let weight_between = |s: NodeId, t: NodeId| -> Vec<f64> {
        g.out_edges(s)
            .into_iter()
            .filter_map(|e| g.edge(e))
            .filter(|e| e.target == t)
            .map(|e| e.weight)
            .collect()
    };
    assert_eq!(weight_between(z1, z2), vec![FRAC_1_SQRT_2]);
    assert_eq!(weight_between(z2, z1), vec![FRAC_1_SQRT_2]);
    assert_eq!(weight_between(z1, hub), vec![-params.omega]);
    assert_eq!(weight_between(hub, z2), vec![params.omega]);
    for &input in g.inputs() {
        assert_eq!(
            weight_between(input, z1),
            vec![FRAC_1_SQRT_2 * (1.0 / 3.0 / 2.0)]
        );
    }
    for &output in g.outputs() {
        assert_eq!(weight_between(z2, output), vec![1.0]);
    }
    assert_eq!(g.node(hub).unwrap().last_bridge_tick, Some(0));
    g.check_invariants().unwrap();
}

#[test]
fn cooldown_holds_while_over_threshold() {
    // After the first bridge the hub settles at 0.5 while its relays sit
    // near 0.354 and 0.25, so only the hub is ever over 0.4.
    let mut g = EcoGraph::genesis(1, 1).unwrap();
    let hub = g.nodes().find(|n| n.kind == NodeKind::Internal).unwrap().id;
    let params = StepParams {
        bridge_threshold: 0.4,
        cooldown_ticks: 10,
        activation: Activation::MaxMagnitude,
        ..still_params(1)
    };

    let mut history: std::collections::BTreeMap<NodeId, Vec<Tick>> = Default::default();
    for tick in 0..15 {
        let events = run_step(&mut g, tick, &params, tick);
        for id in events.triggered {
            history.entry(id).or_default().push(tick);
        }
        if (1..=9).contains(&tick) {
            assert!(g.activation(hub) > params.bridge_threshold, "tick {tick}");
        }
        g.check_invariants().unwrap();
    }

    assert_eq!(history.len(), 1);
    assert_eq!(history[&hub], vec![0, 10]);
    for (id, ticks) in &history {
        for pair in ticks.windows(2) {
            assert!(
                pair[1] - pair[0] >= params.cooldown_ticks,
                "{id} bridged at {} and {}",
                pair[0],
                pair[1]
            );
        }
    }
    assert_eq!(g.node_count(), 7);
}

#[test]
fn severed_chain_is_pruned_in_one_step() {
    // x → h → a → b → c → y1, with h → y2 keeping h alive.
    let mut g = EcoGraph::new();
    let x = g.add_node(NodeKind::Input);
    let h = g.add_node(NodeKind::Internal);
    let a = g.add_node(NodeKind::Internal);
    let b = g.add_node(NodeKind::Internal);
    let c = g.add_node(NodeKind::Internal);
    let y1 = g.add_node(NodeKind::Output);
    let y2 = g.add_node(NodeKind::Output);
    g.add_edge(x, h, 1.0).unwrap();
    g.add_edge(h, a, 1.0).unwrap();
    g.add_edge(a, b, 1.0).unwrap();
    g.add_edge(b, c, 1.0).unwrap();
    let terminal = g.add_edge(c, y1, 0.0).unwrap();
    g.add_edge(h, y2, 1.0).unwrap();

    let params = StepParams {
        p_flip: 0.0,
        ..still_params(1)
    };
    let events = run_step(&mut g, 0, &params, 11);

    assert!(!g.contains_edge(terminal));
    for id in [a, b, c] {
        assert!(!g.contains_node(id), "{id} should be pruned");
    }
    assert!(g.contains_node(h));
    assert!(g.contains_node(y1));
    assert_eq!(events.nodes_removed, 3);
    assert_eq!(events.edges_removed, 4);
    assert_eq!(g.edge_count(), 2);
    g.check_invariants().unwrap();
}

fn near_zero_fixture() -> (EcoGraph, Vec<EdgeId>) {
    let mut g = EcoGraph::genesis(2, 2).unwrap();
    let hub = g.nodes().find(|n| n.kind == NodeKind::Internal).unwrap().id;
    let outputs = g.outputs().to_vec();
    let extra = g.add_node(NodeKind::Internal);
    let mut small = vec![
        g.add_edge(hub, extra, 2e-4).unwrap(),
        g.add_edge(extra, outputs[0], -5e-4).unwrap(),
    ];
    small.push(g.add_edge(hub, outputs[1], 0.0).unwrap());
    (g, small)
}

#[test]
fn certain_flip_never_deletes() {
    let (mut g, small) = near_zero_fixture();
    let params = still_params(2);
    let before = g.edge_count();
    let events = run_step(&mut g, 0, &params, 21);

    assert_eq!(events.edges_removed, 0);
    assert_eq!(events.edges_flipped, small.len());
    assert_eq!(g.edge_count(), before);
    for id in small {
        let w = g.weight(id).unwrap();
        assert!(w != 0.0 && w.abs() < params.epsilon_zero);
    }
}

#[test]
fn impossible_flip_deletes_every_small_edge() {
    let (mut g, small) = near_zero_fixture();
    let params = StepParams {
        p_flip: 0.0,
        ..still_params(2)
    };
    let events = run_step(&mut g, 0, &params, 22);

    assert_eq!(events.edges_flipped, 0);
    for id in &small {
        assert!(!g.contains_edge(*id));
    }
    assert!(events.edges_removed >= small.len());
    g.check_invariants().unwrap();
}

#[test]
fn certain_flip_keeps_edge_count_monotone_under_noise() {
    let mut g = EcoGraph::genesis(3, 2).unwrap();
    let params = StepParams {
        sigma: 0.2,
        p_flip: 1.0,
        epsilon_zero: 0.05,
        bridge_threshold: f64::INFINITY,
        ..StepParams::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut flipped = 0;
    for tick in 0..300 {
        let before = g.edge_count();
        let events = engine::step(&mut g, tick, &params, &mut rng);
        assert_eq!(events.edges_removed, 0);
        assert!(g.edge_count() >= before);
        flipped += events.edges_flipped;
    }
    assert!(flipped > 0);
}
