//! Read-only measurements of graph state.
//!
//! - Output norm: L2 norm of the output activations
//! - Distributions: degree, activation and edge-weight histograms
//! - Structure: counts by node kind and weight summary

use ecoevo_core::graph::EcoGraph;
use ecoevo_core::types::NodeKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// `‖y‖₂` over all output nodes.
pub fn output_norm(graph: &EcoGraph) -> f64 {
    graph
        .outputs()
        .iter()
        .map(|&id| graph.activation(id).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Equal-width histogram, reported as bin centers and counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub centers: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning their range.
    ///
    /// Empty input gives an empty histogram; a single distinct value gives
    /// one bin holding everything.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        if values.is_empty() || bins == 0 {
            return Self::default();
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !(max > min) {
            return Self {
                centers: vec![min],
                counts: vec![values.len()],
            };
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0; bins];
        for &v in values {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let centers = (0..bins)
            .map(|i| min + width * (i as f64 + 0.5))
            .collect();
        Self { centers, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Histogram of node activations.
pub fn activation_histogram(graph: &EcoGraph, bins: usize) -> Histogram {
    let values: Vec<f64> = graph.nodes().map(|n| n.activation).collect();
    Histogram::from_values(&values, bins)
}

/// Histogram of edge weights.
pub fn weight_histogram(graph: &EcoGraph, bins: usize) -> Histogram {
    let values: Vec<f64> = graph.edges().map(|e| e.weight).collect();
    Histogram::from_values(&values, bins)
}

/// Structural summary of a graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub input_count: usize,
    pub internal_count: usize,
    pub output_count: usize,
    pub avg_degree: f64,
    pub mean_abs_weight: f64,
    pub negative_edges: usize,
    pub output_norm: f64,
    pub degree_histogram: BTreeMap<usize, usize>,
}

/// Compute a structural summary.
pub fn compute(graph: &EcoGraph) -> GraphMetrics {
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();

    let mut by_kind = [0usize; 3];
    for node in graph.nodes() {
        let slot = match node.kind {
            NodeKind::Input => 0,
            NodeKind::Internal => 1,
            NodeKind::Output => 2,
        };
        by_kind[slot] += 1;
    }

    let mean_abs_weight = if edge_count > 0 {
        graph.edges().map(|e| e.weight.abs()).sum::<f64>() / edge_count as f64
    } else {
        0.0
    };
    let avg_degree = if node_count > 0 {
        2.0 * edge_count as f64 / node_count as f64
    } else {
        0.0
    };

    GraphMetrics {
        node_count,
        edge_count,
        input_count: by_kind[0],
        internal_count: by_kind[1],
        output_count: by_kind[2],
        avg_degree,
        mean_abs_weight,
        negative_edges: graph.edges().filter(|e| e.weight < 0.0).count(),
        output_norm: output_norm(graph),
        degree_histogram: graph.degree_histogram(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_norm_is_l2() {
        let mut g = EcoGraph::genesis(1, 2).unwrap();
        let outs = g.outputs().to_vec();
        g.set_activation(outs[0], 3.0);
        g.set_activation(outs[1], -4.0);
        assert!((output_norm(&g) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_bins_cover_range() {
        let hist = Histogram::from_values(&[0.0, 0.1, 0.5, 0.9, 1.0], 2);
        assert_eq!(hist.counts, vec![2, 3]);
        assert_eq!(hist.centers, vec![0.25, 0.75]);
        assert_eq!(hist.total(), 5);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert_eq!(Histogram::from_values(&[], 4), Histogram::default());
        let flat = Histogram::from_values(&[0.3, 0.3], 4);
        assert_eq!(flat.counts, vec![2]);
        assert_eq!(flat.centers, vec![0.3]);
    }

    #[test]
    fn genesis_metrics() {
        let g = EcoGraph::genesis(3, 2).unwrap();
        let m = compute(&g);
        assert_eq!(m.input_count, 3);
        assert_eq!(m.internal_count, 1);
        assert_eq!(m.output_count, 2);
        assert_eq!(m.negative_edges, 0);
        assert!((m.avg_degree - 10.0 / 6.0).abs() < 1e-12);
        assert!((m.mean_abs_weight - 3.0 / 5.0).abs() < 1e-12);
        assert_eq!(weight_histogram(&g, 3).total(), 5);
        assert_eq!(activation_histogram(&g, 3).total(), 6);
    }
}
