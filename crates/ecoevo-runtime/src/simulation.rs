//! Simulation — the driver that owns a graph and advances it tick by tick.
//!
//! The simulation holds everything one run needs:
//! 1. The graph, built from genesis parameters
//! 2. The step parameters, validated up front
//! 3. A seeded generator, so a run is reproducible from its config
//! 4. The tick counter and the output-norm history
//!
//! An external loop calls [`Simulation::step`] (or [`Simulation::run`]) and
//! reads back events, stats and snapshots. Pausing is simply not calling
//! `step`; every tick completes atomically.

use crate::engine::{self, StepEvents};
use crate::metrics;
use crate::snapshot::GraphSnapshot;
use ecoevo_core::error::{ConfigError, EcoError, Result};
use ecoevo_core::graph::EcoGraph;
use ecoevo_core::params::StepParams;
use ecoevo_core::types::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything needed to start a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of input nodes (default: 3).
    pub inputs: usize,
    /// Number of output nodes (default: 2).
    pub outputs: usize,
    /// Seed for the simulation's random stream (default: 42).
    pub seed: u64,
    pub params: StepParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inputs: 3,
            outputs: 2,
            seed: 42,
            params: StepParams::default(),
        }
    }
}

/// Statistics about the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStats {
    pub tick: Tick,
    pub node_count: usize,
    pub edge_count: usize,
    pub output_norm: f64,
}

/// Cumulative event counts over some number of ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunTotals {
    pub ticks: u64,
    pub bridges: usize,
    pub nodes_added: usize,
    pub edges_added: usize,
    pub edges_flipped: usize,
    pub edges_rewired: usize,
    pub edges_removed: usize,
    pub nodes_removed: usize,
}

impl RunTotals {
    pub fn absorb(&mut self, events: &StepEvents) {
        self.ticks += 1;
        self.bridges += events.triggered.len();
        self.nodes_added += events.nodes_added;
        self.edges_added += events.edges_added;
        self.edges_flipped += events.edges_flipped;
        self.edges_rewired += events.edges_rewired;
        self.edges_removed += events.edges_removed;
        self.nodes_removed += events.nodes_removed;
    }
}

/// A running simulation.
pub struct Simulation {
    config: SimulationConfig,
    graph: EcoGraph,
    rng: ChaCha8Rng,
    tick: Tick,
    output_history: Vec<(Tick, f64)>,
    totals: RunTotals,
    last_events: StepEvents,
}

impl Simulation {
    /// Validate `config`, build the genesis graph and seed the generator.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.params.validate()?;
        let graph = EcoGraph::genesis(config.inputs, config.outputs)?;
        check_channels(&config.params, &graph)?;

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut sim = Self {
            config,
            graph,
            rng,
            tick: 0,
            output_history: Vec::new(),
            totals: RunTotals::default(),
            last_events: StepEvents::default(),
        };
        sim.record_output();
        debug!(
            inputs = sim.config.inputs,
            outputs = sim.config.outputs,
            seed = sim.config.seed,
            source = sim.config.params.input_source.label(),
            "simulation created"
        );
        Ok(sim)
    }

    /// Run a single tick and advance the counter.
    pub fn step(&mut self) -> &StepEvents {
        let events = engine::step(&mut self.graph, self.tick, &self.config.params, &mut self.rng);
        self.tick += 1;
        self.totals.absorb(&events);
        self.record_output();
        self.last_events = events;
        &self.last_events
    }

    /// Run `ticks` ticks and return the totals for just this run.
    pub fn run(&mut self, ticks: u64) -> RunTotals {
        let mut totals = RunTotals::default();
        for _ in 0..ticks {
            totals.absorb(self.step());
        }
        totals
    }

    /// Replace the step parameters between ticks.
    ///
    /// The channel count must still match the graph.
    pub fn set_params(&mut self, params: StepParams) -> Result<()> {
        params.validate()?;
        check_channels(&params, &self.graph)?;
        self.config.params = params;
        Ok(())
    }

    /// Rebuild the genesis graph and restart at tick 0.
    ///
    /// The random stream continues; it is not reseeded.
    pub fn reset(&mut self) -> Result<()> {
        self.graph = EcoGraph::genesis(self.config.inputs, self.config.outputs)?;
        self.tick = 0;
        self.output_history.clear();
        self.totals = RunTotals::default();
        self.last_events = StepEvents::default();
        self.record_output();
        Ok(())
    }

    /// Impulse response of the current, frozen graph.
    ///
    /// Zeroes all activations, drives `channel` with `amplitude` at local
    /// step 0 and with 0 afterwards, and records the output norm after each
    /// of `steps` propagation passes. No bridging, weight update or pruning
    /// happens, the tick counter does not move, and activations are zeroed
    /// again on return.
    pub fn impulse_response(&mut self, channel: usize, amplitude: f64, steps: usize) -> Result<Vec<f64>> {
        let inputs = self.graph.inputs().to_vec();
        if channel >= inputs.len() {
            return Err(EcoError::invalid_config(
                "channel",
                channel,
                format!("graph has {} input channels", inputs.len()),
            ));
        }

        let params = &self.config.params;
        self.graph.reset_activations();
        let mut norms = Vec::with_capacity(steps);
        for k in 0..steps {
            for (i, &id) in inputs.iter().enumerate() {
                let drive = if i == channel && k == 0 { amplitude } else { 0.0 };
                self.graph.set_activation(id, drive);
            }
            engine::propagate(&mut self.graph, params.activation, params.weight_transform);
            norms.push(metrics::output_norm(&self.graph));
        }
        self.graph.reset_activations();
        Ok(norms)
    }

    /// Get simulation statistics.
    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            tick: self.tick,
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            output_norm: metrics::output_norm(&self.graph),
        }
    }

    /// Take a serializable snapshot of the graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.graph, self.tick)
    }

    pub fn graph(&self) -> &EcoGraph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn params(&self) -> &StepParams {
        &self.config.params
    }

    /// The tick the next call to `step` will run.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// `(tick, ‖y‖₂)` after genesis and after every step.
    pub fn output_history(&self) -> &[(Tick, f64)] {
        &self.output_history
    }

    /// Totals since creation or the last reset.
    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    pub fn last_events(&self) -> &StepEvents {
        &self.last_events
    }

    fn record_output(&mut self) {
        self.output_history
            .push((self.tick, metrics::output_norm(&self.graph)));
    }
}

fn check_channels(params: &StepParams, graph: &EcoGraph) -> Result<()> {
    if params.input_channel_count != graph.inputs().len() {
        return Err(EcoError::Config(ConfigError::ChannelMismatch {
            params: params.input_channel_count,
            graph: graph.inputs().len(),
        }));
    }
    Ok(())
}
