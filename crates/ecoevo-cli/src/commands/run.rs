//! Run the simulation.

use anyhow::Result;
use colored::Colorize;
use ecoevo::prelude::*;

use crate::config::Config;

pub fn run(ticks: Option<u64>, seed: Option<u64>, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let ticks = ticks.unwrap_or(config.run.ticks);
    let sim_config = config.simulation_with(seed);

    println!(
        "{} Genesis: {} inputs, {} outputs, seed {}, {} input",
        "→".blue(),
        sim_config.inputs.to_string().cyan(),
        sim_config.outputs.to_string().cyan(),
        sim_config.seed.to_string().cyan(),
        sim_config.params.input_source.label()
    );

    let initial = Simulation::new(sim_config.clone())?.stats();
    let (sim, totals) = super::evolve(sim_config, ticks, verbose)?;
    let stats = sim.stats();

    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!(
        "  Nodes: {} → {}",
        initial.node_count.to_string().yellow(),
        stats.node_count.to_string().green()
    );
    println!(
        "  Edges: {} → {}",
        initial.edge_count.to_string().yellow(),
        stats.edge_count.to_string().green()
    );
    println!("  Bridges: {}", totals.bridges.to_string().cyan());
    println!(
        "  Flipped: {}  Rewired: {}",
        totals.edges_flipped.to_string().cyan(),
        totals.edges_rewired.to_string().cyan()
    );
    println!(
        "  Removed: {} edges, {} nodes",
        totals.edges_removed.to_string().red(),
        totals.nodes_removed.to_string().red()
    );
    println!(
        "  Output norm: {}",
        format!("{:.4}", stats.output_norm).green()
    );

    Ok(())
}
