//! Show graph distributions after a run.

use anyhow::Result;
use colored::Colorize;
use ecoevo::prelude::*;
use ecoevo::runtime::metrics;

use crate::config::Config;

const BAR_WIDTH: usize = 40;

pub fn run(ticks: Option<u64>, seed: Option<u64>) -> Result<()> {
    let config = Config::load()?;
    let ticks = ticks.unwrap_or(config.run.ticks);
    let bins = config.run.histogram_bins;
    let (sim, _) = super::evolve(config.simulation_with(seed), ticks, false)?;
    let graph = sim.graph();
    let summary = metrics::compute(graph);

    println!();
    println!("{}", "Graph".bold());
    println!(
        "  Nodes: {} ({} input, {} internal, {} output)",
        summary.node_count.to_string().cyan(),
        summary.input_count,
        summary.internal_count,
        summary.output_count
    );
    println!(
        "  Edges: {} ({} negative), mean |w| {:.4}",
        summary.edge_count.to_string().cyan(),
        summary.negative_edges,
        summary.mean_abs_weight
    );

    println!();
    println!("{}", "Degree".bold());
    let peak = summary.degree_histogram.values().copied().max().unwrap_or(0);
    for (degree, count) in &summary.degree_histogram {
        println!("  {:>6}  {:>6}  {}", degree, count, bar(*count, peak));
    }

    print_binned("Activation", &activation_histogram(graph, bins));
    print_binned("Weight", &weight_histogram(graph, bins));

    Ok(())
}

fn print_binned(title: &str, hist: &Histogram) {
    println!();
    println!("{}", title.bold());
    if hist.total() == 0 {
        println!("  {}", "(empty)".dimmed());
        return;
    }
    let peak = hist.counts.iter().copied().max().unwrap_or(0);
    for (center, count) in hist.centers.iter().zip(&hist.counts) {
        println!("  {:>+9.4}  {:>6}  {}", center, count, bar(*count, peak));
    }
}

fn bar(count: usize, peak: usize) -> String {
    if peak == 0 {
        return String::new();
    }
    let filled = (count * BAR_WIDTH).div_ceil(peak);
    "#".repeat(filled).cyan().to_string()
}
