use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use mna_core::Circuit;
use mna_netlist::{NodeId, load_netlist_file};
use mna_solver::{SolverConfig, StaticSim, TransientSim};

/// A Modified-Nodal-Analysis circuit simulator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a netlist file.
    netlist: PathBuf,

    /// Maximum Newton iterations per solve.
    #[arg(long, default_value_t = SolverConfig::default().convergence_limit)]
    convergence_limit: usize,

    #[command(subcommand)]
    analysis: Analysis,
}

#[derive(Subcommand, Debug)]
enum Analysis {
    /// Solve the DC operating point once.
    Static,
    /// Step a fixed-timestep transient analysis and report the final state.
    Transient {
        /// Integration step, in seconds.
        #[arg(long, default_value_t = SolverConfig::default().delta_t)]
        delta_t: f64,

        /// Total simulated time to run, in seconds.
        #[arg(long)]
        stop_time: f64,
    },
}

fn node_labels(circuit: &Circuit<NodeId>) -> Vec<NodeId> {
    let labels: BTreeSet<NodeId> = circuit
        .elements()
        .iter()
        .flat_map(|element| element.nodes())
        .collect();
    labels.into_iter().collect()
}

fn report(circuit: &Circuit<NodeId>) {
    println!("{:>8}  {:>14}", "node", "voltage (V)");
    for label in node_labels(circuit) {
        let voltage = circuit.voltage(&label).unwrap_or(0.0);
        println!("{label:>8}  {voltage:>14.6}");
    }

    println!("{:>8}  {:>14}", "element", "current (A)");
    for element in circuit.elements() {
        let identifier = element.identifier();
        if let Ok(current) = circuit.current(&identifier) {
            println!("{identifier:>8}  {current:>14.6}");
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut circuit = load_netlist_file(&args.netlist).unwrap_or_else(|e| {
        eprintln!("error loading '{}': {e}", args.netlist.display());
        std::process::exit(1);
    });

    match args.analysis {
        Analysis::Static => {
            let config = SolverConfig {
                convergence_limit: args.convergence_limit,
                ..SolverConfig::default()
            };
            info!("running static analysis on '{}'", args.netlist.display());
            StaticSim::new(&mut circuit, config)
                .simulate()
                .unwrap_or_else(|e| {
                    eprintln!("analysis failed: {e}");
                    std::process::exit(1);
                });
            report(&circuit);
        }
        Analysis::Transient { delta_t, stop_time } => {
            let config = SolverConfig {
                convergence_limit: args.convergence_limit,
                delta_t,
                ..SolverConfig::default()
            };
            info!(
                "running transient analysis on '{}' for {stop_time}s at {delta_t}s steps",
                args.netlist.display()
            );
            let mut sim = TransientSim::new(&mut circuit, config).unwrap_or_else(|e| {
                eprintln!("failed to establish the initial operating point: {e}");
                std::process::exit(1);
            });

            let steps = (stop_time / delta_t).round() as usize;
            for _ in 0..steps {
                if let Err(e) = sim.step() {
                    eprintln!("analysis failed at t={}: {e}", sim.time());
                    std::process::exit(1);
                }
            }
            drop(sim);
            report(&circuit);
        }
    }
}
