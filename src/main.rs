use clap::Parser;

use grid_search::batch_simulation::BatchSimulation;
use grid_search::config::{Algorithm, Config};
use grid_search::simulation::Simulation;

fn main() {
    env_logger::init();
    let config = Config::parse();

    if !config.quiet {
        println!("Starting grid search...");
        match &config.map {
            Some(path) => println!("Map file: {}", path.display()),
            None => {
                println!("Grid size: {}x{}", config.width, config.height);
                println!(
                    "Walls: {}, Rough cells: {}",
                    config.num_walls, config.num_rough
                );
            }
        }
        println!("Algorithm: {:?}", config.algorithm);
        if config.visualize() {
            println!("Visualization enabled with {}ms delay", config.delay_ms);
            println!("Press Ctrl+C to stop the simulation");
        } else {
            println!("Visualization disabled - running in fast mode");
        }
        println!();
    }

    if config.batch_mode {
        let mut batch_sim = BatchSimulation::new(config.clone());
        match batch_sim.run() {
            Ok(()) => {
                if !config.quiet {
                    batch_sim.print_summary();
                }
            }
            Err(e) => {
                eprintln!("Batch simulation failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let simulation = match Simulation::new(config.clone()) {
        Ok(simulation) => simulation,
        Err(e) => {
            eprintln!("Failed to set up simulation: {}", e);
            eprintln!("Try reducing --num-walls or check the --start/--goal cells");
            std::process::exit(1);
        }
    };

    match simulation.run() {
        Ok(results) if config.algorithm == Algorithm::All => {
            Simulation::print_comparison_results(&results);
        }
        Ok(results) => {
            println!("\n=== FINAL RESULTS ===");
            for stats in &results {
                println!("{}", stats);
            }
        }
        Err(e) => {
            eprintln!("Search failed: {}", e);
            std::process::exit(1);
        }
    }
}
