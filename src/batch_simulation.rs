use crate::config::Config;
use crate::error::SimulationError;
use crate::oracle;
use crate::search::Mode;
use crate::simulation::{Scenario, Simulation};
use log::{debug, info, warn};
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

const CSV_HEADER: &str = "simulation_id,seed,algorithm,width,height,num_walls,num_rough,success,iterations,explored,path_nodes,path_cost,optimal_cost,execution_time_us";

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub seed: u64,
    pub mode: Mode,
    pub width: usize,
    pub height: usize,
    pub num_walls: usize,
    pub num_rough: usize,
    pub success: bool,
    pub iterations: usize,
    pub explored: usize,
    pub path_nodes: usize,
    pub path_cost: Option<f64>,
    pub optimal_cost: Option<f64>,
    pub execution_time_us: u64,
}

impl BatchResult {
    fn csv_row(&self) -> String {
        let cost = |c: Option<f64>| c.map(|c| format!("{:.6}", c)).unwrap_or_default();
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.simulation_id,
            self.seed,
            self.mode.name(),
            self.width,
            self.height,
            self.num_walls,
            self.num_rough,
            self.success,
            self.iterations,
            self.explored,
            self.path_nodes,
            cost(self.path_cost),
            cost(self.optimal_cost),
            self.execution_time_us
        )
    }
}

/// Runs every selected mode over a series of seeded random maps and appends
/// the results to a CSV file.
pub struct BatchSimulation {
    config: Config,
    results: Vec<BatchResult>,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
    /// Everything run so far, kept for the summary.
    history: Vec<BatchResult>,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        BatchSimulation {
            config,
            results: Vec::new(),
            start_time: Instant::now(),
            batch_size: 100,
            total_results_written: 0,
            history: Vec::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.history
    }

    pub fn run(&mut self) -> Result<(), SimulationError> {
        self.initialize_csv_file()?;
        if !self.config.quiet {
            println!("=== BATCH SEARCH STARTED ===");
            println!("Grid size: {}x{}", self.config.width, self.config.height);
            println!(
                "Walls: {}, Rough cells: {}",
                self.config.num_walls, self.config.num_rough
            );
            println!("Simulations: {}", self.config.num_simulations);
            println!("Output file: {}", self.config.output_file);
            println!();
        }

        let base_seed = self.config.seed.unwrap_or(0);
        let mut run_config = self.config.clone();
        run_config.no_visualization = true;

        for sim_id in 0..self.config.num_simulations {
            let seed = base_seed.wrapping_add(sim_id as u64);
            let scenario = Scenario::from_config(&run_config, Some(seed))?;
            let simulation = Simulation::from_scenario(run_config.clone(), scenario)?;
            let optimal = oracle::optimal_cost(&simulation.grid, simulation.start, simulation.goal);

            for mode in self.config.algorithm.modes() {
                let stats = match simulation.run_mode(mode) {
                    Ok(stats) => stats,
                    Err(e) => {
                        warn!("simulation {} ({}) failed: {}", sim_id, mode, e);
                        continue;
                    }
                };
                let result = BatchResult {
                    simulation_id: sim_id,
                    seed,
                    mode,
                    width: self.config.width,
                    height: self.config.height,
                    num_walls: self.config.num_walls,
                    num_rough: self.config.num_rough,
                    success: stats.success(),
                    iterations: stats.iterations,
                    explored: stats.explored,
                    path_nodes: stats.path_nodes,
                    path_cost: stats.path_cost,
                    optimal_cost: optimal,
                    execution_time_us: stats.elapsed.as_micros() as u64,
                };
                debug!("simulation {} {}: {:?}", sim_id, mode, result);
                self.results.push(result);
            }

            if self.results.len() >= self.batch_size {
                self.flush_results_to_csv()?;
            }
        }

        self.flush_results_to_csv()?;
        info!(
            "batch complete: {} results in {:.2?}",
            self.total_results_written,
            self.start_time.elapsed()
        );
        if self.config.quiet {
            println!(
                "Batch search completed: {} results in {:.1}s -> {}",
                self.total_results_written,
                self.start_time.elapsed().as_secs_f64(),
                self.config.output_file
            );
        }
        Ok(())
    }

    fn flush_results_to_csv(&mut self) -> Result<(), SimulationError> {
        if self.results.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.output_file)?;
        for result in &self.results {
            writeln!(file, "{}", result.csv_row())?;
        }

        self.total_results_written += self.results.len();
        if !self.config.quiet {
            println!(
                "Flushed {} results to CSV (total: {})",
                self.results.len(),
                self.total_results_written
            );
        }
        self.history.append(&mut self.results);
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<(), SimulationError> {
        let mut file = std::fs::File::create(&self.config.output_file)?;
        writeln!(file, "{}", CSV_HEADER)?;
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.history.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SEARCH SUMMARY ===");
        for mode in Mode::ALL {
            let results: Vec<&BatchResult> =
                self.history.iter().filter(|r| r.mode == mode).collect();
            if results.is_empty() {
                continue;
            }
            let successful: Vec<&&BatchResult> = results.iter().filter(|r| r.success).collect();
            println!("\n{} Results:", mode);
            println!(
                "  Success rate: {}/{} ({:.1}%)",
                successful.len(),
                results.len(),
                successful.len() as f64 / results.len() as f64 * 100.0
            );
            if successful.is_empty() {
                continue;
            }

            let count = successful.len() as f64;
            let avg_iterations =
                successful.iter().map(|r| r.iterations as f64).sum::<f64>() / count;
            let avg_time =
                successful.iter().map(|r| r.execution_time_us as f64).sum::<f64>() / count;
            let optimal = successful
                .iter()
                .filter(|r| match (r.path_cost, r.optimal_cost) {
                    (Some(cost), Some(best)) => (cost - best).abs() < 1e-9,
                    _ => false,
                })
                .count();
            println!("  Average iterations: {:.1}", avg_iterations);
            println!("  Average execution time: {:.1}us", avg_time);
            println!("  Optimal paths: {}/{}", optimal, successful.len());
        }
    }
}
