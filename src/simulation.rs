use crate::config::Config;
use crate::error::SimulationError;
use crate::grid::{Grid, Position};
use crate::map::MapData;
use crate::node::{Node, Terrain};
use crate::oracle;
use crate::search::{Mode, SearchEngine, SearchOptions};
use crate::statistics::{Comparison, SearchStats};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use std::fmt::Write as _;
use std::thread;
use std::time::{Duration, Instant};

/// A grid plus the endpoints every mode searches between.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub map: MapData,
    pub start: Position,
    pub goal: Position,
}

impl Scenario {
    /// Loads the configured map file, or generates a random map from the
    /// configured seed. Random maps keep the endpoints open.
    pub fn from_config(config: &Config, seed: Option<u64>) -> Result<Self, SimulationError> {
        let map = match &config.map {
            Some(path) => MapData::load(path)?,
            None => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let corners = [
                    Position::new(0, 0),
                    Position::new(config.width.saturating_sub(1), config.height.saturating_sub(1)),
                ];
                let keep_clear = [
                    config.start.unwrap_or(corners[0]),
                    config.goal.unwrap_or(corners[1]),
                ];
                MapData::random(
                    config.width,
                    config.height,
                    config.num_walls,
                    config.num_rough,
                    &keep_clear,
                    &mut rng,
                )
            }
        };
        let grid = map.to_grid()?;

        let start = match config.start {
            Some(start) => start,
            None => first_open(&grid, false).ok_or(SimulationError::NoOpenCell("start"))?,
        };
        let goal = match config.goal {
            Some(goal) => goal,
            None => first_open(&grid, true).ok_or(SimulationError::NoOpenCell("goal"))?,
        };
        Ok(Scenario { map, start, goal })
    }
}

/// First passable cell in row-major order, or in reverse order from the
/// bottom right.
fn first_open(grid: &Grid, from_end: bool) -> Option<Position> {
    let passable = |n: &&Node| !n.is_blocked();
    if from_end {
        grid.nodes().iter().rev().find(passable).map(|n| n.position)
    } else {
        grid.nodes().iter().find(passable).map(|n| n.position)
    }
}

pub struct Simulation {
    pub config: Config,
    pub grid: Grid,
    pub start: Position,
    pub goal: Position,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, SimulationError> {
        let seed = config.seed;
        Self::with_seed(config, seed)
    }

    pub fn with_seed(config: Config, seed: Option<u64>) -> Result<Self, SimulationError> {
        let scenario = Scenario::from_config(&config, seed)?;
        Self::from_scenario(config, scenario)
    }

    pub fn from_scenario(config: Config, scenario: Scenario) -> Result<Self, SimulationError> {
        let grid = scenario.map.to_grid()?;
        Ok(Simulation {
            config,
            grid,
            start: scenario.start,
            goal: scenario.goal,
        })
    }

    pub fn options(&self) -> SearchOptions {
        self.config.search_options()
    }

    /// Runs every configured mode in turn.
    pub fn run(&self) -> Result<Vec<SearchStats>, SimulationError> {
        self.config
            .algorithm
            .modes()
            .into_iter()
            .map(|mode| self.run_mode(mode))
            .collect()
    }

    /// Runs one mode to completion. With visualization on, the grid is
    /// redrawn after every step.
    pub fn run_mode(&self, mode: Mode) -> Result<SearchStats, SimulationError> {
        let mut engine = SearchEngine::new(self.options());
        engine.init(&self.grid, self.start, self.goal, mode)?;

        let started = Instant::now();
        if self.config.visualize() {
            let delay = Duration::from_millis(self.config.delay_ms);
            while !engine.is_complete() {
                engine.step();
                clear_screen();
                println!("=== {} SEARCH ===", mode.name().to_uppercase());
                println!("Iteration: {}", engine.iterations());
                print!("{}", render(&engine));
                thread::sleep(delay);
            }
        } else {
            engine.run_to_completion();
        }
        let elapsed = started.elapsed();

        let mut stats = SearchStats::collect(&engine, elapsed);
        if self.config.verify {
            stats.optimal_cost = oracle::optimal_cost(&self.grid, self.start, self.goal);
            if mode.is_optimal() && stats.is_optimal() == Some(false) {
                warn!(
                    "{} path cost {:?} differs from reference {:?}",
                    mode, stats.path_cost, stats.optimal_cost
                );
            }
        }
        info!("{} finished: {} iterations", mode, stats.iterations);
        Ok(stats)
    }

    pub fn print_comparison_results(results: &[SearchStats]) {
        println!("\n=== ALGORITHM COMPARISON ===");
        print!("{}", Comparison(results));
    }
}

/// Draws the grid with the engine's current frontier, explored set and path.
pub fn render(engine: &SearchEngine<'_>) -> String {
    let Some(grid) = engine.grid() else {
        return String::new();
    };
    let frontier: FxHashSet<Position> = engine.frontier().into_iter().collect();
    let path: FxHashSet<Position> = if engine.path().is_empty() {
        // Mid-search, show the best route to the cheapest frontier node.
        engine
            .frontier()
            .first()
            .map(|&p| engine.path_to(p))
            .unwrap_or_default()
            .into_iter()
            .collect()
    } else {
        engine.path().into_iter().collect()
    };

    let mut out = String::new();
    out.push_str("Legend: S=Start, G=Goal, *=Path, o=Frontier, x=Explored, #=Blocked, 2-4=Terrain\n");
    out.push_str("   ");
    for x in 0..grid.width() {
        let _ = write!(out, "{:2}", x % 10);
    }
    out.push('\n');
    for y in 0..grid.height() {
        let _ = write!(out, "{:2} ", y);
        for x in 0..grid.width() {
            let pos = Position { x, y };
            let symbol = if Some(pos) == engine.start() {
                'S'
            } else if Some(pos) == engine.goal() {
                'G'
            } else if path.contains(&pos) {
                '*'
            } else if frontier.contains(&pos) {
                'o'
            } else if engine.is_explored(pos) {
                'x'
            } else {
                match grid.terrain(pos) {
                    Some(Terrain::Blocked) => '#',
                    Some(Terrain::Open) | None => '.',
                    Some(t) => char::from(b'0' + t.class()),
                }
            };
            let _ = write!(out, "{} ", symbol);
        }
        out.push('\n');
    }
    out
}

/// Clear the terminal screen (only used when visualization is enabled)
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}
