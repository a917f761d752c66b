use crate::grid::Position;
use crate::search::{Mode, SearchOptions};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Bfs,
    Dijkstra,
    Greedy,
    AStar,
    /// Run every mode on the same grid and compare.
    All,
}

impl Algorithm {
    pub fn modes(self) -> Vec<Mode> {
        match self {
            Algorithm::Bfs => vec![Mode::BreadthFirst],
            Algorithm::Dijkstra => vec![Mode::Dijkstra],
            Algorithm::Greedy => vec![Mode::GreedyBestFirst],
            Algorithm::AStar => vec![Mode::AStar],
            Algorithm::All => Mode::ALL.to_vec(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Text cost map to load instead of generating a random one.
    #[arg(long)]
    pub map: Option<PathBuf>,

    #[arg(long, default_value_t = 50)]
    pub num_walls: usize,

    /// Cells given a surcharged terrain class in random maps.
    #[arg(long, default_value_t = 20)]
    pub num_rough: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Algorithm::AStar)]
    pub algorithm: Algorithm,

    /// Start cell as `x,y`. Defaults to the first open cell from the top left.
    #[arg(long)]
    pub start: Option<Position>,

    /// Goal cell as `x,y`. Defaults to the first open cell from the bottom right.
    #[arg(long)]
    pub goal: Option<Position>,

    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    /// Keep expanding after the goal is discovered until the frontier is empty.
    #[arg(long, default_value_t = false)]
    pub exhaustive: bool,

    /// Leave improved nodes at the priority they were first queued with.
    #[arg(long, default_value_t = false)]
    pub no_requeue: bool,

    /// Check path costs against the reference shortest-path solver.
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    #[arg(long, default_value_t = false)]
    pub batch_mode: bool,

    #[arg(long, default_value_t = 10)]
    pub num_simulations: usize,

    #[arg(long, default_value = "search_results.csv")]
    pub output_file: String,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            exit_on_goal: !self.exhaustive,
            requeue_improved: !self.no_requeue,
        }
    }

    pub fn visualize(&self) -> bool {
        !self.no_visualization && !self.batch_mode
    }
}
