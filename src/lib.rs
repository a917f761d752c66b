//! Step-wise grid search: breadth-first, Dijkstra, greedy best-first and A*
//! over an 8-connected grid with blocked cells and terrain surcharges.
//!
//! [`grid::Grid`] is built once from a cost map. [`search::SearchEngine`]
//! runs one session at a time over a borrowed grid and can be advanced one
//! expansion per [`search::SearchEngine::step`] or driven to completion.
//! The remaining modules are the terminal driver around the engine.

pub mod batch_simulation;
pub mod config;
pub mod error;
pub mod frontier;
pub mod grid;
pub mod map;
pub mod node;
pub mod oracle;
pub mod search;
pub mod simulation;
pub mod statistics;

pub use error::{MapError, SearchError, SimulationError};
pub use grid::{Grid, Position};
pub use search::{Mode, SearchEngine, SearchOptions, Status, Termination};
