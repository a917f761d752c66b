use crate::grid::Position;
use thiserror::Error;

/// Reasons a cost map cannot be turned into a grid. Returned by
/// [`Grid::build`](crate::grid::Grid::build) before any search exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map is empty")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({x}, {y}) has unknown terrain class {value}")]
    UnknownTerrain { x: usize, y: usize, value: u8 },
    #[error("line {line}: cannot parse '{token}' as a terrain class")]
    Parse { line: usize, token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Start or goal lies outside the grid or on a blocked cell.
    #[error("invalid endpoints: start {start}, goal {goal}")]
    InvalidEndpoints { start: Position, goal: Position },
    /// Extraction from an empty frontier. The engine turns this into a
    /// completed search, so callers of `step` never see it.
    #[error("frontier is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no open cell available for {0}")]
    NoOpenCell(&'static str),
}
