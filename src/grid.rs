use crate::error::MapError;
use crate::node::{Node, NodeId, Terrain};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `x,y`, as used on the command line.
impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'x,y', got '{}'", s))?;
        let x = x
            .trim()
            .parse()
            .map_err(|e| format!("bad x coordinate '{}': {}", x, e))?;
        let y = y
            .trim()
            .parse()
            .map_err(|e| format!("bad y coordinate '{}': {}", y, e))?;
        Ok(Position { x, y })
    }
}

/// Neighbor offsets in expansion order, starting at +y.
const DIRECTIONS: [(i64, i64); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Octile distance: the cheapest 8-directional route with diagonal steps of
/// cost sqrt(2) and straight steps of cost 1.
pub fn octile(a: Position, b: Position) -> f64 {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;
    diagonal as f64 * std::f64::consts::SQRT_2 + straight as f64
}

/// A fixed grid of cells with 8-directional adjacency.
///
/// Nodes are stored row-major, so the node at `(x, y)` has id
/// `y * width + x`. Adjacency is computed once in [`Grid::build`] and never
/// changes afterwards.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    nodes: Vec<Node>,
}

impl Grid {
    /// Builds a grid from a cost map indexed as `cost_map[y][x]`.
    pub fn build<R: AsRef<[u8]>>(cost_map: &[R]) -> Result<Self, MapError> {
        let height = cost_map.len();
        let width = cost_map.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }

        let mut nodes = Vec::with_capacity(width * height);
        for (y, row) in cost_map.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &value) in row.iter().enumerate() {
                let terrain =
                    Terrain::from_class(value).ok_or(MapError::UnknownTerrain { x, y, value })?;
                nodes.push(Node {
                    id: y * width + x,
                    position: Position { x, y },
                    terrain,
                    neighbors: Vec::new(),
                });
            }
        }

        let mut grid = Grid {
            width,
            height,
            nodes,
        };
        for id in 0..grid.nodes.len() {
            if !grid.nodes[id].is_blocked() {
                let neighbors = grid.compute_neighbors(grid.nodes[id].position);
                grid.nodes[id].neighbors = neighbors;
            }
        }
        Ok(grid)
    }

    fn compute_neighbors(&self, pos: Position) -> Vec<NodeId> {
        let (x, y) = (pos.x as i64, pos.y as i64);
        DIRECTIONS
            .iter()
            .filter_map(|&(dx, dy)| self.id_at(x + dx, y + dy))
            .filter(|&id| !self.nodes[id].is_blocked())
            .collect()
    }

    fn id_at(&self, x: i64, y: i64) -> Option<NodeId> {
        if x < 0 || y < 0 {
            return None;
        }
        let pos = Position {
            x: x as usize,
            y: y as usize,
        };
        self.id_of(pos)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn id_of(&self, pos: Position) -> Option<NodeId> {
        if self.in_bounds(pos) {
            Some(pos.y * self.width + pos.x)
        } else {
            None
        }
    }

    /// Panics if `id` is not a node of this grid.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_at(&self, pos: Position) -> Option<&Node> {
        self.id_of(pos).map(|id| &self.nodes[id])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn terrain(&self, pos: Position) -> Option<Terrain> {
        self.node_at(pos).map(|n| n.terrain)
    }

    pub fn is_passable(&self, pos: Position) -> bool {
        self.terrain(pos).is_some_and(|t| !t.is_blocked())
    }

    /// Octile distance between two nodes.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        octile(self.nodes[a].position, self.nodes[b].position)
    }

    /// Cost of moving from `from` to its neighbor `to`: the geometric step
    /// plus the surcharge of the cell being left.
    pub fn edge_cost(&self, from: NodeId, to: NodeId) -> f64 {
        self.distance(from, to) + self.nodes[from].terrain.surcharge()
    }

    pub fn blocked_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_blocked()).count()
    }
}
