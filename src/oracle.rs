use crate::grid::{Grid, Position};
use num_traits::Zero;
use pathfinding::prelude::dijkstra;
use std::cmp::Ordering;
use std::ops::Add;

/// Path cost with the total order the `pathfinding` crate requires.
#[derive(Debug, Clone, Copy)]
pub struct Cost(pub f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, other: Cost) -> Cost {
        Cost(self.0 + other.0)
    }
}

impl Zero for Cost {
    fn zero() -> Self {
        Cost(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// Minimum-cost path between two cells, computed independently of the
/// step-wise engine with the same edge costs. Returns `None` when either
/// endpoint is outside the grid or blocked, or when the goal is unreachable.
pub fn optimal_path(grid: &Grid, start: Position, goal: Position) -> Option<(Vec<Position>, f64)> {
    let start_id = grid.id_of(start).filter(|&id| !grid.node(id).is_blocked())?;
    let goal_id = grid.id_of(goal).filter(|&id| !grid.node(id).is_blocked())?;

    let (path, cost) = dijkstra(
        &start_id,
        |&id| {
            grid.node(id)
                .neighbors
                .iter()
                .map(move |&n| (n, Cost(grid.edge_cost(id, n))))
                .collect::<Vec<_>>()
        },
        |&id| id == goal_id,
    )?;

    let positions = path.into_iter().map(|id| grid.node(id).position).collect();
    Some((positions, cost.0))
}

pub fn optimal_cost(grid: &Grid, start: Position, goal: Position) -> Option<f64> {
    optimal_path(grid, start, goal).map(|(_, cost)| cost)
}

/// Sums the edge costs along a path of adjacent cells.
pub fn path_cost(grid: &Grid, path: &[Position]) -> Option<f64> {
    let ids = path
        .iter()
        .map(|&p| grid.id_of(p))
        .collect::<Option<Vec<_>>>()?;
    ids.windows(2).try_fold(0.0, |total, pair| {
        grid.node(pair[0])
            .neighbors
            .contains(&pair[1])
            .then(|| total + grid.edge_cost(pair[0], pair[1]))
    })
}
