//! Step-wise graph search over a [`Grid`].
//!
//! One engine runs breadth-first, Dijkstra, greedy best-first and A*
//! through a single expansion routine. The modes differ only in three
//! things, captured by [`Strategy`]: whether neighbors already queued are
//! skipped, whether cost updates must strictly improve, and how the
//! frontier priority is computed.
//!
//! A session starts with [`SearchEngine::init`] and advances one expansion
//! per [`SearchEngine::step`]. Between steps every piece of state can be
//! read back (frontier, explored set, best path to any node), which is what
//! the terminal driver draws.

use crate::error::SearchError;
use crate::frontier::Frontier;
use crate::grid::{Grid, Position};
use crate::node::{NodeId, NodeRecord};
use log::{debug, info, trace, warn};
use rustc_hash::FxHashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    BreadthFirst,
    Dijkstra,
    GreedyBestFirst,
    AStar,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::BreadthFirst,
        Mode::Dijkstra,
        Mode::GreedyBestFirst,
        Mode::AStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::BreadthFirst => "Breadth-First",
            Mode::Dijkstra => "Dijkstra",
            Mode::GreedyBestFirst => "Greedy Best-First",
            Mode::AStar => "A*",
        }
    }

    /// Whether the mode guarantees a minimum-cost path.
    pub fn is_optimal(self) -> bool {
        matches!(self, Mode::Dijkstra | Mode::AStar)
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Mode::BreadthFirst => Strategy {
                skip_queued: true,
                improve_only: false,
                priority: PriorityRule::ExploredCount,
            },
            Mode::Dijkstra => Strategy {
                skip_queued: false,
                improve_only: true,
                priority: PriorityRule::Cost,
            },
            Mode::GreedyBestFirst => Strategy {
                skip_queued: true,
                improve_only: false,
                priority: PriorityRule::Heuristic,
            },
            Mode::AStar => Strategy {
                skip_queued: false,
                improve_only: true,
                priority: PriorityRule::CostPlusHeuristic,
            },
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityRule {
    /// Number of explored nodes when the neighbor was discovered.
    ExploredCount,
    /// Accumulated cost from the start.
    Cost,
    /// Octile distance to the goal.
    Heuristic,
    CostPlusHeuristic,
}

/// What distinguishes one search mode from another during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    /// Ignore neighbors that already have a frontier entry.
    pub skip_queued: bool,
    /// Only update a neighbor when the new cost is strictly lower.
    pub improve_only: bool,
    pub priority: PriorityRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Stop once the goal is settled instead of draining the frontier.
    /// Modes that only accept strict improvements settle the goal when it is
    /// extracted; the others as soon as it is queued.
    pub exit_on_goal: bool,
    /// Queue a fresh entry whenever a queued node's cost improves. Without
    /// it an improved node keeps the priority it was first queued with.
    pub requeue_improved: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            exit_on_goal: true,
            requeue_improved: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    GoalFound,
    /// The frontier ran dry without reaching the goal.
    FrontierExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Uninitialized,
    Running,
    Complete(Termination),
}

impl Status {
    pub fn is_complete(self) -> bool {
        matches!(self, Status::Complete(_))
    }
}

pub struct SearchEngine<'g> {
    options: SearchOptions,
    grid: Option<&'g Grid>,
    mode: Mode,
    start: NodeId,
    goal: NodeId,
    records: Vec<NodeRecord>,
    frontier: Frontier,
    explored: FxHashSet<NodeId>,
    explored_order: Vec<NodeId>,
    path: Vec<NodeId>,
    iterations: usize,
    status: Status,
}

impl Default for SearchEngine<'_> {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

impl<'g> SearchEngine<'g> {
    pub fn new(options: SearchOptions) -> Self {
        SearchEngine {
            options,
            grid: None,
            mode: Mode::BreadthFirst,
            start: 0,
            goal: 0,
            records: Vec::new(),
            frontier: Frontier::new(),
            explored: FxHashSet::default(),
            explored_order: Vec::new(),
            path: Vec::new(),
            iterations: 0,
            status: Status::Uninitialized,
        }
    }

    /// Starts a new session, discarding any previous one.
    ///
    /// Fails with [`SearchError::InvalidEndpoints`] when either endpoint is
    /// outside the grid or blocked; the engine is then left uninitialized.
    pub fn init(
        &mut self,
        grid: &'g Grid,
        start: Position,
        goal: Position,
        mode: Mode,
    ) -> Result<(), SearchError> {
        self.clear();

        let endpoints = (grid.id_of(start), grid.id_of(goal));
        let (start_id, goal_id) = match endpoints {
            (Some(s), Some(g)) if !grid.node(s).is_blocked() && !grid.node(g).is_blocked() => {
                (s, g)
            }
            _ => {
                warn!("search init rejected: start {} goal {}", start, goal);
                return Err(SearchError::InvalidEndpoints { start, goal });
            }
        };

        self.grid = Some(grid);
        self.mode = mode;
        self.start = start_id;
        self.goal = goal_id;
        self.records.resize(grid.len(), NodeRecord::default());

        let priority = match mode.strategy().priority {
            PriorityRule::ExploredCount | PriorityRule::Cost => 0.0,
            PriorityRule::Heuristic | PriorityRule::CostPlusHeuristic => {
                grid.distance(start_id, goal_id)
            }
        };
        let record = &mut self.records[start_id];
        record.distance_travelled = 0.0;
        record.priority = priority;
        self.frontier.insert(start_id, priority);
        self.status = Status::Running;

        debug!("{} search initialized from {} to {}", mode, start, goal);
        Ok(())
    }

    fn clear(&mut self) {
        self.grid = None;
        self.records.clear();
        self.frontier.clear();
        self.explored.clear();
        self.explored_order.clear();
        self.path.clear();
        self.iterations = 0;
        self.status = Status::Uninitialized;
    }

    /// Performs one expansion and returns the resulting status.
    ///
    /// Stale frontier entries for nodes that were already explored are
    /// dropped without counting as an iteration. Calling `step` on an
    /// uninitialized or completed engine does nothing.
    pub fn step(&mut self) -> Status {
        let Some(grid) = self.grid else {
            return self.status;
        };
        if self.status != Status::Running {
            return self.status;
        }

        let current = loop {
            match self.frontier.extract_min() {
                Ok(entry) if self.explored.contains(&entry.node) => {
                    trace!("dropping stale entry for {}", grid.node(entry.node).position);
                }
                Ok(entry) => break entry.node,
                Err(_) => {
                    self.finish(Termination::FrontierExhausted);
                    return self.status;
                }
            }
        };

        self.explored.insert(current);
        self.explored_order.push(current);
        self.iterations += 1;
        debug!(
            "step {}: expanding {} (cost {:.3})",
            self.iterations,
            grid.node(current).position,
            self.records[current].distance_travelled
        );

        self.expand(grid, current);

        if self.options.exit_on_goal && self.goal_settled() {
            self.finish(Termination::GoalFound);
        }
        self.status
    }

    /// Whether the goal's cost can no longer change under this mode. A queued
    /// goal may still improve in Dijkstra and A*.
    fn goal_settled(&self) -> bool {
        if self.explored.contains(&self.goal) {
            return true;
        }
        !self.mode.strategy().improve_only && self.frontier.contains(self.goal)
    }

    fn expand(&mut self, grid: &Grid, current: NodeId) {
        let strategy = self.mode.strategy();
        let current_cost = self.records[current].distance_travelled;
        let explored_count = self.explored.len() as f64;

        for &neighbor in &grid.node(current).neighbors {
            if self.explored.contains(&neighbor) {
                continue;
            }
            let queued = self.frontier.contains(neighbor);
            if strategy.skip_queued && queued {
                continue;
            }

            let cost = current_cost + grid.edge_cost(current, neighbor);
            if strategy.improve_only && cost >= self.records[neighbor].distance_travelled {
                continue;
            }

            let record = &mut self.records[neighbor];
            record.distance_travelled = cost;
            record.previous = Some(current);

            if !queued || self.options.requeue_improved {
                let priority = match strategy.priority {
                    PriorityRule::ExploredCount => explored_count,
                    PriorityRule::Cost => cost,
                    PriorityRule::Heuristic => grid.distance(neighbor, self.goal),
                    PriorityRule::CostPlusHeuristic => cost + grid.distance(neighbor, self.goal),
                };
                record.priority = priority;
                self.frontier.insert(neighbor, priority);
                trace!(
                    "queued {} with priority {:.3}",
                    grid.node(neighbor).position,
                    priority
                );
            }
        }
    }

    fn finish(&mut self, reason: Termination) {
        // Draining the frontier after the goal was reached still counts as
        // finding it.
        let reason = if self.reached(self.goal) {
            Termination::GoalFound
        } else {
            reason
        };
        if reason == Termination::GoalFound {
            self.path = self.path_between(self.goal);
        }
        self.status = Status::Complete(reason);
        info!(
            "{} search complete after {} iterations: {:?}",
            self.mode, self.iterations, reason
        );
    }

    fn reached(&self, node: NodeId) -> bool {
        self.records
            .get(node)
            .is_some_and(|r| r.distance_travelled.is_finite())
    }

    /// Repeatedly steps until the session completes.
    pub fn run_to_completion(&mut self) -> Status {
        while self.status == Status::Running {
            self.step();
        }
        self.status
    }

    fn path_between(&self, target: NodeId) -> Vec<NodeId> {
        let Some(record) = self.records.get(target) else {
            return Vec::new();
        };
        if record.previous.is_none() && target != self.start {
            return Vec::new();
        }
        let mut path = vec![target];
        let mut current = target;
        while let Some(previous) = self.records[current].previous {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }

    fn positions(&self, ids: &[NodeId]) -> Vec<Position> {
        match self.grid {
            Some(grid) => ids.iter().map(|&id| grid.node(id).position).collect(),
            None => Vec::new(),
        }
    }

    /// Best known path from the start to `target`, following predecessor
    /// links. Empty when `target` has not been reached.
    pub fn path_to(&self, target: Position) -> Vec<Position> {
        let Some(id) = self.grid.and_then(|g| g.id_of(target)) else {
            return Vec::new();
        };
        self.positions(&self.path_between(id))
    }

    /// Path to the goal, set once the search completes with the goal found.
    pub fn path(&self) -> Vec<Position> {
        self.positions(&self.path)
    }

    /// Distinct frontier nodes in extraction order. Stale entries for
    /// explored nodes are left out.
    pub fn frontier(&self) -> Vec<Position> {
        let mut seen = FxHashSet::default();
        let ids: Vec<NodeId> = self
            .frontier
            .ordered()
            .into_iter()
            .map(|entry| entry.node)
            .filter(|id| !self.explored.contains(id) && seen.insert(*id))
            .collect();
        self.positions(&ids)
    }

    /// Live frontier entries, duplicates and stale entries included.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn in_frontier(&self, pos: Position) -> bool {
        self.grid
            .and_then(|g| g.id_of(pos))
            .is_some_and(|id| self.frontier.contains(id))
    }

    /// Explored nodes in the order they were expanded.
    pub fn explored(&self) -> Vec<Position> {
        self.positions(&self.explored_order)
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.grid
            .and_then(|g| g.id_of(pos))
            .is_some_and(|id| self.explored.contains(&id))
    }

    pub fn record(&self, pos: Position) -> Option<NodeRecord> {
        let id = self.grid?.id_of(pos)?;
        self.records.get(id).copied()
    }

    /// Accumulated cost of the best known path to `pos`, if it was reached.
    pub fn cost_to(&self, pos: Position) -> Option<f64> {
        self.record(pos)
            .map(|r| r.distance_travelled)
            .filter(|d| d.is_finite())
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.status {
            Status::Complete(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn grid(&self) -> Option<&'g Grid> {
        self.grid
    }

    pub fn start(&self) -> Option<Position> {
        self.grid.map(|g| g.node(self.start).position)
    }

    pub fn goal(&self) -> Option<Position> {
        self.grid.map(|g| g.node(self.goal).position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(rows: &[&[u8]]) -> Grid {
        let map: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::build(&map).unwrap()
    }

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn new_engine_is_uninitialized_and_inert() {
        let mut engine = SearchEngine::default();
        assert_eq!(engine.status(), Status::Uninitialized);
        assert_eq!(engine.step(), Status::Uninitialized);
        assert_eq!(engine.run_to_completion(), Status::Uninitialized);
        assert!(engine.path_to(p(0, 0)).is_empty());
        assert!(engine.frontier().is_empty());
    }

    #[test]
    fn init_seeds_frontier_with_start() {
        let g = grid(&[&[0, 0, 0], &[0, 0, 0]]);
        let mut engine = SearchEngine::default();
        engine.init(&g, p(0, 0), p(2, 1), Mode::Dijkstra).unwrap();
        assert_eq!(engine.status(), Status::Running);
        assert_eq!(engine.frontier(), vec![p(0, 0)]);
        assert!(engine.explored().is_empty());
        assert_eq!(engine.iterations(), 0);
        assert_eq!(engine.cost_to(p(0, 0)), Some(0.0));
        assert_eq!(engine.cost_to(p(1, 0)), None);
    }

    #[test]
    fn blocked_or_missing_endpoints_are_rejected() {
        let g = grid(&[&[0, 1], &[0, 0]]);
        let mut engine = SearchEngine::default();
        for (start, goal) in [(p(1, 0), p(0, 1)), (p(0, 0), p(1, 0)), (p(0, 0), p(5, 5))] {
            let err = engine.init(&g, start, goal, Mode::AStar).unwrap_err();
            assert_eq!(err, SearchError::InvalidEndpoints { start, goal });
            assert_eq!(engine.status(), Status::Uninitialized);
        }
    }

    #[test]
    fn failed_init_discards_previous_session() {
        let g = grid(&[&[0, 0, 1]]);
        let mut engine = SearchEngine::default();
        engine.init(&g, p(0, 0), p(1, 0), Mode::AStar).unwrap();
        engine.step();
        assert!(engine.init(&g, p(0, 0), p(2, 0), Mode::AStar).is_err());
        assert_eq!(engine.status(), Status::Uninitialized);
        assert!(engine.explored().is_empty());
        assert_eq!(engine.iterations(), 0);
    }

    #[test]
    fn start_equal_to_goal_completes_on_first_step() {
        let g = grid(&[&[0, 0], &[0, 0]]);
        for mode in Mode::ALL {
            let mut engine = SearchEngine::default();
            engine.init(&g, p(1, 1), p(1, 1), mode).unwrap();
            assert_eq!(engine.step(), Status::Complete(Termination::GoalFound));
            assert_eq!(engine.path(), vec![p(1, 1)]);
            assert_eq!(engine.iterations(), 1);
        }
    }

    #[test]
    fn breadth_first_expands_in_discovery_order() {
        let g = grid(&[&[0, 0, 0, 0]]);
        let mut engine = SearchEngine::new(SearchOptions {
            exit_on_goal: false,
            ..SearchOptions::default()
        });
        engine.init(&g, p(1, 0), p(3, 0), Mode::BreadthFirst).unwrap();
        engine.run_to_completion();
        // (1,0) discovers (2,0) before (0,0): +x comes before -x in offset order.
        assert_eq!(engine.explored(), vec![p(1, 0), p(2, 0), p(0, 0), p(3, 0)]);
        assert_eq!(engine.termination(), Some(Termination::GoalFound));
    }

    #[test]
    fn breadth_first_never_requeues_a_discovered_node() {
        let g = grid(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]]);
        let mut engine = SearchEngine::new(SearchOptions {
            exit_on_goal: false,
            ..SearchOptions::default()
        });
        engine.init(&g, p(0, 0), p(2, 2), Mode::BreadthFirst).unwrap();
        engine.step();
        assert_eq!(engine.frontier_len(), 3);
        engine.step();
        // The second expansion only adds the cells not yet discovered.
        assert_eq!(engine.frontier().len(), engine.frontier_len());
        engine.run_to_completion();
        assert_eq!(engine.iterations(), 9);
    }

    #[test]
    fn greedy_prioritizes_distance_to_goal() {
        let g = grid(&[&[0, 0, 0, 0, 0]]);
        let mut engine = SearchEngine::default();
        engine.init(&g, p(2, 0), p(4, 0), Mode::GreedyBestFirst).unwrap();
        engine.step();
        assert_eq!(engine.frontier(), vec![p(3, 0), p(1, 0)]);
        assert_relative_eq!(engine.record(p(3, 0)).unwrap().priority, 1.0);
        assert_relative_eq!(engine.record(p(1, 0)).unwrap().priority, 3.0);
    }

    #[test]
    fn dijkstra_priorities_are_accumulated_cost() {
        let g = grid(&[&[0, 0], &[0, 0]]);
        let mut engine = SearchEngine::default();
        engine.init(&g, p(0, 0), p(1, 1), Mode::Dijkstra).unwrap();
        engine.step();
        assert_relative_eq!(engine.record(p(1, 0)).unwrap().priority, 1.0);
        assert_relative_eq!(
            engine.record(p(1, 1)).unwrap().priority,
            std::f64::consts::SQRT_2
        );
    }

    #[test]
    fn terrain_surcharge_applies_to_cell_being_left() {
        let g = grid(&[&[0, 3, 0]]);
        let mut engine = SearchEngine::new(SearchOptions {
            exit_on_goal: false,
            ..SearchOptions::default()
        });
        engine.init(&g, p(0, 0), p(2, 0), Mode::Dijkstra).unwrap();
        engine.run_to_completion();
        assert_relative_eq!(engine.cost_to(p(1, 0)).unwrap(), 1.0);
        assert_relative_eq!(engine.cost_to(p(2, 0)).unwrap(), 5.0);
    }

    #[test]
    fn improved_nodes_are_requeued_and_stale_entries_skipped() {
        // Leaving the heavy cell first reaches (2,0) expensively; the open
        // detour through the lower row improves it afterwards.
        let g = grid(&[&[0, 4, 0], &[0, 0, 1]]);
        let mut engine = SearchEngine::new(SearchOptions {
            exit_on_goal: false,
            requeue_improved: true,
        });
        engine.init(&g, p(0, 0), p(2, 0), Mode::Dijkstra).unwrap();
        engine.run_to_completion();
        assert_relative_eq!(
            engine.cost_to(p(2, 0)).unwrap(),
            2.0 * std::f64::consts::SQRT_2
        );
        assert_eq!(engine.path_to(p(2, 0)), vec![p(0, 0), p(1, 1), p(2, 0)]);
        // Five passable cells, the stale entry for (2,0) is not an iteration.
        assert_eq!(engine.iterations(), 5);
        assert_eq!(engine.frontier_len(), 0);
    }

    #[test]
    fn optimal_modes_stop_only_once_the_goal_is_extracted() {
        // The goal is first queued from the heavy cell at cost 6; the open
        // lower row reaches it for 2 * sqrt(2).
        let g = grid(&[&[0, 4, 0], &[0, 0, 0]]);
        let best = 2.0 * std::f64::consts::SQRT_2;
        for mode in [Mode::Dijkstra, Mode::AStar] {
            let mut engine = SearchEngine::default();
            engine.init(&g, p(0, 0), p(2, 0), mode).unwrap();
            engine.run_to_completion();
            assert_eq!(engine.termination(), Some(Termination::GoalFound));
            assert!(engine.is_explored(p(2, 0)), "{}", mode);
            assert_relative_eq!(engine.cost_to(p(2, 0)).unwrap(), best);
            assert_eq!(engine.path(), vec![p(0, 0), p(1, 1), p(2, 0)]);
        }

        // Greedy stops on discovery and keeps the first route.
        let mut engine = SearchEngine::default();
        engine.init(&g, p(0, 0), p(2, 0), Mode::GreedyBestFirst).unwrap();
        engine.run_to_completion();
        assert!(!engine.is_explored(p(2, 0)));
        assert_relative_eq!(engine.cost_to(p(2, 0)).unwrap(), 6.0);
        assert_eq!(engine.iterations(), 2);
    }

    #[test]
    fn without_requeue_an_improved_node_keeps_its_stale_priority() {
        // (2,1) is first reached by leaving the surcharged (1,0), then
        // improved through (1,1). Left at its old priority it is expanded
        // after the goal, which has already settled on a worse route.
        let g = grid(&[&[2, 2, 0, 0], &[3, 0, 0, 0]]);
        let optimal = 4.0 + std::f64::consts::SQRT_2;

        let mut engine = SearchEngine::new(SearchOptions {
            exit_on_goal: false,
            requeue_improved: true,
        });
        engine.init(&g, p(0, 0), p(3, 1), Mode::Dijkstra).unwrap();
        engine.run_to_completion();
        assert_relative_eq!(engine.cost_to(p(3, 1)).unwrap(), optimal);

        let mut engine = SearchEngine::new(SearchOptions {
            exit_on_goal: false,
            requeue_improved: false,
        });
        engine.init(&g, p(0, 0), p(3, 1), Mode::Dijkstra).unwrap();
        engine.run_to_completion();
        assert!(engine.cost_to(p(3, 1)).unwrap() > optimal + 0.5);
        assert_eq!(engine.termination(), Some(Termination::GoalFound));
    }
}
