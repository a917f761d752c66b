use crate::search::{Mode, SearchEngine, Termination};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SearchStats {
    pub mode: Mode,
    pub iterations: usize,
    pub explored: usize,
    pub frontier: usize,
    /// Nodes on the final path, endpoints included. Zero when no path.
    pub path_nodes: usize,
    pub path_cost: Option<f64>,
    pub termination: Option<Termination>,
    pub elapsed: Duration,
    /// Cost found by the reference solver, when verification ran.
    pub optimal_cost: Option<f64>,
}

impl SearchStats {
    pub fn collect(engine: &SearchEngine<'_>, elapsed: Duration) -> Self {
        let path = engine.path();
        let path_cost = engine.goal().and_then(|goal| {
            if path.is_empty() {
                None
            } else {
                engine.cost_to(goal)
            }
        });
        SearchStats {
            mode: engine.mode(),
            iterations: engine.iterations(),
            explored: engine.explored().len(),
            frontier: engine.frontier().len(),
            path_nodes: path.len(),
            path_cost,
            termination: engine.termination(),
            elapsed,
            optimal_cost: None,
        }
    }

    pub fn success(&self) -> bool {
        self.termination == Some(Termination::GoalFound)
    }

    /// Path cost relative to the optimum: 1.0 is optimal.
    pub fn cost_ratio(&self) -> Option<f64> {
        match (self.path_cost, self.optimal_cost) {
            (Some(cost), Some(optimal)) if optimal > 0.0 => Some(cost / optimal),
            (Some(_), Some(_)) => Some(1.0),
            _ => None,
        }
    }

    /// Whether the path cost matches the reference optimum. `None` when no
    /// reference cost is known.
    pub fn is_optimal(&self) -> Option<bool> {
        let optimal = self.optimal_cost?;
        Some(self.path_cost.is_some_and(|cost| (cost - optimal).abs() < 1e-9))
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Search Statistics:", self.mode)?;
        match self.termination {
            Some(Termination::GoalFound) => writeln!(f, "Result: goal found")?,
            Some(Termination::FrontierExhausted) => {
                writeln!(f, "Result: frontier exhausted, goal unreachable")?
            }
            None => writeln!(f, "Result: incomplete")?,
        }
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Explored nodes: {}", self.explored)?;
        writeln!(f, "Frontier nodes left: {}", self.frontier)?;
        writeln!(f, "Path nodes: {}", self.path_nodes)?;
        if let Some(cost) = self.path_cost {
            writeln!(f, "Path cost: {:.3}", cost)?;
        }
        if let Some(optimal) = self.optimal_cost {
            writeln!(f, "Optimal cost (reference): {:.3}", optimal)?;
            if let Some(ratio) = self.cost_ratio() {
                writeln!(f, "Cost ratio: {:.3}", ratio)?;
            }
            if self.is_optimal() == Some(false) && self.mode.is_optimal() {
                writeln!(f, "⚠ {} returned a non-optimal path", self.mode)?;
            }
        }
        writeln!(f, "Elapsed: {:.2?}", self.elapsed)?;
        Ok(())
    }
}

/// Side-by-side table for several modes run on the same grid.
pub struct Comparison<'a>(pub &'a [SearchStats]);

impl fmt::Display for Comparison<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "Algorithm", "Result", "Iterations", "Path nodes", "Path cost", "Time"
        )?;
        writeln!(f, "{}", "-".repeat(71))?;
        for stats in self.0 {
            let result = if stats.success() { "found" } else { "none" };
            let cost = stats
                .path_cost
                .map(|c| format!("{:.3}", c))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "{:<18} {:>8} {:>10} {:>10} {:>10} {:>10}",
                stats.mode.name(),
                result,
                stats.iterations,
                stats.path_nodes,
                cost,
                format!("{:.2?}", stats.elapsed)
            )?;
        }

        let cheapest = self
            .0
            .iter()
            .filter_map(|s| s.path_cost.map(|c| (s.mode, c)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let fewest = self
            .0
            .iter()
            .filter(|s| s.success())
            .min_by_key(|s| s.iterations);
        if let Some((mode, cost)) = cheapest {
            writeln!(f, "\nCheapest path: {} ({:.3})", mode, cost)?;
        }
        if let Some(stats) = fewest {
            writeln!(
                f,
                "Fewest expansions: {} ({})",
                stats.mode, stats.iterations
            )?;
        }
        Ok(())
    }
}
