//! Grid pathfinding: BFS, greedy best-first, and A*.
//!
//! # Search space
//!
//! All three algorithms search the 4-connected grid, treating a cell as
//! traversable when the grid marks it passable and the dynamic-obstacle
//! overlay does not cover it.  Neighbours are expanded in the fixed order
//! of [`Cell::neighbors4`], so for a given grid, overlay, and endpoints the
//! result is fully deterministic, ties included.
//!
//! # Cost model
//!
//! Every step costs 1 hop.  BFS and A* both return a shortest route in hops
//! (A* with a Manhattan heuristic, which is admissible on a 4-connected
//! grid); greedy best-first expands by heuristic alone and returns a valid
//! but not necessarily shortest route.
//!
//! # Node budget
//!
//! Each search counts the cells it expands and aborts with
//! [`PathError::BudgetExceeded`] past the budget.  Callers treat an aborted
//! search the same as no path: the agent waits and retries later.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};

use av_core::Cell;
use av_grid::Grid;

use crate::error::{PathError, PathResult};
use crate::route::Route;

/// Default number of cells a single search may expand.
pub const DEFAULT_NODE_BUDGET: usize = 500;

// ── Algorithm ─────────────────────────────────────────────────────────────────

/// Route-search algorithm selector.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Breadth-first search: shortest hop count, layer by layer.
    Bfs,
    /// Greedy best-first: fast, heuristic-only, no optimality guarantee.
    Greedy,
    /// A* with Manhattan heuristic: shortest hop count.
    #[default]
    AStar,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BFS" => Ok(Algorithm::Bfs),
            "Greedy" => Ok(Algorithm::Greedy),
            "A*" => Ok(Algorithm::AStar),
            other => Err(format!("unknown algorithm '{other}'")),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Greedy => "Greedy",
            Algorithm::AStar => "A*",
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Compute a route from `start` to `goal` with the chosen algorithm.
///
/// `blocked` is the dynamic-obstacle overlay on top of the grid's static
/// passability.  `start` itself is always expandable (the caller is already
/// standing on it, possibly under a freshly spawned obstacle); `goal` must
/// be traversable or the search fails immediately.
pub fn compute_path(
    algorithm: Algorithm,
    grid: &Grid,
    blocked: &FxHashSet<Cell>,
    start: Cell,
    goal: Cell,
    node_budget: usize,
) -> PathResult<Route> {
    if start == goal {
        return Ok(Route::new(vec![start]));
    }
    if !grid.in_bounds(start) || !traversable(grid, blocked, goal) {
        return Err(PathError::NoPath { from: start, to: goal });
    }

    match algorithm {
        Algorithm::Bfs => bfs(grid, blocked, start, goal, node_budget),
        Algorithm::Greedy => greedy(grid, blocked, start, goal, node_budget),
        Algorithm::AStar => astar(grid, blocked, start, goal, node_budget),
    }
}

#[inline]
fn traversable(grid: &Grid, blocked: &FxHashSet<Cell>, cell: Cell) -> bool {
    grid.is_passable(cell) && !blocked.contains(&cell)
}

fn reconstruct(prev: &FxHashMap<Cell, Cell>, start: Cell, goal: Cell) -> Route {
    let mut cells = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = prev[&cur];
        cells.push(cur);
    }
    cells.reverse();
    Route::new(cells)
}

// ── BFS ───────────────────────────────────────────────────────────────────────

fn bfs(
    grid: &Grid,
    blocked: &FxHashSet<Cell>,
    start: Cell,
    goal: Cell,
    node_budget: usize,
) -> PathResult<Route> {
    let mut queue = VecDeque::new();
    let mut seen = FxHashSet::default();
    let mut prev: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut expanded = 0usize;

    queue.push_back(start);
    seen.insert(start);

    while let Some(cell) = queue.pop_front() {
        expanded += 1;
        if expanded > node_budget {
            return Err(PathError::BudgetExceeded { budget: node_budget });
        }

        for next in cell.neighbors4() {
            if !traversable(grid, blocked, next) || !seen.insert(next) {
                continue;
            }
            prev.insert(next, cell);
            if next == goal {
                return Ok(reconstruct(&prev, start, goal));
            }
            queue.push_back(next);
        }
    }

    Err(PathError::NoPath { from: start, to: goal })
}

// ── Greedy best-first ─────────────────────────────────────────────────────────

fn greedy(
    grid: &Grid,
    blocked: &FxHashSet<Cell>,
    start: Cell,
    goal: Cell,
    node_budget: usize,
) -> PathResult<Route> {
    // Min-heap on (h, discovery seq). The sequence number makes tie-breaking
    // follow discovery order, which in turn follows neighbors4 order.
    let mut heap: BinaryHeap<Reverse<(u32, u64, Cell)>> = BinaryHeap::new();
    let mut seen = FxHashSet::default();
    let mut prev: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    heap.push(Reverse((start.manhattan(goal), seq, start)));
    seen.insert(start);

    while let Some(Reverse((_, _, cell))) = heap.pop() {
        expanded += 1;
        if expanded > node_budget {
            return Err(PathError::BudgetExceeded { budget: node_budget });
        }
        if cell == goal {
            return Ok(reconstruct(&prev, start, goal));
        }

        for next in cell.neighbors4() {
            if !traversable(grid, blocked, next) || !seen.insert(next) {
                continue;
            }
            prev.insert(next, cell);
            seq += 1;
            heap.push(Reverse((next.manhattan(goal), seq, next)));
        }
    }

    Err(PathError::NoPath { from: start, to: goal })
}

// ── A* ────────────────────────────────────────────────────────────────────────

fn astar(
    grid: &Grid,
    blocked: &FxHashSet<Cell>,
    start: Cell,
    goal: Cell,
    node_budget: usize,
) -> PathResult<Route> {
    // Min-heap on (f = g + h, h, discovery seq). Breaking f-ties by lower h
    // prefers nodes closer to the goal, which keeps expansion focused.
    let mut heap: BinaryHeap<Reverse<(u32, u32, u64, Cell)>> = BinaryHeap::new();
    let mut g_score: FxHashMap<Cell, u32> = FxHashMap::default();
    let mut prev: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut seq = 0u64;
    let mut expanded = 0usize;

    g_score.insert(start, 0);
    let h0 = start.manhattan(goal);
    heap.push(Reverse((h0, h0, seq, start)));

    while let Some(Reverse((f, h, _, cell))) = heap.pop() {
        // Skip stale heap entries (a cheaper g was recorded after this push).
        let g = f - h;
        if g_score.get(&cell).is_some_and(|&best| best < g) {
            continue;
        }

        expanded += 1;
        if expanded > node_budget {
            return Err(PathError::BudgetExceeded { budget: node_budget });
        }
        if cell == goal {
            return Ok(reconstruct(&prev, start, goal));
        }

        for next in cell.neighbors4() {
            if !traversable(grid, blocked, next) {
                continue;
            }
            let tentative = g + 1;
            if g_score.get(&next).is_none_or(|&best| tentative < best) {
                g_score.insert(next, tentative);
                prev.insert(next, cell);
                seq += 1;
                let h = next.manhattan(goal);
                heap.push(Reverse((tentative + h, h, seq, next)));
            }
        }
    }

    Err(PathError::NoPath { from: start, to: goal })
}
