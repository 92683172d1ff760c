use rustc_hash::FxHashSet;

use av_core::Cell;
use av_grid::Grid;

use crate::{compute_path, Algorithm, PathError, Route, DEFAULT_NODE_BUDGET};

fn no_overlay() -> FxHashSet<Cell> {
    FxHashSet::default()
}

fn route(algorithm: Algorithm, grid: &Grid, start: Cell, goal: Cell) -> Route {
    compute_path(algorithm, grid, &no_overlay(), start, goal, DEFAULT_NODE_BUDGET).unwrap()
}

/// Every consecutive pair 4-adjacent, every cell passable, endpoints correct.
fn assert_valid(route: &Route, grid: &Grid, start: Cell, goal: Cell) {
    assert_eq!(route.start(), start);
    assert_eq!(route.destination(), goal);
    for pair in route.cells().windows(2) {
        assert!(pair[0].is_adjacent4(pair[1]), "{} !~ {}", pair[0], pair[1]);
    }
    for &cell in &route.cells()[1..] {
        assert!(grid.is_passable(cell), "route crosses impassable {cell}");
    }
}

mod algorithm {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for (s, alg) in [
            ("BFS", Algorithm::Bfs),
            ("Greedy", Algorithm::Greedy),
            ("A*", Algorithm::AStar),
        ] {
            assert_eq!(s.parse::<Algorithm>().unwrap(), alg);
            assert_eq!(alg.to_string(), s);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("dijkstra".parse::<Algorithm>().is_err());
        assert!("bfs".parse::<Algorithm>().is_err());
    }
}

mod open_grid {
    use super::*;

    #[test]
    fn corner_to_corner_is_manhattan_optimal() {
        let grid = Grid::open(12, 20);
        let start = Cell::new(0, 0);
        let goal = Cell::new(11, 19);
        for alg in [Algorithm::Bfs, Algorithm::AStar] {
            let r = route(alg, &grid, start, goal);
            assert_valid(&r, &grid, start, goal);
            assert_eq!(r.hops(), 30, "{alg} must be hop-optimal");
        }
    }

    #[test]
    fn greedy_reaches_the_goal() {
        let grid = Grid::open(12, 20);
        let start = Cell::new(0, 0);
        let goal = Cell::new(11, 19);
        let r = route(Algorithm::Greedy, &grid, start, goal);
        assert_valid(&r, &grid, start, goal);
        // No optimality guarantee, but on an open grid the heuristic never
        // leads away from the goal.
        assert_eq!(r.hops(), 30);
    }

    #[test]
    fn start_equals_goal_is_a_zero_hop_route() {
        let grid = Grid::open(3, 3);
        let cell = Cell::new(1, 1);
        for alg in [Algorithm::Bfs, Algorithm::Greedy, Algorithm::AStar] {
            let r = route(alg, &grid, cell, cell);
            assert_eq!(r.hops(), 0);
            assert_eq!(r.cells(), &[cell]);
        }
    }
}

mod walls {
    use super::*;

    /// A wall with a single gap forces a detour.
    fn gap_grid() -> Grid {
        Grid::from_rows(&[
            "00000", //
            "11101", //
            "00000", //
        ])
        .unwrap()
    }

    #[test]
    fn detour_through_the_gap() {
        let grid = gap_grid();
        let start = Cell::new(0, 0);
        let goal = Cell::new(2, 0);
        for alg in [Algorithm::Bfs, Algorithm::Greedy, Algorithm::AStar] {
            let r = route(alg, &grid, start, goal);
            assert_valid(&r, &grid, start, goal);
            assert!(r.cells().contains(&Cell::new(1, 3)), "{alg} must use the gap");
        }
        // Only BFS and A* promise the 8-hop optimum.
        assert_eq!(route(Algorithm::Bfs, &gap_grid(), start, goal).hops(), 8);
        assert_eq!(route(Algorithm::AStar, &gap_grid(), start, goal).hops(), 8);
    }

    #[test]
    fn sealed_goal_reports_no_path() {
        let grid = Grid::from_rows(&[
            "010", //
            "101", //
            "010", //
        ])
        .unwrap();
        let err = compute_path(
            Algorithm::AStar,
            &grid,
            &no_overlay(),
            Cell::new(0, 0),
            Cell::new(1, 1),
            DEFAULT_NODE_BUDGET,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PathError::NoPath { from: Cell::new(0, 0), to: Cell::new(1, 1) }
        );
    }

    #[test]
    fn blocked_goal_fails_fast() {
        let grid = Grid::from_rows(&["001"]).unwrap();
        let err = compute_path(
            Algorithm::Bfs,
            &grid,
            &no_overlay(),
            Cell::new(0, 0),
            Cell::new(0, 2),
            DEFAULT_NODE_BUDGET,
        )
        .unwrap_err();
        assert!(matches!(err, PathError::NoPath { .. }));
    }
}

mod overlay {
    use super::*;

    #[test]
    fn dynamic_obstacles_divert_the_route() {
        let grid = Grid::open(3, 5);
        let start = Cell::new(1, 0);
        let goal = Cell::new(1, 4);
        let mut blocked = FxHashSet::default();
        blocked.insert(Cell::new(1, 2));

        let r = compute_path(Algorithm::AStar, &grid, &blocked, start, goal, DEFAULT_NODE_BUDGET)
            .unwrap();
        assert!(!r.cells().contains(&Cell::new(1, 2)));
        assert_eq!(r.hops(), 6);
    }

    #[test]
    fn start_under_an_obstacle_is_still_expandable() {
        // A freshly spawned obstacle can cover the cell an agent stands on;
        // the agent must still be able to route out of it.
        let grid = Grid::open(1, 3);
        let start = Cell::new(0, 0);
        let mut blocked = FxHashSet::default();
        blocked.insert(start);

        let r = compute_path(
            Algorithm::Bfs,
            &grid,
            &blocked,
            start,
            Cell::new(0, 2),
            DEFAULT_NODE_BUDGET,
        )
        .unwrap();
        assert_eq!(r.hops(), 2);
    }

    #[test]
    fn overlay_sealing_the_goal_is_no_path() {
        let grid = Grid::open(3, 3);
        let goal = Cell::new(1, 1);
        let mut blocked = FxHashSet::default();
        blocked.insert(goal);
        let err = compute_path(
            Algorithm::Greedy,
            &grid,
            &blocked,
            Cell::new(0, 0),
            goal,
            DEFAULT_NODE_BUDGET,
        )
        .unwrap_err();
        assert!(matches!(err, PathError::NoPath { .. }));
    }
}

mod budget {
    use super::*;

    #[test]
    fn tight_budget_aborts() {
        let grid = Grid::open(20, 20);
        let err = compute_path(
            Algorithm::Bfs,
            &grid,
            &no_overlay(),
            Cell::new(0, 0),
            Cell::new(19, 19),
            4,
        )
        .unwrap_err();
        assert_eq!(err, PathError::BudgetExceeded { budget: 4 });
    }

    #[test]
    fn default_budget_covers_the_default_city() {
        let grid = Grid::default_city();
        let start = grid.find_start().unwrap();
        let goal = grid.find_goal().unwrap();
        for alg in [Algorithm::Bfs, Algorithm::Greedy, Algorithm::AStar] {
            let r = route(alg, &grid, start, goal);
            assert_valid(&r, &grid, start, goal);
        }
    }
}

mod determinism {
    use super::*;

    #[test]
    fn identical_inputs_identical_routes() {
        let grid = Grid::default_city();
        let start = grid.find_start().unwrap();
        let goal = grid.find_goal().unwrap();
        for alg in [Algorithm::Bfs, Algorithm::Greedy, Algorithm::AStar] {
            let a = route(alg, &grid, start, goal);
            let b = route(alg, &grid, start, goal);
            assert_eq!(a, b, "{alg} must be deterministic");
        }
    }
}

mod route_queries {
    use super::*;

    #[test]
    fn remainder_crosses_respects_the_cursor() {
        let grid = Grid::open(1, 5);
        let r = route(Algorithm::Bfs, &grid, Cell::new(0, 0), Cell::new(0, 4));
        let changed = [Cell::new(0, 1)];
        assert!(r.remainder_crosses(0, &changed));
        // Past the changed cell the remainder no longer crosses it.
        assert!(!r.remainder_crosses(2, &changed));
        // A cursor past the end is an empty remainder.
        assert!(!r.remainder_crosses(99, &changed));
    }

    #[test]
    fn get_past_the_end_is_none() {
        let grid = Grid::open(1, 3);
        let r = route(Algorithm::AStar, &grid, Cell::new(0, 0), Cell::new(0, 2));
        assert_eq!(r.get(0), Some(Cell::new(0, 0)));
        assert_eq!(r.get(2), Some(Cell::new(0, 2)));
        assert_eq!(r.get(3), None);
    }
}
