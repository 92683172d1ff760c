//! Grid geometry: discrete cells, continuous positions, and headings.
//!
//! The grid is 4-connected: agents move between orthogonally adjacent cells
//! only.  Discrete logic (pathfinding, occupancy, stop/go decisions) works in
//! [`Cell`] coordinates; movement interpolation works in [`Vec2`] cell units,
//! where one unit equals one cell side and a cell's center sits at
//! `(col + 0.5, row + 0.5)`.

use std::fmt;

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A discrete grid coordinate, `(row, col)`.
///
/// Stored as `i32` so neighbour arithmetic near the grid border cannot wrap;
/// out-of-bounds cells are rejected by the grid's bounds check, not here.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Manhattan (L1) distance in whole cells.
    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The four orthogonal neighbours in fixed order: up, down, left, right.
    ///
    /// The order is part of the pathfinding contract — BFS discovery order
    /// (and therefore tie-breaking) depends on it.
    #[inline]
    pub fn neighbors4(self) -> [Cell; 4] {
        [
            Cell::new(self.row - 1, self.col),
            Cell::new(self.row + 1, self.col),
            Cell::new(self.row, self.col - 1),
            Cell::new(self.row, self.col + 1),
        ]
    }

    /// `true` if `other` is orthogonally adjacent (Manhattan distance 1).
    #[inline]
    pub fn is_adjacent4(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }

    /// Continuous position of this cell's center, in cell units.
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.col as f32 + 0.5, self.row as f32 + 0.5)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A continuous position in cell units (`x` along columns, `y` along rows).
///
/// Renderers multiply by their tile size to get pixels; the engine never
/// deals in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`, in cell units.
    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move up to `step` cell units toward `target` without overshooting.
    ///
    /// Returns the new position.  Snaps exactly onto `target` once within
    /// `step` of it, so arrival checks can use equality-with-epsilon safely.
    pub fn step_toward(self, target: Vec2, step: f32) -> Vec2 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= step || dist <= f32::EPSILON {
            return target;
        }
        Vec2::new(self.x + dx / dist * step, self.y + dy / dist * step)
    }

    /// The discrete cell containing this position.
    #[inline]
    pub fn cell(self) -> Cell {
        Cell::new(self.y.floor() as i32, self.x.floor() as i32)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Heading ───────────────────────────────────────────────────────────────────

/// Cardinal movement direction on the 4-connected grid.
///
/// Degrees follow the clockwise-from-up screen convention: North (decreasing
/// row) is 0°, East 90°, South 180°, West 270°.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

impl Heading {
    /// Rotation in degrees, clockwise from up.
    #[inline]
    pub fn degrees(self) -> f32 {
        match self {
            Heading::North => 0.0,
            Heading::East => 90.0,
            Heading::South => 180.0,
            Heading::West => 270.0,
        }
    }

    /// Heading of the step `from → to`.
    ///
    /// Returns `None` when the cells are not 4-adjacent (including
    /// `from == to`), since no single cardinal step connects them.
    pub fn between(from: Cell, to: Cell) -> Option<Heading> {
        match (to.row - from.row, to.col - from.col) {
            (-1, 0) => Some(Heading::North),
            (1, 0) => Some(Heading::South),
            (0, -1) => Some(Heading::West),
            (0, 1) => Some(Heading::East),
            _ => None,
        }
    }
}
