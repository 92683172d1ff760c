//! Grid storage and manipulation.
//!
//! # Data layout
//!
//! The map is a flat row-major `Vec<CellKind>` with fixed `rows × cols`
//! dimensions.  Edits recolor cells in place; the vector is never
//! reallocated after construction or regeneration, so references to the
//! dimensions stay valid across any sequence of edits.
//!
//! # Invariants
//!
//! - The Start and Goal markers are always passable kinds.
//! - Edits that disconnect the map are legal grid states: pathfinding
//!   reports no path, the grid itself never rejects them.

use av_core::{Cell, CoreError, CoreResult, SimRng};

// ── CellKind ──────────────────────────────────────────────────────────────────

/// What occupies a grid cell.
///
/// Everything except `Blocked` is passable for vehicles.  The single-char
/// codes mirror the external map format: `0` road, `1` blocked, `S` start,
/// `G` goal, `T` traffic light, `C` pedestrian crossing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Road,
    Blocked,
    Start,
    Goal,
    TrafficLight,
    Crossing,
}

impl CellKind {
    /// `true` for every kind a vehicle may drive over.
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, CellKind::Blocked)
    }

    /// `true` for kinds that must never be overwritten by a dynamic
    /// obstacle (markers and infrastructure).
    #[inline]
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            CellKind::Start | CellKind::Goal | CellKind::TrafficLight | CellKind::Crossing
        )
    }

    /// Single-character map code.
    pub fn code(self) -> char {
        match self {
            CellKind::Road => '0',
            CellKind::Blocked => '1',
            CellKind::Start => 'S',
            CellKind::Goal => 'G',
            CellKind::TrafficLight => 'T',
            CellKind::Crossing => 'C',
        }
    }

    /// Parse a single-character map code.
    pub fn from_code(code: char) -> Option<CellKind> {
        match code {
            '0' => Some(CellKind::Road),
            '1' => Some(CellKind::Blocked),
            'S' => Some(CellKind::Start),
            'G' => Some(CellKind::Goal),
            'T' => Some(CellKind::TrafficLight),
            'C' => Some(CellKind::Crossing),
            _ => None,
        }
    }
}

// ── Default city map ──────────────────────────────────────────────────────────

/// The built-in 20×12 city: ring roads, building blocks, two light-guarded
/// arteries, and a third light near the goal approach.
const DEFAULT_CITY: [&str; 12] = [
    "11100000111100001111",
    "1S001100000001100011",
    "00000000100100000000",
    "11011101100110111011",
    "0000T0000000000T0000",
    "11011101111110111011",
    "00000000000000000000",
    "11011011011011011011",
    "00000000000000000000",
    "11011011010110110111",
    "110000000000T000000G",
    "11111011111110111111",
];

// ── Grid ──────────────────────────────────────────────────────────────────────

/// The mutable city grid.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Construct an all-road grid of the given dimensions.
    pub fn open(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellKind::Road; (rows * cols) as usize],
        }
    }

    /// Construct the built-in default city, crossings derived.
    pub fn default_city() -> Self {
        let mut grid =
            Self::from_rows(&DEFAULT_CITY).expect("built-in map is well-formed");
        grid.derive_crossings();
        grid
    }

    /// Parse a grid from map-code strings, one per row.
    pub fn from_rows(rows: &[&str]) -> CoreResult<Self> {
        let width = rows.first().ok_or(CoreError::EmptyMap)?.chars().count();
        let mut cells = Vec::with_capacity(rows.len() * width);
        for (r, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(CoreError::RaggedRow {
                    row: r,
                    len,
                    expected: width,
                });
            }
            for code in row.chars() {
                let kind = CellKind::from_code(code)
                    .ok_or(CoreError::UnknownCode { code, row: r })?;
                cells.push(kind);
            }
        }
        Ok(Self {
            rows: rows.len() as u32,
            cols: width as u32,
            cells,
        })
    }

    // ── Dimensions & bounds ───────────────────────────────────────────────

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as u32) < self.rows
            && (cell.col as u32) < self.cols
    }

    #[inline]
    fn idx(&self, cell: Cell) -> usize {
        cell.row as usize * self.cols as usize + cell.col as usize
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Cell kind, `None` out of bounds.
    #[inline]
    pub fn kind(&self, cell: Cell) -> Option<CellKind> {
        if self.in_bounds(cell) {
            Some(self.cells[self.idx(cell)])
        } else {
            None
        }
    }

    /// `true` if `cell` is in bounds and statically passable.  Dynamic
    /// obstacles live in a separate overlay owned by the obstacle field.
    #[inline]
    pub fn is_passable(&self, cell: Cell) -> bool {
        self.kind(cell).is_some_and(CellKind::is_passable)
    }

    /// The Start marker cell, if any.
    pub fn find_start(&self) -> Option<Cell> {
        self.find_kind(CellKind::Start)
    }

    /// The Goal marker cell, if any.
    pub fn find_goal(&self) -> Option<Cell> {
        self.find_kind(CellKind::Goal)
    }

    /// All traffic-light cells in row-major order.
    pub fn light_cells(&self) -> Vec<Cell> {
        self.cells_of_kind(CellKind::TrafficLight)
    }

    /// All pedestrian-crossing cells in row-major order.
    pub fn crossing_cells(&self) -> Vec<Cell> {
        self.cells_of_kind(CellKind::Crossing)
    }

    /// Every passable cell in row-major order.  Used for NPC spawn and
    /// destination sampling.
    pub fn road_cells(&self) -> Vec<Cell> {
        self.all_cells()
            .filter(|&c| self.is_passable(c))
            .collect()
    }

    fn find_kind(&self, kind: CellKind) -> Option<Cell> {
        self.all_cells().find(|&c| self.cells[self.idx(c)] == kind)
    }

    fn cells_of_kind(&self, kind: CellKind) -> Vec<Cell> {
        self.all_cells()
            .filter(|&c| self.cells[self.idx(c)] == kind)
            .collect()
    }

    fn all_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let cols = self.cols as i32;
        (0..self.rows as i32)
            .flat_map(move |r| (0..cols).map(move |c| Cell::new(r, c)))
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    /// Recolor `cell` to `kind`.  Returns `false` out of bounds.
    pub fn set_kind(&mut self, cell: Cell, kind: CellKind) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        let i = self.idx(cell);
        self.cells[i] = kind;
        true
    }

    /// Toggle a cell between Road and Blocked.  Marker cells are left
    /// untouched (returns `false`).
    pub fn toggle_obstacle(&mut self, cell: Cell) -> bool {
        match self.kind(cell) {
            Some(CellKind::Road) => self.set_kind(cell, CellKind::Blocked),
            Some(CellKind::Blocked) => self.set_kind(cell, CellKind::Road),
            _ => false,
        }
    }

    /// Toggle a traffic light on a Road cell (or back to Road).
    pub fn toggle_traffic_light(&mut self, cell: Cell) -> bool {
        match self.kind(cell) {
            Some(CellKind::Road) => self.set_kind(cell, CellKind::TrafficLight),
            Some(CellKind::TrafficLight) => self.set_kind(cell, CellKind::Road),
            _ => false,
        }
    }

    /// Move the Start marker to `cell`, reverting the previous one to Road.
    ///
    /// Refuses Blocked targets so the Start-is-passable invariant holds.
    pub fn set_start(&mut self, cell: Cell) -> bool {
        self.move_marker(cell, CellKind::Start)
    }

    /// Move the Goal marker to `cell`, reverting the previous one to Road.
    pub fn set_goal(&mut self, cell: Cell) -> bool {
        self.move_marker(cell, CellKind::Goal)
    }

    fn move_marker(&mut self, cell: Cell, marker: CellKind) -> bool {
        match self.kind(cell) {
            None | Some(CellKind::Blocked) => return false,
            _ => {}
        }
        if let Some(old) = self.find_kind(marker) {
            let i = self.idx(old);
            self.cells[i] = CellKind::Road;
        }
        self.set_kind(cell, marker)
    }

    // ── Generation ────────────────────────────────────────────────────────

    /// Regenerate a random city-like map in place.
    ///
    /// Lays a road lattice every third row/column, opens random extra
    /// connections, places Start and a far-away Goal, sprinkles up to three
    /// traffic lights, and derives crossing cells from the corridors.
    pub fn generate_random(&mut self, rng: &mut SimRng) {
        self.cells.fill(CellKind::Blocked);

        const SPACING: i32 = 3;
        for r in (0..self.rows as i32).step_by(SPACING as usize) {
            for c in 0..self.cols as i32 {
                self.set_kind(Cell::new(r, c), CellKind::Road);
            }
        }
        for c in (0..self.cols as i32).step_by(SPACING as usize) {
            for r in 0..self.rows as i32 {
                self.set_kind(Cell::new(r, c), CellKind::Road);
            }
        }

        // Random extra connections, ~8% of the area.
        let extras = (self.rows * self.cols) as usize * 8 / 100;
        for _ in 0..extras {
            let r = rng.gen_range(0..self.rows as i32);
            let c = rng.gen_range(0..self.cols as i32);
            self.set_kind(Cell::new(r, c), CellKind::Road);
        }

        let mut roads = self.cells_of_kind(CellKind::Road);
        if let Some(&start) = rng.choose(&roads) {
            self.set_kind(start, CellKind::Start);
            roads.retain(|&c| c != start);

            // Goal as far from start as possible.
            if let Some(&goal) = roads.iter().max_by_key(|&&c| c.manhattan(start)) {
                self.set_kind(goal, CellKind::Goal);
                roads.retain(|&c| c != goal);
            }

            for _ in 0..3 {
                let Some(&light) = rng.choose(&roads) else { break };
                self.set_kind(light, CellKind::TrafficLight);
                roads.retain(|&c| c != light);
            }
        }

        self.derive_crossings();
    }

    /// Recolor corridor cells to pedestrian crossings.
    ///
    /// A corridor cell is a Road squeezed between two Blocked cells with the
    /// road continuing straight through it, the natural place for a zebra
    /// crossing between two building fronts.
    pub fn derive_crossings(&mut self) {
        let mut crossings = Vec::new();
        for r in 1..self.rows as i32 - 1 {
            for c in 1..self.cols as i32 - 1 {
                let cell = Cell::new(r, c);
                if self.kind(cell) != Some(CellKind::Road) {
                    continue;
                }
                let up = Cell::new(r - 1, c);
                let down = Cell::new(r + 1, c);
                let left = Cell::new(r, c - 1);
                let right = Cell::new(r, c + 1);

                let squeezed_horizontally = self.kind(left) == Some(CellKind::Blocked)
                    && self.kind(right) == Some(CellKind::Blocked)
                    && self.is_passable(up)
                    && self.is_passable(down);
                let squeezed_vertically = self.kind(up) == Some(CellKind::Blocked)
                    && self.kind(down) == Some(CellKind::Blocked)
                    && self.is_passable(left)
                    && self.is_passable(right);

                if squeezed_horizontally || squeezed_vertically {
                    crossings.push(cell);
                }
            }
        }
        for cell in crossings {
            self.set_kind(cell, CellKind::Crossing);
        }
    }
}

impl std::fmt::Display for Grid {
    /// Map-code dump, one row per line.  Handy in test failures.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in 0..self.rows as i32 {
            for c in 0..self.cols as i32 {
                write!(f, "{}", self.cells[self.idx(Cell::new(r, c))].code())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
