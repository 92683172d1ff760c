//! Route representation.

use av_core::Cell;

/// An ordered list of 4-adjacent cells from a start to a destination,
/// both endpoints included.
///
/// Routes are immutable once computed: when the map changes underneath one,
/// the owner recomputes from its current cell rather than patching the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    cells: Vec<Cell>,
}

impl Route {
    /// Wrap a cell sequence.  Callers guarantee 4-adjacency of consecutive
    /// cells; the pathfinders in this crate always produce conforming routes.
    pub(crate) fn new(cells: Vec<Cell>) -> Self {
        debug_assert!(!cells.is_empty());
        debug_assert!(
            cells.windows(2).all(|w| w[0].is_adjacent4(w[1])),
            "route cells must be 4-adjacent"
        );
        Self { cells }
    }

    /// The cells in travel order, endpoints included.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of steps between cells.  A route standing on its destination
    /// has zero hops.
    #[inline]
    pub fn hops(&self) -> usize {
        self.cells.len() - 1
    }

    /// First cell of the route.
    #[inline]
    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    /// Final cell of the route.
    #[inline]
    pub fn destination(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// Cell at position `index`, `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// `true` if any cell at or after `from_index` is in `cells`.
    ///
    /// The engine uses this to decide whether a map change invalidates the
    /// unconsumed remainder of a route.
    pub fn remainder_crosses(&self, from_index: usize, cells: &[Cell]) -> bool {
        self.cells[from_index.min(self.cells.len())..]
            .iter()
            .any(|c| cells.contains(c))
    }
}
