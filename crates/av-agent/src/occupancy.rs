//! The cell-occupancy arena.
//!
//! # Invariant
//!
//! At most one agent holds a cell at any observable instant.  The engine
//! mutates the arena only inside the per-tick agent loop, in ascending
//! agent order, so reservation outcomes are deterministic: when two agents
//! want the same cell on the same tick, the lower-indexed one wins and the
//! other observes the cell as taken.
//!
//! An agent in transit between two cells holds both until it arrives, so
//! no one can slide into the cell it is still leaving.

use rustc_hash::FxHashMap;

use av_core::{AgentId, Cell};

#[derive(Debug, Default, Clone)]
pub struct Occupancy {
    cells: FxHashMap<Cell, AgentId>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `cell` for `agent`.  Succeeds if the cell is free or already
    /// held by the same agent; fails iff a different agent holds it.
    pub fn reserve(&mut self, agent: AgentId, cell: Cell) -> bool {
        match self.cells.get(&cell) {
            Some(&holder) => holder == agent,
            None => {
                self.cells.insert(cell, agent);
                true
            }
        }
    }

    /// Give up `cell` if `agent` holds it.  A release by a non-holder is a
    /// no-op, never a theft.
    pub fn release(&mut self, agent: AgentId, cell: Cell) {
        if self.cells.get(&cell) == Some(&agent) {
            self.cells.remove(&cell);
        }
    }

    /// Release every cell held by `agent`.  Used when an agent is removed.
    pub fn release_all(&mut self, agent: AgentId) {
        self.cells.retain(|_, &mut holder| holder != agent);
    }

    #[inline]
    pub fn is_free(&self, cell: Cell) -> bool {
        !self.cells.contains_key(&cell)
    }

    #[inline]
    pub fn holder_of(&self, cell: Cell) -> Option<AgentId> {
        self.cells.get(&cell).copied()
    }

    /// Number of held cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over `(cell, holder)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, AgentId)> + '_ {
        self.cells.iter().map(|(&c, &a)| (c, a))
    }
}
