//! Grid change events.
//!
//! Every mutation of the drivable surface (obstacle spawn/expiry, manual
//! edits, full regeneration) is reported as a [`GridEvent`] so the engine
//! can recompute only the routes that actually cross the changed cells.

use av_core::Cell;

/// Why a set of cells changed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventCause {
    ObstacleSpawned,
    ObstacleExpired,
    ManualEdit,
    /// The entire map was replaced. `cells` is empty; every route is stale.
    MapRegenerated,
    /// The routing algorithm changed. `cells` is empty; every route is stale.
    AlgorithmChanged,
}

impl EventCause {
    /// `true` when the event invalidates every route regardless of which
    /// cells it touches.
    #[inline]
    pub fn invalidates_all(self) -> bool {
        matches!(
            self,
            EventCause::MapRegenerated | EventCause::AlgorithmChanged
        )
    }
}

/// A batch of changed cells plus the reason they changed.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridEvent {
    pub cause: EventCause,
    pub cells: Vec<Cell>,
}

impl GridEvent {
    pub fn new(cause: EventCause, cells: Vec<Cell>) -> Self {
        Self { cause, cells }
    }

    /// Event for a single changed cell.
    pub fn single(cause: EventCause, cell: Cell) -> Self {
        Self {
            cause,
            cells: vec![cell],
        }
    }

    /// Event that invalidates everything without naming cells.
    pub fn global(cause: EventCause) -> Self {
        Self {
            cause,
            cells: Vec::new(),
        }
    }
}
