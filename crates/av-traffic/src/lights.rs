//! Traffic lights driven by the global simulation clock.
//!
//! # Synchronization by construction
//!
//! No light carries its own timer.  A light's phase is a pure function of
//! the clock's elapsed seconds and the shared [`LightTiming`], so every
//! light in the city is in the same phase at the same instant and two runs
//! with the same clock agree exactly.  The cycle starts Red:
//!
//! | Interval (default timing) | Phase  |
//! |---------------------------|--------|
//! | [0.0, 4.0)                | Red    |
//! | [4.0, 8.0)                | Green  |
//! | [8.0, 9.5)                | Yellow |

use rustc_hash::FxHashSet;

use av_core::{Cell, SimClock};
use av_grid::Grid;

/// Seconds of Yellow left below which an approaching vehicle treats the
/// light as Red rather than trying to beat the change.
const YELLOW_COMMIT_SECS: f32 = 0.5;

/// Duration of the visual cross-fade at a phase change.  Rendering only;
/// stop/go logic never consults it.
const BLEND_SECS: f32 = 0.3;

// ── Phase & timing ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightPhase {
    Red,
    Green,
    Yellow,
}

/// Phase durations in seconds.  Correct for any positive values.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightTiming {
    pub red_secs: f32,
    pub green_secs: f32,
    pub yellow_secs: f32,
}

impl Default for LightTiming {
    fn default() -> Self {
        Self { red_secs: 4.0, green_secs: 4.0, yellow_secs: 1.5 }
    }
}

impl LightTiming {
    #[inline]
    pub fn cycle_secs(&self) -> f32 {
        self.red_secs + self.green_secs + self.yellow_secs
    }

    /// Phase at `elapsed` seconds since simulation start.
    pub fn phase_at(&self, elapsed: f32) -> LightPhase {
        let t = elapsed.rem_euclid(self.cycle_secs());
        if t < self.red_secs {
            LightPhase::Red
        } else if t < self.red_secs + self.green_secs {
            LightPhase::Green
        } else {
            LightPhase::Yellow
        }
    }

    /// Seconds until the current phase ends.
    pub fn remaining_at(&self, elapsed: f32) -> f32 {
        let t = elapsed.rem_euclid(self.cycle_secs());
        if t < self.red_secs {
            self.red_secs - t
        } else if t < self.red_secs + self.green_secs {
            self.red_secs + self.green_secs - t
        } else {
            self.cycle_secs() - t
        }
    }

    /// Seconds since the current phase began.
    fn into_phase_at(&self, elapsed: f32) -> f32 {
        let t = elapsed.rem_euclid(self.cycle_secs());
        if t < self.red_secs {
            t
        } else if t < self.red_secs + self.green_secs {
            t - self.red_secs
        } else {
            t - self.red_secs - self.green_secs
        }
    }
}

// ── LightBoard ────────────────────────────────────────────────────────────────

/// The set of traffic-light cells plus the shared timing.
#[derive(Clone, Debug, Default)]
pub struct LightBoard {
    cells: FxHashSet<Cell>,
    timing: LightTiming,
}

impl LightBoard {
    pub fn new(timing: LightTiming) -> Self {
        Self { cells: FxHashSet::default(), timing }
    }

    /// Replace the light set with the grid's current `TrafficLight` cells.
    /// Call after any edit that may add or remove a light.
    pub fn sync_with_grid(&mut self, grid: &Grid) {
        self.cells = grid.light_cells().into_iter().collect();
    }

    #[inline]
    pub fn timing(&self) -> LightTiming {
        self.timing
    }

    #[inline]
    pub fn is_light(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// The shared phase of every light at the clock's current instant.
    #[inline]
    pub fn phase(&self, clock: SimClock) -> LightPhase {
        self.timing.phase_at(clock.elapsed_secs())
    }

    /// Seconds until the shared phase changes.
    #[inline]
    pub fn time_remaining(&self, clock: SimClock) -> f32 {
        self.timing.remaining_at(clock.elapsed_secs())
    }

    /// `true` if `cell` is a light showing Red.
    pub fn is_red_at(&self, cell: Cell, clock: SimClock) -> bool {
        self.is_light(cell) && self.phase(clock) == LightPhase::Red
    }

    /// `true` if a vehicle about to enter `cell` must hold: the light is
    /// Red, or Yellow with too little time left to clear the cell.
    pub fn stop_required(&self, cell: Cell, clock: SimClock) -> bool {
        if !self.is_light(cell) {
            return false;
        }
        match self.phase(clock) {
            LightPhase::Red => true,
            LightPhase::Yellow => self.time_remaining(clock) < YELLOW_COMMIT_SECS,
            LightPhase::Green => false,
        }
    }

    /// Cross-fade fraction in `[0, 1]` since the last phase change, for
    /// rendering transitions.
    pub fn blend(&self, clock: SimClock) -> f32 {
        (self.timing.into_phase_at(clock.elapsed_secs()) / BLEND_SECS).min(1.0)
    }
}
