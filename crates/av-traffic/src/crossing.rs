//! Pedestrian crossings and the pedestrian roster.
//!
//! # Lifecycle
//!
//! Pedestrians are created once at startup and never destroyed.  Each one
//! walks back and forth over its assigned crossing; after a randomized
//! number of passes it teleports to a *different* crossing and starts a
//! fresh pass budget, so foot traffic rotates over the whole city.
//!
//! # Vehicle interaction
//!
//! A crossing counts as occupied while any pedestrian assigned to it is on
//! the roadway (walking, not waiting at the kerb).  Vehicles slow down in
//! discrete bands as they approach an occupied crossing; the band table
//! lives in [`speed_band`].

use av_core::{Cell, CrossingId, PedestrianId, SimRng};
use av_grid::Grid;

/// Pass budget bounds per stint at one crossing.
const PASSES_MIN: u8 = 2;
const PASSES_MAX: u8 = 4;

/// Kerb wait between passes, seconds.
const WAIT_MIN_SECS: f32 = 0.5;
const WAIT_MAX_SECS: f32 = 1.5;

/// Walking speed in crossing-widths per second.
const SPEED_MIN: f32 = 0.3;
const SPEED_MAX: f32 = 0.7;

/// Speed multiplier for a vehicle `distance_cells` away from the nearest
/// occupied crossing.  Discrete and non-increasing as distance shrinks.
pub fn speed_band(distance_cells: u32) -> f32 {
    match distance_cells {
        0 | 1 => 0.35,
        2 => 0.50,
        3 => 0.65,
        4 => 0.75,
        _ => 1.0,
    }
}

// ── Crossing & Pedestrian ─────────────────────────────────────────────────────

/// A zebra-crossing cell.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crossing {
    pub id: CrossingId,
    pub cell: Cell,
}

/// One pedestrian walking a crossing.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pedestrian {
    pub id: PedestrianId,
    /// Index into the crossing roster.
    pub crossing: CrossingId,
    /// Position across the roadway, `0.0` near kerb to `1.0` far kerb.
    pub progress: f32,
    /// Walking back toward the near kerb.
    pub returning: bool,
    /// Passes left at the current crossing before relocating.
    pub passes_left: u8,
    /// Kerb wait remaining; on the roadway iff zero.
    pub wait_secs: f32,
    /// Walking speed in crossing-widths per second.
    pub speed: f32,
}

impl Pedestrian {
    /// `true` while the pedestrian is on the roadway rather than the kerb.
    #[inline]
    pub fn on_roadway(self) -> bool {
        self.wait_secs <= 0.0
    }
}

// ── CrossingZone ──────────────────────────────────────────────────────────────

/// The crossing roster and pedestrian population.
///
/// Owns a dedicated RNG stream so pedestrian draws never perturb the other
/// subsystems' sequences.
#[derive(Debug)]
pub struct CrossingZone {
    crossings: Vec<Crossing>,
    pedestrians: Vec<Pedestrian>,
    rng: SimRng,
}

impl CrossingZone {
    /// Build the roster from the grid's crossing cells and spawn
    /// `pedestrian_count` pedestrians spread round-robin over them.
    ///
    /// With zero crossings on the map the zone is empty and inert.
    pub fn new(grid: &Grid, pedestrian_count: usize, mut rng: SimRng) -> Self {
        let crossings: Vec<Crossing> = grid
            .crossing_cells()
            .into_iter()
            .enumerate()
            .map(|(i, cell)| Crossing { id: CrossingId(i as u16), cell })
            .collect();

        let mut pedestrians = Vec::new();
        if !crossings.is_empty() {
            for i in 0..pedestrian_count {
                let crossing = crossings[i % crossings.len()].id;
                pedestrians.push(Pedestrian {
                    id: PedestrianId(i as u16),
                    crossing,
                    progress: 0.0,
                    returning: false,
                    passes_left: rng.gen_range(PASSES_MIN..=PASSES_MAX),
                    wait_secs: rng.gen_range(WAIT_MIN_SECS..WAIT_MAX_SECS),
                    speed: rng.gen_range(SPEED_MIN..SPEED_MAX),
                });
            }
        }

        Self { crossings, pedestrians, rng }
    }

    /// Rebuild the roster after the map changed.  Pedestrians are reassigned
    /// round-robin to the new crossings (or parked if there are none).
    pub fn sync_with_grid(&mut self, grid: &Grid) {
        self.crossings = grid
            .crossing_cells()
            .into_iter()
            .enumerate()
            .map(|(i, cell)| Crossing { id: CrossingId(i as u16), cell })
            .collect();
        for (i, ped) in self.pedestrians.iter_mut().enumerate() {
            ped.crossing = if self.crossings.is_empty() {
                CrossingId::INVALID
            } else {
                self.crossings[i % self.crossings.len()].id
            };
            ped.progress = 0.0;
            ped.returning = false;
        }
    }

    #[inline]
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    #[inline]
    pub fn pedestrians(&self) -> &[Pedestrian] {
        &self.pedestrians
    }

    /// Advance every pedestrian by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        for i in 0..self.pedestrians.len() {
            let mut ped = self.pedestrians[i];
            if ped.crossing == CrossingId::INVALID {
                continue;
            }

            if ped.wait_secs > 0.0 {
                ped.wait_secs = (ped.wait_secs - dt).max(0.0);
                self.pedestrians[i] = ped;
                continue;
            }

            let step = ped.speed * dt;
            if ped.returning {
                ped.progress -= step;
            } else {
                ped.progress += step;
            }

            if !(0.0..=1.0).contains(&ped.progress) {
                ped.progress = ped.progress.clamp(0.0, 1.0);
                ped.passes_left = ped.passes_left.saturating_sub(1);
                if ped.passes_left == 0 {
                    self.relocate(&mut ped);
                } else {
                    ped.returning = !ped.returning;
                    ped.wait_secs = self.rng.gen_range(WAIT_MIN_SECS..WAIT_MAX_SECS);
                }
            }
            self.pedestrians[i] = ped;
        }
    }

    /// Move `ped` to a random crossing other than its current one and reset
    /// its pass budget.  With a single crossing it stays put.
    fn relocate(&mut self, ped: &mut Pedestrian) {
        let others: Vec<CrossingId> = self
            .crossings
            .iter()
            .map(|c| c.id)
            .filter(|&id| id != ped.crossing)
            .collect();
        if let Some(&next) = self.rng.choose(&others) {
            ped.crossing = next;
        }
        ped.progress = 0.0;
        ped.returning = false;
        ped.passes_left = self.rng.gen_range(PASSES_MIN..=PASSES_MAX);
        ped.wait_secs = self.rng.gen_range(WAIT_MIN_SECS..WAIT_MAX_SECS);
    }

    /// Cells of crossings with at least one pedestrian on the roadway.
    pub fn occupied_crossings(&self) -> Vec<Cell> {
        self.crossings
            .iter()
            .filter(|c| {
                self.pedestrians
                    .iter()
                    .any(|p| p.crossing == c.id && p.on_roadway())
            })
            .map(|c| c.cell)
            .collect()
    }

    /// Speed multiplier for a vehicle at `from` heading toward `toward`,
    /// from the nearest occupied crossing ahead of it.  Crossings behind
    /// the vehicle are ignored; `1.0` when nothing ahead is occupied.
    pub fn band_toward(&self, from: Cell, toward: Cell) -> f32 {
        let dr = toward.row - from.row;
        let dc = toward.col - from.col;
        self.occupied_crossings()
            .iter()
            .filter(|c| {
                let ahead = (c.row - from.row) * dr + (c.col - from.col) * dc;
                ahead > 0 || (c.row == from.row && c.col == from.col)
            })
            .map(|&c| speed_band(from.manhattan(c)))
            .fold(1.0, f32::min)
    }

    /// `true` if `cell` is a crossing with a pedestrian on the roadway.
    pub fn is_occupied_crossing(&self, cell: Cell) -> bool {
        self.crossings.iter().any(|c| {
            c.cell == cell
                && self
                    .pedestrians
                    .iter()
                    .any(|p| p.crossing == c.id && p.on_roadway())
        })
    }
}
