//! Dynamic obstacles: roadwork, accidents, and similar temporary blockages.
//!
//! # Overlay, not recolor
//!
//! Obstacles never mutate the grid.  They live in an overlay set that the
//! pathfinder and the movement logic consult on top of the static map, so
//! expiry is a pure removal and manual map edits never collide with
//! obstacle state.
//!
//! # Spawn discipline
//!
//! A spawn is attempted every [`ObstacleField::spawn_interval_secs`] on a
//! random plain Road cell, skipping marker and infrastructure cells, cells
//! already blocked or occupied by a vehicle, and cells close to the player
//! (no spawning under someone's wheels).  At most
//! [`ObstacleField::max_live`] obstacles exist at once.

use rustc_hash::FxHashSet;

use av_core::{Cell, ObstacleId, SimClock, SimRng, Tick};
use av_grid::{CellKind, EventCause, Grid, GridEvent};

/// Cells around the player kept clear of fresh obstacles.
const PLAYER_CLEARANCE_CELLS: u32 = 3;

/// Obstacle lifetime bounds, seconds.
const DURATION_MIN_SECS: f32 = 10.0;
const DURATION_MAX_SECS: f32 = 30.0;

// ── Kinds ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObstacleKind {
    Roadwork,
    Accident,
    Construction,
    Debris,
}

impl ObstacleKind {
    const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Roadwork,
        ObstacleKind::Accident,
        ObstacleKind::Construction,
        ObstacleKind::Debris,
    ];
}

impl std::fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ObstacleKind::Roadwork => "roadwork",
            ObstacleKind::Accident => "accident",
            ObstacleKind::Construction => "construction",
            ObstacleKind::Debris => "debris",
        })
    }
}

/// One live obstacle.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicObstacle {
    pub id: ObstacleId,
    pub cell: Cell,
    pub kind: ObstacleKind,
    pub spawned_at: Tick,
    pub duration_secs: f32,
}

impl DynamicObstacle {
    /// `true` once the obstacle's lifetime has elapsed.
    pub fn expired(&self, clock: SimClock) -> bool {
        clock.secs_since(self.spawned_at) >= self.duration_secs
    }
}

// ── ObstacleField ─────────────────────────────────────────────────────────────

/// Spawns, tracks, and expires dynamic obstacles.
#[derive(Debug)]
pub struct ObstacleField {
    live: Vec<DynamicObstacle>,
    overlay: FxHashSet<Cell>,
    next_id: u32,
    last_spawn_secs: f32,
    rng: SimRng,
    pub spawn_interval_secs: f32,
    pub max_live: usize,
}

impl ObstacleField {
    pub fn new(rng: SimRng) -> Self {
        Self {
            live: Vec::new(),
            overlay: FxHashSet::default(),
            next_id: 0,
            last_spawn_secs: 0.0,
            rng,
            spawn_interval_secs: 15.0,
            max_live: 3,
        }
    }

    /// The dynamic-obstacle overlay handed to the pathfinder.
    #[inline]
    pub fn blocked(&self) -> &FxHashSet<Cell> {
        &self.overlay
    }

    #[inline]
    pub fn live(&self) -> &[DynamicObstacle] {
        &self.live
    }

    /// Drop every live obstacle without emitting events.  Used when the map
    /// is regenerated (the regeneration event already invalidates all
    /// routes).
    pub fn clear(&mut self) {
        self.live.clear();
        self.overlay.clear();
        self.last_spawn_secs = 0.0;
    }

    /// Expire aged obstacles and attempt a spawn when the interval is due.
    ///
    /// `occupied` holds every cell currently reserved by a vehicle;
    /// `player_cell` anchors the spawn clearance zone.  Returns one
    /// [`GridEvent`] per expiry batch and per spawn.
    pub fn tick(
        &mut self,
        grid: &Grid,
        clock: SimClock,
        occupied: &FxHashSet<Cell>,
        player_cell: Cell,
    ) -> Vec<GridEvent> {
        let mut events = Vec::new();

        let expired: Vec<Cell> = self
            .live
            .iter()
            .filter(|o| o.expired(clock))
            .map(|o| o.cell)
            .collect();
        if !expired.is_empty() {
            self.live.retain(|o| !o.expired(clock));
            for cell in &expired {
                self.overlay.remove(cell);
            }
            events.push(GridEvent::new(EventCause::ObstacleExpired, expired));
        }

        let elapsed = clock.elapsed_secs();
        if elapsed - self.last_spawn_secs >= self.spawn_interval_secs {
            self.last_spawn_secs = elapsed;
            if self.live.len() < self.max_live {
                if let Some(obstacle) = self.try_spawn(grid, clock, occupied, player_cell) {
                    self.overlay.insert(obstacle.cell);
                    events.push(GridEvent::single(EventCause::ObstacleSpawned, obstacle.cell));
                    self.live.push(obstacle);
                }
            }
        }

        events
    }

    fn try_spawn(
        &mut self,
        grid: &Grid,
        clock: SimClock,
        occupied: &FxHashSet<Cell>,
        player_cell: Cell,
    ) -> Option<DynamicObstacle> {
        let candidates: Vec<Cell> = grid
            .road_cells()
            .into_iter()
            .filter(|&c| {
                grid.kind(c) == Some(CellKind::Road)
                    && !self.overlay.contains(&c)
                    && !occupied.contains(&c)
                    && c.manhattan(player_cell) > PLAYER_CLEARANCE_CELLS
            })
            .collect();

        let cell = *self.rng.choose(&candidates)?;
        let kind = *self.rng.choose(&ObstacleKind::ALL)?;
        let duration_secs = self.rng.gen_range(DURATION_MIN_SECS..=DURATION_MAX_SECS);
        let id = ObstacleId(self.next_id);
        self.next_id += 1;

        Some(DynamicObstacle { id, cell, kind, spawned_at: clock.current_tick, duration_secs })
    }
}
