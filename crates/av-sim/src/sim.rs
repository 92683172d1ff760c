//! The `Sim` struct and its tick loop.

use rustc_hash::{FxHashMap, FxHashSet};

use av_agent::{decide, Agent, AgentKind, AgentState, Occupancy, Policy, TickContext};
use av_core::{AgentId, AgentRng, Cell, SimClock, SimConfig, SimRng, Tick};
use av_grid::{EventCause, Grid, GridEvent};
use av_path::Algorithm;
use av_traffic::{CrossingZone, LightBoard, ObstacleField};

use crate::observer::SimObserver;
use crate::snapshot::AgentSnapshot;

/// Seconds the player parks at the goal before restarting from Start.
const GOAL_PAUSE_SECS: f32 = 2.0;

/// Minimum respawn distance from any other vehicle, and from the player
/// specifically.
const RESPAWN_MIN_SPACING: u32 = 5;
const RESPAWN_PLAYER_SPACING: u32 = 6;

/// Minimum Manhattan distance for a fresh NPC destination.
const NPC_DEST_MIN_DISTANCE: u32 = 6;

/// Rejection-sampling attempts before falling back to any legal cell.
const SAMPLING_ATTEMPTS: usize = 30;

/// A manual edit of the running simulation's grid.
#[derive(Copy, Clone, Debug)]
pub enum GridEdit {
    ToggleObstacle(Cell),
    ToggleTrafficLight(Cell),
    SetStart(Cell),
    SetGoal(Cell),
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Holds all world state and drives the five-phase tick loop:
///
/// 1. **Environment**: obstacle spawn/expiry and pedestrian movement,
///    both derived from the shared clock.
/// 2. **Events**: grid changes collected this tick (from the environment
///    or from manual operations since the last tick) flag a recompute on
///    exactly the agents whose remaining route crosses a changed cell.
/// 3. **Decisions**: every agent runs the decision core, in ascending
///    `AgentId` order; the occupancy arena is mutated only here, so
///    same-tick cell conflicts resolve deterministically to the lower ID.
/// 4. **Population**: arrivals pick up new goals, removed NPCs respawn.
/// 5. **Observation**: snapshots are taken and observer hooks fire.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
#[derive(Debug)]
pub struct Sim {
    pub config: SimConfig,
    pub clock: SimClock,
    pub grid: Grid,

    pub(crate) lights: LightBoard,
    pub(crate) crossings: CrossingZone,
    pub(crate) obstacles: ObstacleField,

    pub(crate) algorithm: Algorithm,
    pub(crate) node_budget: usize,

    /// Agents in ascending `AgentId` order; index 0 is the player.
    pub(crate) agents: Vec<Agent>,
    /// Per-agent RNG streams, parallel to `agents`.
    pub(crate) rngs: Vec<AgentRng>,
    pub(crate) occupancy: Occupancy,

    /// Cell → agents whose route touches it.  Rebuilt after any recompute;
    /// entries behind an agent's cursor go stale and are re-verified with
    /// `Route::remainder_crosses` before flagging.
    pub(crate) route_index: FxHashMap<Cell, Vec<AgentId>>,

    /// Simulation-level RNG for respawn placement.
    pub(crate) rng: SimRng,

    /// Grid events queued by manual operations, drained next tick.
    pub(crate) pending_events: Vec<GridEvent>,

    /// Seconds the player has been parked at the goal.
    pub(crate) player_goal_secs: f32,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            self.process_tick(now, observer);
            self.clock.advance();
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores
    /// `end_tick`).  Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            self.process_tick(now, observer);
            self.clock.advance();
        }
    }

    /// Switch the routing algorithm.  Takes effect at the next tick: every
    /// agent drops its route and recomputes from its current cell.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        if algorithm == self.algorithm {
            return;
        }
        log::info!("algorithm switched to {algorithm}");
        self.algorithm = algorithm;
        self.pending_events
            .push(GridEvent::global(EventCause::AlgorithmChanged));
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Apply a manual grid edit.  Returns `false` if the grid refused it.
    /// Affected routes are recomputed at the next tick.
    pub fn edit(&mut self, edit: GridEdit) -> bool {
        let changed: Vec<Cell> = match edit {
            GridEdit::ToggleObstacle(cell) => {
                if !self.grid.toggle_obstacle(cell) {
                    return false;
                }
                vec![cell]
            }
            GridEdit::ToggleTrafficLight(cell) => {
                if !self.grid.toggle_traffic_light(cell) {
                    return false;
                }
                self.lights.sync_with_grid(&self.grid);
                vec![cell]
            }
            GridEdit::SetStart(cell) => {
                let old = self.grid.find_start();
                if !self.grid.set_start(cell) {
                    return false;
                }
                old.into_iter().chain([cell]).collect()
            }
            GridEdit::SetGoal(cell) => {
                let old = self.grid.find_goal();
                if !self.grid.set_goal(cell) {
                    return false;
                }
                // The player keeps chasing the marker.
                self.agents[0].set_goal(cell);
                old.into_iter().chain([cell]).collect()
            }
        };
        self.pending_events
            .push(GridEvent::new(EventCause::ManualEdit, changed));
        true
    }

    /// Replace the whole map with a freshly generated one and re-place the
    /// population.  Every route is recomputed at the next tick.
    pub fn regenerate(&mut self, seed: u64) {
        log::info!("regenerating map with seed {seed}");
        self.grid.generate_random(&mut SimRng::new(seed));
        self.obstacles.clear();
        self.lights.sync_with_grid(&self.grid);
        self.crossings.sync_with_grid(&self.grid);
        self.occupancy = Occupancy::new();
        self.route_index.clear();
        self.player_goal_secs = 0.0;

        let start = self.grid.find_start().unwrap_or(Cell::new(0, 0));
        let goal = self.grid.find_goal().unwrap_or(start);
        self.reset_agent(0, start, goal);

        for i in 1..self.agents.len() {
            match self.sample_respawn_cell() {
                Some(cell) => {
                    let dest = pick_distant_destination(&self.grid, cell, &mut self.rngs[i]);
                    self.reset_agent(i, cell, dest);
                }
                None => {
                    // The new map has no free road cell for this NPC; keep
                    // it out and let the respawn phase retry each tick.
                    let agent = &mut self.agents[i];
                    agent.state = AgentState::Removed;
                    agent.speed = 0.0;
                    agent.route = None;
                }
            }
        }

        self.pending_events
            .push(GridEvent::global(EventCause::MapRegenerated));
    }

    /// Flag every agent for a route recompute from its current cell.
    pub fn recompute_all(&mut self) {
        for agent in &mut self.agents {
            if agent.state != AgentState::Removed {
                agent.request_recompute();
            }
        }
    }

    /// Read-only view of the agents, ascending `AgentId` order.
    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Read-only view of the light board.
    #[inline]
    pub fn lights_view(&self) -> &LightBoard {
        &self.lights
    }

    /// Read-only view of the pedestrian roster.
    #[inline]
    pub fn crossings_view(&self) -> &CrossingZone {
        &self.crossings
    }

    /// Live dynamic obstacles.
    #[inline]
    pub fn obstacles_view(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// Per-agent state export at the current tick boundary.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|a| AgentSnapshot {
                id: a.id,
                kind: a.kind,
                cell: a.cell,
                pos: a.pos,
                heading_degrees: a.heading.degrees(),
                speed: a.speed,
                state: a.state,
                route_progress: a.route_progress(),
            })
            .collect()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) {
        let dt = self.clock.tick_duration_secs;

        // ── Phase 1: clock-derived environment ────────────────────────────
        let occupied: FxHashSet<Cell> = self.occupancy.iter().map(|(c, _)| c).collect();
        let player_cell = self.agents[0].cell;
        let mut events = self
            .obstacles
            .tick(&self.grid, self.clock, &occupied, player_cell);
        self.crossings.tick(dt);

        events.append(&mut self.pending_events);

        // ── Phase 2: route invalidation, affected agents only ─────────────
        for event in &events {
            observer.on_grid_event(now, event);
        }
        if !events.is_empty() {
            self.apply_events(&events);
        }

        // ── Phase 3: agent decisions, ascending AgentId order ─────────────
        let mut any_recompute = false;
        let mut arrived: Vec<usize> = Vec::new();
        let mut removed_now: Vec<AgentId> = Vec::new();
        {
            let ctx = TickContext {
                grid: &self.grid,
                blocked: self.obstacles.blocked(),
                lights: &self.lights,
                crossings: &self.crossings,
                clock: self.clock,
                algorithm: self.algorithm,
                node_budget: self.node_budget,
            };
            for (i, agent) in self.agents.iter_mut().enumerate() {
                let outcome = decide(agent, &ctx, &mut self.occupancy);
                any_recompute |= outcome.recomputed;
                if outcome.reached_goal {
                    arrived.push(i);
                }
                if outcome.removed {
                    removed_now.push(agent.id);
                }
            }
        }

        // ── Phase 4: population upkeep ────────────────────────────────────
        for i in arrived {
            self.handle_arrival(i, dt);
        }
        for id in removed_now {
            log::info!("agent {id} stuck past its timeout, removed");
            observer.on_agent_removed(now, id);
        }
        self.respawn_removed(now, observer);

        if any_recompute {
            self.rebuild_route_index();
        }

        // ── Phase 5: observation ──────────────────────────────────────────
        debug_assert!(self.occupancy_consistent(), "occupancy invariant broken");
        let snapshots = self.snapshot();
        observer.on_tick_end(now, &snapshots);
    }

    /// Flag recomputes for agents whose remaining route crosses a changed
    /// cell.  Global causes flag everyone.
    fn apply_events(&mut self, events: &[GridEvent]) {
        let mut flagged = 0usize;
        for event in events {
            if event.cause.invalidates_all() {
                for agent in &mut self.agents {
                    if agent.state != AgentState::Removed {
                        agent.request_recompute();
                        flagged += 1;
                    }
                }
                continue;
            }
            for &cell in &event.cells {
                let Some(ids) = self.route_index.get(&cell) else {
                    continue;
                };
                for &id in ids {
                    let agent = &mut self.agents[id.index()];
                    if agent.state == AgentState::Removed || agent.needs_route {
                        continue;
                    }
                    let crosses = agent
                        .route
                        .as_ref()
                        .is_some_and(|r| r.remainder_crosses(agent.cursor, &[cell]));
                    if crosses {
                        agent.request_recompute();
                        flagged += 1;
                    }
                }
            }
        }
        if flagged > 0 {
            log::debug!("grid events flagged {flagged} route recomputes");
        }
    }

    /// Rebuild the cell → agents reverse index from every live route's
    /// unconsumed remainder.
    fn rebuild_route_index(&mut self) {
        self.route_index.clear();
        for agent in &self.agents {
            if agent.state == AgentState::Removed {
                continue;
            }
            let Some(route) = &agent.route else { continue };
            for &cell in &route.cells()[agent.cursor..] {
                self.route_index.entry(cell).or_default().push(agent.id);
            }
        }
    }

    /// Goal logic: the player parks briefly and restarts from Start; an NPC
    /// immediately picks a fresh distant destination.
    fn handle_arrival(&mut self, index: usize, dt: f32) {
        if self.agents[index].kind == AgentKind::Player {
            self.player_goal_secs += dt;
            if self.player_goal_secs >= GOAL_PAUSE_SECS {
                self.restart_player();
            }
        } else {
            let from = self.agents[index].cell;
            let dest = pick_distant_destination(&self.grid, from, &mut self.rngs[index]);
            self.agents[index].set_goal(dest);
        }
    }

    /// Send the player back to the Start marker for another lap.  Waits
    /// (leaving the pause timer expired) while the Start cell is taken.
    fn restart_player(&mut self) {
        let Some(start) = self.grid.find_start() else { return };
        let Some(goal) = self.grid.find_goal() else { return };
        let player = self.agents[0].id;
        if self.occupancy.holder_of(start).is_some_and(|h| h != player) {
            return;
        }
        self.player_goal_secs = 0.0;
        self.reset_agent(0, start, goal);
        log::debug!("player restarted from {start}");
    }

    /// Re-place an agent at `cell` with a fresh goal and no route.
    fn reset_agent(&mut self, index: usize, cell: Cell, goal: Cell) {
        let agent = &mut self.agents[index];
        self.occupancy.release_all(agent.id);
        agent.cell = cell;
        agent.pos = cell.center();
        agent.speed = 0.0;
        agent.state = AgentState::Idle;
        agent.blocked_secs = 0.0;
        agent.stuck_secs = 0.0;
        agent.detour_requested = false;
        agent.set_goal(goal);
        self.occupancy.reserve(agent.id, cell);
    }

    /// Bring every removed NPC back at a sampled spawn cell.  An NPC stays
    /// out (and is retried next tick) when no legal cell exists.
    fn respawn_removed<O: SimObserver>(&mut self, now: Tick, observer: &mut O) {
        for i in 0..self.agents.len() {
            if self.agents[i].state != AgentState::Removed
                || self.agents[i].kind != AgentKind::Npc
            {
                continue;
            }
            let Some(cell) = self.sample_respawn_cell() else {
                continue;
            };
            let dest = pick_distant_destination(&self.grid, cell, &mut self.rngs[i]);
            self.reset_agent(i, cell, dest);
            self.agents[i].spawn_delay_secs = Policy::npc_spawn_delay(&mut self.rngs[i]);
            let id = self.agents[i].id;
            log::debug!("agent {id} respawned at {cell}");
            observer.on_agent_respawned(now, id, cell);
        }
    }

    /// Sample a spawn cell away from every live vehicle.  Falls back to any
    /// free road cell when the spacing constraint cannot be met.
    fn sample_respawn_cell(&mut self) -> Option<Cell> {
        let legal: Vec<Cell> = self
            .grid
            .road_cells()
            .into_iter()
            .filter(|&c| self.occupancy.is_free(c) && !self.obstacles.blocked().contains(&c))
            .collect();
        if legal.is_empty() {
            return None;
        }

        let spaced = |cell: Cell, agents: &[Agent]| {
            agents.iter().all(|a| {
                if a.state == AgentState::Removed {
                    return true;
                }
                let min = if a.kind == AgentKind::Player {
                    RESPAWN_PLAYER_SPACING
                } else {
                    RESPAWN_MIN_SPACING
                };
                cell.manhattan(a.cell) >= min
            })
        };

        for _ in 0..SAMPLING_ATTEMPTS {
            let cell = *self.rng.choose(&legal)?;
            if spaced(cell, &self.agents) {
                return Some(cell);
            }
        }
        self.rng.choose(&legal).copied()
    }

    /// Debug-build check: every non-removed agent holds its own cell, and
    /// no two agents hold the same cell (guaranteed by `Occupancy` itself,
    /// re-checked from the agent side).
    fn occupancy_consistent(&self) -> bool {
        self.agents.iter().all(|a| {
            a.state == AgentState::Removed
                || a.spawn_delay_secs > 0.0
                || self.occupancy.holder_of(a.cell) == Some(a.id)
        })
    }
}

// ── Destination sampling ──────────────────────────────────────────────────────

/// A random road cell at least [`NPC_DEST_MIN_DISTANCE`] away from `from`,
/// falling back to any road cell other than `from`.
pub(crate) fn pick_distant_destination(grid: &Grid, from: Cell, rng: &mut AgentRng) -> Cell {
    let roads = grid.road_cells();
    for _ in 0..SAMPLING_ATTEMPTS {
        if let Some(&cell) = rng.choose(&roads) {
            if cell.manhattan(from) >= NPC_DEST_MIN_DISTANCE {
                return cell;
            }
        }
    }
    rng.choose(&roads)
        .copied()
        .filter(|&c| c != from)
        .unwrap_or(from)
}
