//! Agent state.

use av_core::{AgentId, Cell, Heading, Vec2};
use av_path::Route;

use crate::policy::Policy;

/// Where an agent is in its drive cycle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// Not driving: pre-spawn delay, or parked at the goal.
    Idle,
    Moving,
    /// Held still by a light, a pedestrian, or a taken cell.
    Waiting,
    /// A route request is pending this tick.
    Recomputing,
    /// Out of the simulation; NPCs in this state are respawned.
    Removed,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentKind {
    Player,
    Npc,
}

/// One vehicle.
///
/// Discrete position (`cell`) drives all stop/go logic; the continuous
/// `pos` exists for rendering and smooth interpolation between cell
/// centers.  The two agree except mid-transit, when the agent holds both
/// the cell it is leaving and the one it is entering.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub policy: Policy,

    pub cell: Cell,
    pub pos: Vec2,
    pub heading: Heading,
    /// Speed actually driven this tick, cells per second.
    pub speed: f32,
    pub state: AgentState,

    pub route: Option<Route>,
    /// Index into the route of the cell the agent currently occupies (or is
    /// entering).
    pub cursor: usize,
    pub goal: Cell,
    pub needs_route: bool,

    /// Seconds spent blocked behind the current taken cell.
    pub blocked_secs: f32,
    /// Seconds without discrete progress toward the goal.
    pub stuck_secs: f32,
    /// Seconds left before retrying after a failed route request.
    pub no_path_backoff_secs: f32,
    /// Seconds left before a fresh NPC starts driving.
    pub spawn_delay_secs: f32,
    /// One detour recompute per blockage.
    pub detour_requested: bool,
}

impl Agent {
    pub fn new(id: AgentId, kind: AgentKind, policy: Policy, cell: Cell, goal: Cell) -> Self {
        Self {
            id,
            kind,
            policy,
            cell,
            pos: cell.center(),
            heading: Heading::East,
            speed: 0.0,
            state: AgentState::Idle,
            route: None,
            cursor: 0,
            goal,
            needs_route: true,
            blocked_secs: 0.0,
            stuck_secs: 0.0,
            no_path_backoff_secs: 0.0,
            spawn_delay_secs: 0.0,
            detour_requested: false,
        }
    }

    /// Retarget the agent and drop its current route.
    pub fn set_goal(&mut self, goal: Cell) {
        self.goal = goal;
        self.route = None;
        self.cursor = 0;
        self.needs_route = true;
        self.no_path_backoff_secs = 0.0;
    }

    /// Flag the route for recomputation from the current cell.
    pub fn request_recompute(&mut self) {
        self.needs_route = true;
        self.no_path_backoff_secs = 0.0;
    }

    /// `true` once the agent occupies its goal cell.
    #[inline]
    pub fn at_goal(&self) -> bool {
        self.cell == self.goal
    }

    /// The next cell on the route, `None` at the destination or without a
    /// route.
    pub fn next_cell(&self) -> Option<Cell> {
        self.route.as_ref()?.get(self.cursor + 1)
    }

    /// Fraction of the current route already consumed, `0.0` without one.
    pub fn route_progress(&self) -> f32 {
        match &self.route {
            Some(r) if r.hops() > 0 => self.cursor as f32 / r.hops() as f32,
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Reset per-blockage counters after discrete progress.
    pub(crate) fn clear_blockage(&mut self) {
        self.blocked_secs = 0.0;
        self.stuck_secs = 0.0;
        self.detour_requested = false;
    }
}
