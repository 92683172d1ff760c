//! The per-tick decision core, shared by the player and every NPC.
//!
//! # Evaluation order
//!
//! One call to [`decide`] advances one agent by one tick.  The checks run
//! in a fixed order, and the first one that applies wins:
//!
//! 1. Route: no route or a recompute flag means pathfind from the agent's
//!    *current* cell.  A failed search parks the agent in `Waiting` with a
//!    short retry backoff.
//! 2. Red light: a light on the next cell requiring a stop holds the agent
//!    before it enters the cell.  Light waits are bounded by the cycle, so
//!    they never count toward the stuck timeout.
//! 3. Pedestrians: an occupied crossing ahead applies the speed band; a
//!    hard-stop policy (the player) halts when the *next* cell is an
//!    occupied crossing.
//! 4. Occupancy: a taken next cell means waiting up to the agent's
//!    patience, then creeping at the crawl factor while a one-shot detour
//!    recompute is requested.  The contested cell is entered the instant
//!    its holder vacates.
//! 5. Stuck timeout: past `stuck_timeout_secs` without discrete progress a
//!    removable agent leaves the simulation; the player keeps crawling.
//! 6. Advance: reserve the next cell, interpolate toward its center, and
//!    on arrival release the cell left behind.
//!
//! A committed transit is never interrupted: once the agent holds a
//! reservation on the next cell it finishes the move even if the light
//! changes behind it, like a real vehicle clearing an intersection.

use rustc_hash::FxHashSet;

use av_core::{Cell, Heading, SimClock};
use av_grid::Grid;
use av_path::{compute_path, Algorithm};
use av_traffic::{CrossingZone, LightBoard};

use crate::agent::{Agent, AgentState};
use crate::occupancy::Occupancy;

/// Retry delay after a failed route request, seconds.
const NO_PATH_RETRY_SECS: f32 = 1.0;

/// How far into its own cell an agent may creep toward a taken neighbour,
/// as a fraction of the center-to-center distance.  Below 0.5 so the
/// agent's discrete cell never changes while creeping.
const CRAWL_LIMIT: f32 = 0.45;

/// Borrowed view of everything an agent consults during one tick.
pub struct TickContext<'a> {
    pub grid: &'a Grid,
    /// Dynamic-obstacle overlay.
    pub blocked: &'a FxHashSet<Cell>,
    pub lights: &'a LightBoard,
    pub crossings: &'a CrossingZone,
    pub clock: SimClock,
    pub algorithm: Algorithm,
    pub node_budget: usize,
}

/// What one tick of one agent produced, for the orchestrator.
#[derive(Copy, Clone, Debug, Default)]
pub struct TickOutcome {
    /// The agent arrived at its goal this tick.
    pub reached_goal: bool,
    /// The agent gave up and left the simulation this tick.
    pub removed: bool,
    /// A route was computed this tick (for reverse-index maintenance).
    pub recomputed: bool,
}

/// Advance `agent` by one tick.
pub fn decide(agent: &mut Agent, ctx: &TickContext<'_>, occupancy: &mut Occupancy) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    let dt = ctx.clock.tick_duration_secs;

    if agent.state == AgentState::Removed {
        return outcome;
    }

    // Fresh NPCs idle through their spawn delay.  Repeated subtraction
    // leaves float dust, so a remainder under a tenth of a tick is spent.
    if agent.spawn_delay_secs > 0.0 {
        let rem = agent.spawn_delay_secs - dt;
        agent.spawn_delay_secs = if rem > dt * 0.1 { rem } else { 0.0 };
        agent.state = AgentState::Idle;
        agent.speed = 0.0;
        return outcome;
    }

    // 1. Route acquisition.
    if agent.needs_route || agent.route.is_none() {
        if agent.no_path_backoff_secs > 0.0 {
            agent.no_path_backoff_secs = (agent.no_path_backoff_secs - dt).max(0.0);
            hold(agent, AgentState::Waiting);
            return stuck_check(agent, occupancy, outcome, dt);
        }
        agent.state = AgentState::Recomputing;
        // An interrupted transit may still hold the cell ahead.  Any new
        // route starts from the anchor cell, so give everything else up.
        occupancy.release_all(agent.id);
        occupancy.reserve(agent.id, agent.cell);
        match compute_path(
            ctx.algorithm,
            ctx.grid,
            ctx.blocked,
            agent.cell,
            agent.goal,
            ctx.node_budget,
        ) {
            Ok(route) => {
                agent.route = Some(route);
                agent.cursor = 0;
                agent.needs_route = false;
                outcome.recomputed = true;
            }
            Err(_) => {
                agent.route = None;
                agent.no_path_backoff_secs = NO_PATH_RETRY_SECS;
                hold(agent, AgentState::Waiting);
                return stuck_check(agent, occupancy, outcome, dt);
            }
        }
    }

    let Some(next) = agent.next_cell() else {
        // Standing on the destination.
        hold(agent, AgentState::Idle);
        agent.clear_blockage();
        outcome.reached_goal = agent.at_goal();
        return outcome;
    };

    let in_transit = occupancy.holder_of(next) == Some(agent.id);

    // 2. Red light ahead.  Holding for a light ends any blockage episode:
    // patience is for vehicles, not signals.
    if !in_transit && ctx.lights.stop_required(next, ctx.clock) {
        hold(agent, AgentState::Waiting);
        clear_blocked(agent);
        return outcome;
    }

    // 3. Pedestrians.
    let band = ctx.crossings.band_toward(agent.cell, next);
    if !in_transit
        && agent.policy.hard_stop_for_pedestrians
        && ctx.crossings.is_occupied_crossing(next)
    {
        hold(agent, AgentState::Waiting);
        clear_blocked(agent);
        return outcome;
    }

    // 4. Occupancy.
    if !occupancy.reserve(agent.id, next) {
        agent.blocked_secs += dt;
        if agent.blocked_secs <= agent.policy.patience_secs {
            hold(agent, AgentState::Waiting);
        } else {
            // Out of patience: creep toward the contested cell and ask for
            // a detour once, but never cross the boundary while it is held.
            agent.state = AgentState::Moving;
            agent.speed = agent.policy.crawl_speed();
            let limit = lerp(agent.cell.center(), next.center(), CRAWL_LIMIT);
            agent.pos = agent.pos.step_toward(limit, agent.speed * dt);
            if !agent.detour_requested {
                agent.detour_requested = true;
                agent.request_recompute();
            }
        }
        return stuck_check(agent, occupancy, outcome, dt);
    }

    // 6. Advance toward the next cell's center.
    agent.speed = agent.policy.cruise_speed() * band;
    agent.state = AgentState::Moving;
    clear_blocked(agent);
    if let Some(heading) = Heading::between(agent.cell, next) {
        agent.heading = heading;
    }
    let target = next.center();
    agent.pos = agent.pos.step_toward(target, agent.speed * dt);

    if agent.pos == target {
        occupancy.release(agent.id, agent.cell);
        agent.cell = next;
        agent.cursor += 1;
        agent.clear_blockage();

        if agent.next_cell().is_none() {
            hold(agent, AgentState::Idle);
            outcome.reached_goal = agent.at_goal();
        }
    }

    outcome
}

/// Stop in place with the given state.
fn hold(agent: &mut Agent, state: AgentState) {
    agent.state = state;
    agent.speed = 0.0;
}

/// End the current blockage episode.  Called whenever the tick resolves
/// for a reason other than a taken cell.
fn clear_blocked(agent: &mut Agent) {
    agent.blocked_secs = 0.0;
    agent.detour_requested = false;
}

/// Step 5: account stuck time and remove a hopeless removable agent.
fn stuck_check(
    agent: &mut Agent,
    occupancy: &mut Occupancy,
    mut outcome: TickOutcome,
    dt: f32,
) -> TickOutcome {
    agent.stuck_secs += dt;
    if agent.stuck_secs >= agent.policy.stuck_timeout_secs && agent.policy.removable {
        agent.state = AgentState::Removed;
        agent.speed = 0.0;
        occupancy.release_all(agent.id);
        outcome.removed = true;
    }
    outcome
}

#[inline]
fn lerp(a: av_core::Vec2, b: av_core::Vec2, t: f32) -> av_core::Vec2 {
    av_core::Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
