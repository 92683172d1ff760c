//! Read-only per-agent state export.

use av_agent::{AgentKind, AgentState};
use av_core::{AgentId, Cell, Vec2};

/// One agent's publicly visible state at a tick boundary.
///
/// Everything a renderer or trace writer needs, with no references back
/// into the simulation.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub kind: AgentKind,
    pub cell: Cell,
    pub pos: Vec2,
    /// Clockwise-from-up rotation in degrees.
    pub heading_degrees: f32,
    /// Speed driven this tick, cells per second.
    pub speed: f32,
    pub state: AgentState,
    /// Fraction of the current route consumed, `0.0` without one.
    pub route_progress: f32,
}
