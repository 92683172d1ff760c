//! Simulation observer trait for progress reporting and data collection.

use av_core::{AgentId, Cell, Tick};
use av_grid::GridEvent;

use crate::snapshot::AgentSnapshot;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, snapshots: &[AgentSnapshot]) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} agents", snapshots.len());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with the fresh agent snapshots.
    fn on_tick_end(&mut self, _tick: Tick, _snapshots: &[AgentSnapshot]) {}

    /// Called once per grid change applied this tick (obstacle spawn or
    /// expiry, manual edit, regeneration, algorithm switch).
    fn on_grid_event(&mut self, _tick: Tick, _event: &GridEvent) {}

    /// Called when a stuck NPC gives up and leaves the simulation.
    fn on_agent_removed(&mut self, _tick: Tick, _agent: AgentId) {}

    /// Called when a removed NPC re-enters the simulation at `cell`.
    fn on_agent_respawned(&mut self, _tick: Tick, _agent: AgentId, _cell: Cell) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run`
/// but don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
