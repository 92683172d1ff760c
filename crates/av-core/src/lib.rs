//! `av-core` — foundational types for the `av` grid-city simulation.
//!
//! This crate is a dependency of every other `av-*` crate.  It intentionally
//! has no `av-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                              |
//! |-----------|-------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `CrossingId`, `PedestrianId`, `ObstacleId` |
//! | [`space`] | `Cell`, `Vec2`, `Heading`                             |
//! | [`time`]  | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`] | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod rng;
pub mod space;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, CrossingId, ObstacleId, PedestrianId};
pub use rng::{AgentRng, SimRng};
pub use space::{Cell, Heading, Vec2};
pub use time::{SimClock, SimConfig, Tick};
