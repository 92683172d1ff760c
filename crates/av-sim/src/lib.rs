//! `av-sim` — the simulation orchestrator.
//!
//! Wires the grid, traffic subsystems, and agents into a deterministic
//! single-threaded tick loop.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`sim`]      | `Sim`, `GridEdit`, the five-phase tick loop          |
//! | [`builder`]  | fluent `SimBuilder`                                  |
//! | [`observer`] | `SimObserver` hooks, `NoopObserver`                  |
//! | [`snapshot`] | read-only `AgentSnapshot` export                     |
//! | [`trace`]    | `CsvTraceObserver` per-tick CSV output               |
//! | [`error`]    | `SimError`, `SimResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.  |

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;
pub mod trace;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{GridEdit, Sim};
pub use snapshot::AgentSnapshot;
pub use trace::CsvTraceObserver;
