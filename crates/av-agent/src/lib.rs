//! `av-agent` — vehicles and the rules they drive by.
//!
//! # Crate layout
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`agent`]     | `Agent`, `AgentState`, `AgentKind`                     |
//! | [`policy`]    | `Policy`: player constants, randomized NPC traits      |
//! | [`occupancy`] | `Occupancy`: one holder per cell, reserve/release      |
//! | [`decide`]    | the shared per-tick decision core                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.  |

pub mod agent;
pub mod decide;
pub mod occupancy;
pub mod policy;


pub use agent::{Agent, AgentKind, AgentState};
pub use decide::{decide, TickContext, TickOutcome};
pub use occupancy::Occupancy;
pub use policy::Policy;
