//! `av-grid` — the city map.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                |
//! |-----------|---------------------------------------------------------|
//! | [`grid`]  | `CellKind`, `Grid` (edits, default city, random maps)   |
//! | [`event`] | `GridEvent`, `EventCause` change notifications          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.  |

pub mod event;
pub mod grid;


pub use event::{EventCause, GridEvent};
pub use grid::{CellKind, Grid};
