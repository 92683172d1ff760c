//! `av-path` — route search over the city grid.
//!
//! # Crate layout
//!
//! | Module     | Contents                                               |
//! |------------|--------------------------------------------------------|
//! | [`finder`] | `Algorithm`, `compute_path`, the three search kernels  |
//! | [`route`]  | immutable `Route` (cells, hops, forward queries)       |
//! | [`error`]  | `PathError`, `PathResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.  |

pub mod error;
pub mod finder;
pub mod route;

#[cfg(test)]
mod tests;

pub use error::{PathError, PathResult};
pub use finder::{compute_path, Algorithm, DEFAULT_NODE_BUDGET};
pub use route::Route;
