//! `av-traffic` — everything on the road that is not a vehicle.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`lights`]   | `LightPhase`, `LightTiming`, `LightBoard` (global clock) |
//! | [`crossing`] | `Crossing`, `Pedestrian`, `CrossingZone`, speed bands    |
//! | [`obstacle`] | `ObstacleKind`, `DynamicObstacle`, `ObstacleField`       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.  |

pub mod crossing;
pub mod lights;
pub mod obstacle;


pub use crossing::{speed_band, Crossing, CrossingZone, Pedestrian};
pub use lights::{LightBoard, LightPhase, LightTiming};
pub use obstacle::{DynamicObstacle, ObstacleField, ObstacleKind};
