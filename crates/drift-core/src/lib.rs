//! `drift-core`: foundational types for the `drift` Lagrangian particle
//! framework.
//!
//! This crate is a dependency of every other `drift-*` crate.  It has no
//! `drift-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ZoneId`                                       |
//! | [`coords`]      | `GridPos`, `GeoPoint`, `Delta`, `GridBounds`              |
//! | [`time`]        | `Tick`, `Direction`, `SimClock`, `SimConfig`              |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)                 |
//! | [`error`]       | `DriftError`, `DriftResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to value and config types.  |

pub mod coords;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use coords::{Delta, GeoPoint, GridBounds, GridPos};
pub use error::{DriftError, DriftResult};
pub use ids::{AgentId, ZoneId};
pub use rng::{AgentRng, SimRng};
pub use time::{Direction, SimClock, SimConfig, Tick};
