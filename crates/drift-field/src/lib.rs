//! `drift-field`: the physical field collaborator and zone geometry.
//!
//! The engine never reads hydrodynamic archives itself.  Everything it needs
//! from the ocean model (velocities, scalar tracers, the land mask, grid ↔
//! geographic transforms) goes through the [`Dataset`] trait.  An in-memory
//! [`RectilinearGrid`] backed by closures is provided for analytic fields,
//! demos, and tests.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`dataset`] | `Dataset` trait                                             |
//! | [`grid`]    | `RectilinearGrid`, `RectilinearGridBuilder`                 |
//! | [`zone`]    | `Zone`, `ZoneBuilder`, `ZoneKind`, `ZoneSet` (R-tree)       |
//! | [`error`]   | `FieldError`, `FieldResult<T>`, `ZoneError`                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `ZoneKind`.             |

pub mod dataset;
pub mod error;
pub mod grid;
pub mod zone;

#[cfg(test)]
mod tests;

pub use dataset::Dataset;
pub use error::{FieldError, FieldResult, ZoneError};
pub use grid::{RectilinearGrid, RectilinearGridBuilder};
pub use zone::{Zone, ZoneBuilder, ZoneKind, ZoneSet};
