//! `drift-agent`: agents and the population they live in.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`point`]       | `SpatialPoint` (grid/geo cache + exclusive displacement)    |
//! | [`mortality`]   | `MortalityCause`, `MortalityState`                          |
//! | [`layer`]       | `Layer` trait, `LayerMap` (typed per-agent extension state) |
//! | [`agent`]       | `Agent`                                                     |
//! | [`population`]  | `Population` and its fork/join `step`                       |
//! | [`builder`]     | `PopulationBuilder` (release positions → population)        |
//! | [`error`]       | `AgentError`, `AgentResult<T>`, `Axis`                      |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | (default) Steps sub-populations on the rayon pool.          |
//! | `serde`    | Derives `Serialize`/`Deserialize` on mortality types.       |

pub mod agent;
pub mod builder;
pub mod error;
pub mod layer;
pub mod mortality;
pub mod point;
pub mod population;

#[cfg(test)]
mod tests;

pub use agent::Agent;
pub use builder::PopulationBuilder;
pub use error::{AgentError, AgentResult, Axis};
pub use layer::{Layer, LayerMap};
pub use mortality::{MortalityCause, MortalityState};
pub use point::SpatialPoint;
pub use population::Population;
