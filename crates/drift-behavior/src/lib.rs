//! `drift-behavior`: what happens to an agent during one step.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                         |
//! |--------------|------------------------------------------------------------------|
//! | [`model`]    | `Behavior` trait                                                 |
//! | [`params`]   | `ParameterBlock`, `Priority` (typed parameter access)            |
//! | [`context`]  | `SetupContext<'a>`, `StepContext<'a>`                            |
//! | [`registry`] | `BehaviorRegistry` (kind string → factory)                       |
//! | [`pipeline`] | `BehaviorPipeline`, `SystemSettings`                             |
//! | [`system`]   | `MovementBehavior`, `AgingBehavior` (always last, in that order) |
//! | [`builtin`]  | advection, dispersion, migration, lethal temperature, recruitment |
//! | [`noop`]     | `NoopBehavior`, a placeholder that does nothing                  |
//! | [`error`]    | `BehaviorError`, `ParamError`, `BehaviorResult<T>`               |
//!
//! # Design notes
//!
//! A step for one agent runs every pipeline entry in priority order:
//!
//! 1. **Configured behaviors** request displacements through
//!    `SpatialPoint::increment`, kill, lock, or update their layers.  None of
//!    them moves the agent.
//! 2. **Movement** resolves the accumulated displacement against the
//!    coastline and commits it.
//! 3. **Aging** advances the agent's age and enforces the maximum.
//!
//! The walk stops for that agent as soon as it dies.  Behaviors only read
//! the shared [`StepContext`], so the pipeline can be run for many agents in
//! parallel.

pub mod builtin;
pub mod context;
pub mod error;
pub mod model;
pub mod noop;
pub mod params;
pub mod pipeline;
pub mod registry;
pub mod system;


pub use context::{SetupContext, StepContext};
pub use error::{BehaviorError, BehaviorResult, ParamError};
pub use model::Behavior;
pub use noop::NoopBehavior;
pub use params::{ParameterBlock, Priority};
pub use pipeline::{BehaviorPipeline, SystemSettings};
pub use registry::BehaviorRegistry;
pub use system::{AgingBehavior, MovementBehavior};
