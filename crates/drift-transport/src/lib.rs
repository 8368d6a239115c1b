//! `drift-transport`: moving agents through the flow.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`integrator`]  | `FlowField` trait, `FnFlow`, `Scheme`, `AdvectionIntegrator` |
//! | [`coastline`]   | `CoastlinePolicy`, `Resolved`, collision resolution          |
//! | [`error`]       | `TransportError`, `TransportResult<T>`                       |
//!
//! Both halves are stateless and work in grid space only: the integrator
//! turns a velocity field into a displacement, and the resolver reconciles
//! that displacement with the land mask.  Applying the result to an agent is
//! the caller's job.

pub mod coastline;
pub mod error;
pub mod integrator;


pub use coastline::{CoastlinePolicy, Resolved};
pub use error::{TransportError, TransportResult};
pub use integrator::{AdvectionIntegrator, FlowField, FnFlow, Scheme};
