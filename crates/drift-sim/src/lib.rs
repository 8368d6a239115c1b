//! `drift-sim`: step loop orchestrator for the drift framework.
//!
//! # Step loop
//!
//! ```text
//! build:  init every agent through the pipeline (Behavior::init)
//! run:    snapshot the release state
//!         while tick < end_tick and not stopped and someone is alive:
//!           ① on_step_start
//!           ② Population::step: the pipeline runs on every living agent,
//!              fork/join over the population (parallel with `parallel`)
//!           ③ on_agent_killed for every agent that died this step, by id
//!           ④ clock advance, on_step_end, snapshot every output interval
//!           ⑤ check the stop signal
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | (default) Steps on a Rayon pool of `num_threads` workers.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use drift_behavior::{BehaviorPipeline, BehaviorRegistry, SetupContext, SystemSettings};
//! use drift_sim::{NoopObserver, SimBuilder};
//!
//! let setup = SetupContext::new(&grid, &zones, &config);
//! let pipeline = BehaviorPipeline::build(&blocks, &BehaviorRegistry::with_builtins(), &setup, system)?;
//! let mut sim = SimBuilder::new(config, grid, population, pipeline)
//!     .zones(zones)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, Snapshot};
pub use sim::Simulation;
