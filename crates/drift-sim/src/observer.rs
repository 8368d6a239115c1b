//! Simulation observer trait for progress reporting and data collection.

use drift_agent::{Agent, MortalityCause, Population};
use drift_core::Tick;
use drift_field::Dataset;

/// Read-only view of the population at a step boundary.
pub struct Snapshot<'a> {
    /// Steps completed so far.
    pub tick: Tick,

    /// Simulated time of the snapshot, in seconds.
    pub time: f64,

    pub population: &'a Population,

    /// Needed to turn grid positions into geographic ones.
    pub dataset: &'a dyn Dataset,
}

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the step loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_step_end(&mut self, tick: Tick, _time: f64, living: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("step {tick}: {living} agents alive");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each step, before any agent moves.
    fn on_step_start(&mut self, _tick: Tick) {}

    /// Called at the end of each step.  `time` is the simulated time the
    /// step ends at; `living` the number of agents still alive.
    fn on_step_end(&mut self, _tick: Tick, _time: f64, _living: usize) {}

    /// Called for the release state and then every
    /// `config.output_interval_ticks` steps.
    fn on_snapshot(&mut self, _snapshot: &Snapshot<'_>) {}

    /// Called once for each agent that died during step `tick`, in id order.
    fn on_agent_killed(&mut self, _tick: Tick, _agent: &Agent, _cause: MortalityCause) {}

    /// Called once after the final step.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
