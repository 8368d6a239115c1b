//! Read-only state handed to behaviors.

use drift_core::{Direction, SimConfig, Tick};
use drift_field::{Dataset, ZoneSet};

/// What a behavior may look at while loading its parameters.
#[derive(Copy, Clone)]
pub struct SetupContext<'a> {
    pub dataset: &'a dyn Dataset,
    pub zones:   &'a ZoneSet,
    pub config:  &'a SimConfig,
}

impl<'a> SetupContext<'a> {
    pub fn new(dataset: &'a dyn Dataset, zones: &'a ZoneSet, config: &'a SimConfig) -> Self {
        Self { dataset, zones, config }
    }
}

/// A read-only snapshot of one step, shared by every agent callback.
///
/// Built once per step by the simulation.  Neither the dataset nor the zones
/// are mutated while a `StepContext` is alive, so it can be shared across
/// worker threads.
#[derive(Copy, Clone)]
pub struct StepContext<'a> {
    pub tick: Tick,

    /// Simulated time at the start of the step, in seconds.
    pub time: f64,

    /// Signed timestep in seconds.
    pub dt: f64,

    pub dataset: &'a dyn Dataset,
    pub zones:   &'a ZoneSet,
}

impl<'a> StepContext<'a> {
    #[inline]
    pub fn new(tick: Tick, time: f64, dt: f64, dataset: &'a dyn Dataset, zones: &'a ZoneSet) -> Self {
        Self { tick, time, dt, dataset, zones }
    }

    /// Length of the step in seconds, whatever the direction.
    #[inline]
    pub fn dt_abs(&self) -> f64 {
        self.dt.abs()
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::of(self.dt)
    }
}
