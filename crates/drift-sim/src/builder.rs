//! Fluent builder for constructing a [`Simulation`].

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::info;

use drift_agent::Population;
use drift_behavior::{BehaviorPipeline, StepContext};
use drift_core::SimConfig;
use drift_field::{Dataset, ZoneSet};

use crate::{SimError, SimResult, Simulation};

/// Fluent builder for [`Simulation<D>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: timestep, transport duration, seed, threads, …
/// - `D: Dataset`: the physical field
/// - [`Population`]: from `drift_agent::PopulationBuilder`
/// - [`BehaviorPipeline`]: built against the same dataset and zones
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default             |
/// |---------------------|---------------------|
/// | `.zones(z)`         | `ZoneSet::empty()`  |
/// | `.stop_signal(s)`   | never stopped       |
pub struct SimBuilder<D: Dataset> {
    config:     SimConfig,
    dataset:    D,
    population: Population,
    pipeline:   BehaviorPipeline,
    zones:      Option<ZoneSet>,
    stop:       Option<Arc<AtomicBool>>,
}

impl<D: Dataset> SimBuilder<D> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, dataset: D, population: Population, pipeline: BehaviorPipeline) -> Self {
        Self { config, dataset, population, pipeline, zones: None, stop: None }
    }

    /// Zones the behaviors were configured against.
    pub fn zones(mut self, zones: ZoneSet) -> Self {
        self.zones = Some(zones);
        self
    }

    /// A flag that, once set, ends the run after the step in progress.
    pub fn stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Validate the configuration, start the worker pool, run every
    /// behavior's `init` on every agent, and return a ready-to-run
    /// [`Simulation`].
    pub fn build(self) -> SimResult<Simulation<D>> {
        self.config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("drift-worker-{i}"))
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        let zones = self.zones.unwrap_or_default();
        let mut population = self.population;
        let clock = self.config.make_clock();
        {
            let ctx = StepContext::new(clock.current_tick, clock.time(), self.config.dt_secs, &self.dataset, &zones);
            for agent in population.agents_mut() {
                self.pipeline.init_agent(agent, &ctx).map_err(SimError::Behavior)?;
            }
        }

        info!(
            agents      = population.len(),
            behaviors   = self.pipeline.len(),
            total_steps = self.config.total_ticks(),
            dt_secs     = self.config.dt_secs,
            direction   = ?self.config.direction(),
            "simulation ready"
        );

        Ok(Simulation {
            clock,
            config: self.config,
            dataset: self.dataset,
            zones,
            population,
            pipeline: self.pipeline,
            stop: self.stop,
            #[cfg(feature = "parallel")]
            pool,
            released: false,
        })
    }
}
