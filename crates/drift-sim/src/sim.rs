//! The `Simulation` struct and its step loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use drift_agent::Population;
use drift_behavior::{BehaviorPipeline, StepContext};
use drift_core::{SimClock, SimConfig};
use drift_field::{Dataset, ZoneSet};

use crate::{SimObserver, SimResult, Snapshot};

// ── Simulation ────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Each step runs the frozen [`BehaviorPipeline`] once on every living agent.
/// Agents only touch their own state and read the shared dataset and zones,
/// so the population is stepped fork/join without locks; results do not
/// depend on the split threshold or the thread count.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation<D: Dataset> {
    /// Run configuration (timestep, duration, seed, threads, …).
    pub config: SimConfig,

    /// Step counter and simulated time.
    pub clock: SimClock,

    pub dataset: D,

    pub zones: ZoneSet,

    pub population: Population,

    pub pipeline: BehaviorPipeline,

    pub(crate) stop: Option<Arc<AtomicBool>>,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,

    /// Whether the release snapshot has been emitted.
    pub(crate) released: bool,
}

impl<D: Dataset> Simulation<D> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current step to `config.end_tick()`.
    ///
    /// Ends early when the stop signal is raised or no agent is left alive.
    /// A behavior error aborts the run and is returned as-is.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.emit_release(observer);
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            if self.is_stopped() {
                info!(tick = now.0, "stop requested");
                break;
            }
            if self.population.living_count() == 0 {
                info!(tick = now.0, "no living agents left");
                break;
            }
            self.step(observer)?;
        }
        observer.on_run_end(self.clock.current_tick);
        info!(
            final_tick = self.clock.current_tick.0,
            living     = self.population.living_count(),
            "run finished"
        );
        Ok(())
    }

    /// Run exactly `n` steps from the current position (ignores `end_tick`
    /// and the stop signal).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_steps<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        self.emit_release(observer);
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// `true` once the stop signal (if any) has been raised.
    pub fn is_stopped(&self) -> bool {
        self.stop.as_ref().is_some_and(|s| s.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[inline]
    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    #[inline]
    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[inline]
    pub fn pipeline(&self) -> &BehaviorPipeline {
        &self.pipeline
    }

    // ── Core step processing ──────────────────────────────────────────────

    fn emit_release<O: SimObserver>(&mut self, observer: &mut O) {
        if self.released {
            return;
        }
        self.released = true;
        if self.config.output_interval_ticks > 0 {
            observer.on_snapshot(&self.snapshot());
        }
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_step_start(now);

        let alive_before: Vec<bool> = self.population.iter().map(|a| a.is_alive()).collect();

        {
            let ctx = StepContext::new(now, self.clock.time(), self.config.dt_secs, &self.dataset, &self.zones);
            let threshold = self.config.split_threshold;
            let pipeline = &self.pipeline;
            let population = &mut self.population;
            let mut run = || population.step(threshold, |agent| pipeline.execute(agent, &ctx));

            #[cfg(feature = "parallel")]
            let result = match &self.pool {
                Some(pool) => pool.install(run),
                None       => run(),
            };
            #[cfg(not(feature = "parallel"))]
            let result = run();

            result?;
        }

        // ── Deaths, in id order ───────────────────────────────────────────
        for (agent, was_alive) in self.population.iter().zip(alive_before) {
            if let (true, Some(cause)) = (was_alive, agent.state().cause()) {
                observer.on_agent_killed(now, agent, cause);
            }
        }

        self.clock.advance();
        let done = self.clock.current_tick;
        let living = self.population.living_count();
        debug!(tick = done.0, living, "step complete");
        observer.on_step_end(done, self.clock.time(), living);

        let interval = self.config.output_interval_ticks;
        if interval > 0 && done.0.is_multiple_of(interval) {
            observer.on_snapshot(&self.snapshot());
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tick:       self.clock.current_tick,
            time:       self.clock.time(),
            population: &self.population,
            dataset:    &self.dataset,
        }
    }
}
