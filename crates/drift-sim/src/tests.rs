//! Integration tests for drift-sim.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use drift_agent::{Agent, Axis, MortalityCause, Population, PopulationBuilder};
use drift_behavior::{
    Behavior, BehaviorError, BehaviorPipeline, BehaviorRegistry, BehaviorResult, ParameterBlock, SetupContext,
    StepContext, SystemSettings,
};
use drift_core::{Delta, GridPos, SimConfig, Tick};
use drift_field::{Dataset, RectilinearGrid, RectilinearGridBuilder, ZoneSet};
use drift_transport::CoastlinePolicy;

use crate::{NoopObserver, SimBuilder, SimError, SimObserver, Simulation, Snapshot};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(duration_hours: u64) -> SimConfig {
    SimConfig {
        dt_secs:                 3600.0,
        transport_duration_secs: duration_hours as f64 * 3600.0,
        seed:                    42,
        num_threads:             Some(1),
        output_interval_ticks:   0,
        ..SimConfig::default()
    }
}

/// 40 × 40 water grid with a slow eastward current.
fn sea() -> RectilinearGrid {
    RectilinearGridBuilder::new(40, 40)
        .velocity(|_, _| Delta::horizontal(1e-4, 0.0))
        .build()
        .unwrap()
}

fn release(grid: &dyn Dataset, n: usize, seed: u64) -> Population {
    let mut b = PopulationBuilder::new(seed);
    for i in 0..n {
        b.add_grid(GridPos::xy(5.0 + (i % 20) as f64 * 0.5, 10.0 + (i / 20) as f64 * 0.5));
    }
    b.build(grid)
}

fn build_sim(
    config: SimConfig,
    blocks: &[ParameterBlock],
    registry: &BehaviorRegistry,
    n: usize,
) -> Result<Simulation<RectilinearGrid>, SimError> {
    let grid = sea();
    let zones = ZoneSet::empty();
    let system = SystemSettings::from_config(&config, CoastlinePolicy::Beaching);
    let pipeline = BehaviorPipeline::build(
        blocks,
        registry,
        &SetupContext::new(&grid, &zones, &config),
        system,
    )?;
    let population = release(&grid, n, config.seed);
    SimBuilder::new(config, grid, population, pipeline).zones(zones).build()
}

fn drifting() -> Vec<ParameterBlock> {
    vec![
        ParameterBlock::new("currents", "advection"),
        ParameterBlock::new("turbulence", "dispersion").with("epsilon", "1e-6"),
    ]
}

/// Kills with `Starvation` every time.
#[derive(Default)]
struct Starve;

impl Behavior for Starve {
    fn load_parameters(&mut self, _: &ParameterBlock, _: &SetupContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, _: &StepContext<'_>) -> BehaviorResult<()> {
        agent.kill(MortalityCause::Starvation);
        Ok(())
    }
}

/// Claims the horizontal axis exclusively.
#[derive(Default)]
struct Steer;

impl Behavior for Steer {
    fn load_parameters(&mut self, _: &ParameterBlock, _: &SetupContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, _: &StepContext<'_>) -> BehaviorResult<()> {
        agent.position.increment(Delta::horizontal(0.1, 0.0), true, false)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Tagged(u32);

/// Tags every agent at init and bumps the tag each step.
#[derive(Default)]
struct Tag;

impl Behavior for Tag {
    fn load_parameters(&mut self, _: &ParameterBlock, _: &SetupContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn init(&self, agent: &mut Agent, _: &StepContext<'_>) -> BehaviorResult<()> {
        agent.layers.insert(Tagged(100));
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, _: &StepContext<'_>) -> BehaviorResult<()> {
        agent.layer_mut::<Tagged>().0 += 1;
        Ok(())
    }
}

fn registry() -> BehaviorRegistry {
    let mut r = BehaviorRegistry::with_builtins();
    r.register_default::<Starve>("starve")
        .register_default::<Steer>("steer")
        .register_default::<Tag>("tag");
    r
}

#[derive(Default)]
struct Recorder {
    starts:     Vec<Tick>,
    ends:       Vec<(Tick, usize)>,
    snapshots:  Vec<(Tick, usize)>,
    kills:      Vec<(Tick, u32, MortalityCause)>,
    final_tick: Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_step_start(&mut self, tick: Tick) {
        self.starts.push(tick);
    }

    fn on_step_end(&mut self, tick: Tick, _time: f64, living: usize) {
        self.ends.push((tick, living));
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self.snapshots.push((snapshot.tick, snapshot.population.living_count()));
    }

    fn on_agent_killed(&mut self, tick: Tick, agent: &Agent, cause: MortalityCause) {
        self.kills.push((tick, agent.id.0, cause));
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        self.final_tick = Some(final_tick);
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_and_inits_every_agent() {
        let blocks = [ParameterBlock::new("tag", "tag")];
        let sim = build_sim(test_config(10), &blocks, &registry(), 5).unwrap();
        assert_eq!(sim.population().len(), 5);
        assert!(sim.population().iter().all(|a| a.layer::<Tagged>() == Some(&Tagged(100))));
        assert_eq!(sim.clock().current_tick, Tick(0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig { dt_secs: 0.0, ..test_config(10) };
        let result = build_sim(config, &[], &registry(), 1);
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn unknown_behavior_kind_is_a_behavior_error() {
        let blocks = [ParameterBlock::new("x", "teleport")];
        let result = build_sim(test_config(10), &blocks, &registry(), 1);
        assert!(matches!(result, Err(SimError::Behavior(_))));
    }
}

// ── Run loop ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn runs_for_the_transport_duration() {
        let mut sim = build_sim(test_config(10), &drifting(), &registry(), 4).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.starts.len(), 10);
        assert_eq!(rec.starts[0], Tick(0));
        assert_eq!(rec.ends.last(), Some(&(Tick(10), 4)));
        assert_eq!(rec.final_tick, Some(Tick(10)));
        assert_eq!(sim.clock().time(), 36_000.0);
    }

    #[test]
    fn agents_die_too_old_on_the_step_after_the_duration() {
        // One day at one-hour steps: the run itself stops after 24 steps
        // with everyone alive; the 25th step pushes the age past the limit.
        let mut sim = build_sim(test_config(24), &[], &registry(), 3).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(sim.population().living_count(), 3);
        assert!(rec.kills.is_empty());

        sim.run_steps(1, &mut rec).unwrap();
        assert_eq!(sim.population().living_count(), 0);
        assert_eq!(
            rec.kills,
            vec![
                (Tick(24), 0, MortalityCause::TooOld),
                (Tick(24), 1, MortalityCause::TooOld),
                (Tick(24), 2, MortalityCause::TooOld),
            ]
        );
    }

    #[test]
    fn keep_drifting_outlives_the_duration() {
        let config = SimConfig { keep_drifting: true, ..test_config(24) };
        let mut sim = build_sim(config, &[], &registry(), 2).unwrap();
        sim.run_steps(30, &mut NoopObserver).unwrap();
        assert_eq!(sim.population().living_count(), 2);
        assert_eq!(sim.population().agents()[0].age_secs, 30.0 * 3600.0);
    }

    #[test]
    fn stops_early_when_everyone_is_dead() {
        let blocks = [ParameterBlock::new("famine", "starve")];
        let mut sim = build_sim(test_config(10), &blocks, &registry(), 4).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.starts, vec![Tick(0)]);
        assert_eq!(rec.final_tick, Some(Tick(1)));
        let ids: Vec<u32> = rec.kills.iter().map(|k| k.1).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(rec.kills.iter().all(|k| k.2 == MortalityCause::Starvation));
    }

    #[test]
    fn stop_signal_ends_the_run() {
        struct StopAt {
            flag: Arc<AtomicBool>,
            at:   Tick,
        }

        impl SimObserver for StopAt {
            fn on_step_end(&mut self, tick: Tick, _time: f64, _living: usize) {
                if tick == self.at {
                    self.flag.store(true, Ordering::Relaxed);
                }
            }
        }

        let config = test_config(10);
        let grid = sea();
        let zones = ZoneSet::empty();
        let system = SystemSettings::from_config(&config, CoastlinePolicy::Beaching);
        let pipeline = BehaviorPipeline::build(
            &drifting(),
            &registry(),
            &SetupContext::new(&grid, &zones, &config),
            system,
        )
        .unwrap();
        let population = release(&grid, 3, 1);
        let flag = Arc::new(AtomicBool::new(false));
        let mut sim = SimBuilder::new(config, grid, population, pipeline)
            .stop_signal(flag.clone())
            .build()
            .unwrap();

        sim.run(&mut StopAt { flag: flag.clone(), at: Tick(3) }).unwrap();
        assert!(sim.is_stopped());
        assert_eq!(sim.clock().current_tick, Tick(3));
    }

    #[test]
    fn exclusivity_conflict_aborts_the_run() {
        let blocks = [ParameterBlock::new("a", "steer"), ParameterBlock::new("b", "steer")];
        let mut sim = build_sim(test_config(10), &blocks, &registry(), 2).unwrap();
        let err = sim.run(&mut NoopObserver).unwrap_err();
        match err {
            SimError::Behavior(BehaviorError::ExclusivityConflict { axis, holder, requester }) => {
                assert_eq!(axis, Axis::Horizontal);
                assert_eq!((holder.as_str(), requester.as_str()), ("a", "b"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn snapshots_follow_the_output_interval() {
        let config = SimConfig { output_interval_ticks: 2, ..test_config(6) };
        let mut sim = build_sim(config, &drifting(), &registry(), 3).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        let ticks: Vec<Tick> = rec.snapshots.iter().map(|s| s.0).collect();
        assert_eq!(ticks, vec![Tick(0), Tick(2), Tick(4), Tick(6)]);
    }

    #[test]
    fn release_snapshot_is_emitted_once() {
        let config = SimConfig { output_interval_ticks: 100, ..test_config(6) };
        let mut sim = build_sim(config, &[], &registry(), 1).unwrap();
        let mut rec = Recorder::default();
        sim.run_steps(2, &mut rec).unwrap();
        sim.run_steps(2, &mut rec).unwrap();
        assert_eq!(rec.snapshots, vec![(Tick(0), 1)]);
    }

    #[test]
    fn layers_persist_across_steps() {
        let blocks = [ParameterBlock::new("tag", "tag")];
        let mut sim = build_sim(test_config(10), &blocks, &registry(), 2).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert!(sim.population().iter().all(|a| a.layer::<Tagged>() == Some(&Tagged(110))));
    }
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod determinism_tests {
    use super::*;

    fn positions(config: SimConfig) -> Vec<(GridPos, bool)> {
        let mut sim = build_sim(config, &drifting(), &registry(), 200).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        sim.population().iter().map(|a| (a.grid(), a.is_alive())).collect()
    }

    #[test]
    fn same_seed_same_trajectories() {
        assert_eq!(positions(test_config(12)), positions(test_config(12)));
    }

    #[test]
    fn different_seed_different_trajectories() {
        let other = SimConfig { seed: 7, ..test_config(12) };
        assert_ne!(positions(test_config(12)), positions(other));
    }

    #[test]
    fn split_threshold_does_not_change_results() {
        let reference = positions(SimConfig { split_threshold: usize::MAX, ..test_config(12) });
        assert_eq!(positions(SimConfig { split_threshold: 1, ..test_config(12) }), reference);
        assert_eq!(positions(SimConfig { split_threshold: 33, ..test_config(12) }), reference);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn thread_count_does_not_change_results() {
        let reference = positions(SimConfig { split_threshold: 16, ..test_config(12) });
        let wide = SimConfig { split_threshold: 16, num_threads: Some(4), ..test_config(12) };
        assert_eq!(positions(wide), reference);
    }
}
