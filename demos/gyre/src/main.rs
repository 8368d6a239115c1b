//! gyre: ichthyoplankton drift in a synthetic coastal basin.
//!
//! Releases larvae in an offshore spawning ground, drifts them for a month
//! in a tidal gyre with turbulence, diel vertical migration, cold mortality
//! and coastal recruitment, and tracks them to CSV.
//!
//! ```text
//! RUST_LOG=info cargo run -p gyre --release [-- path/to/config.json]
//! ```
//!
//! Without an argument the bundled `gyre.json` is used.

mod field;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use drift_agent::PopulationBuilder;
use drift_behavior::builtin::RecruitmentLayer;
use drift_behavior::{BehaviorPipeline, BehaviorRegistry, ParameterBlock, SetupContext, SystemSettings};
use drift_core::{SimConfig, SimRng, Tick};
use drift_field::{ZoneKind, ZoneSet};
use drift_output::{CsvTracker, OutputWriter, Tracker};
use drift_release::release_in_zone;
use drift_sim::{SimBuilder, SimObserver, Snapshot};

const DEFAULT_CONFIG: &str = include_str!("../gyre.json");

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DemoConfig {
    #[serde(default)]
    sim:        SimConfig,
    coastline:  Option<String>,
    agents:     usize,
    output_dir: PathBuf,
    #[serde(default)]
    behaviors:  Vec<ParameterBlock>,
}

fn load_config() -> Result<DemoConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
        }
        None => serde_json::from_str(DEFAULT_CONFIG).context("parsing bundled gyre.json"),
    }
}

// ── Progress reporting ────────────────────────────────────────────────────────

/// Forwards to the CSV tracker and logs once per simulated day.
struct DailyProgress<W: OutputWriter> {
    inner:         Tracker<W>,
    steps_per_day: u64,
}

impl<W: OutputWriter> SimObserver for DailyProgress<W> {
    fn on_step_end(&mut self, tick: Tick, time: f64, living: usize) {
        if self.steps_per_day > 0 && tick.0.is_multiple_of(self.steps_per_day) {
            info!(day = tick.0 / self.steps_per_day, time, living, deaths = self.inner.deaths(), "progress");
        }
        self.inner.on_step_end(tick, time, living);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self.inner.on_snapshot(snapshot);
    }

    fn on_agent_killed(&mut self, tick: Tick, agent: &drift_agent::Agent, cause: drift_agent::MortalityCause) {
        self.inner.on_agent_killed(tick, agent, cause);
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        self.inner.on_run_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let demo = load_config()?;
    let config = demo.sim.clone();

    // 1. Field and zones.
    let grid = field::basin()?;
    let zones = ZoneSet::init(field::zones(), &grid)?;
    info!(nx = field::NX, ny = field::NY, zones = zones.len(), "basin ready");

    // 2. Behaviors.
    let system = SystemSettings::parse(&config, demo.coastline.as_deref())?;
    let registry = BehaviorRegistry::with_builtins();
    let pipeline = BehaviorPipeline::build(
        &demo.behaviors,
        &registry,
        &SetupContext::new(&grid, &zones, &config),
        system,
    )?;
    for (key, kind, priority) in pipeline.describe() {
        info!(key, kind, %priority, "stage");
    }

    // 3. Release.
    let mut rng = SimRng::new(config.seed);
    let mut release = PopulationBuilder::with_capacity(config.seed, demo.agents);
    let spawning: Vec<_> = zones.by_kind(ZoneKind::Release).collect();
    if spawning.is_empty() {
        bail!("no release zone defined");
    }
    let per_zone = demo.agents.div_ceil(spawning.len());
    for zone in spawning {
        release_in_zone(zone, &grid, per_zone, &mut rng, &mut release)?;
    }
    let population = release.build(&grid);

    // 4. Run.
    let steps_per_day = (86_400.0 / config.dt_secs.abs()).round() as u64;
    let mut sim = SimBuilder::new(config, grid, population, pipeline).zones(zones).build()?;
    let mut observer = DailyProgress { inner: CsvTracker::create(&demo.output_dir)?, steps_per_day };

    let t0 = Instant::now();
    sim.run(&mut observer)?;
    let elapsed = t0.elapsed();

    if let Some(e) = observer.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    report(&sim.population, &demo.output_dir, elapsed.as_secs_f64());
    Ok(())
}

fn report(population: &drift_agent::Population, output_dir: &Path, secs: f64) {
    let mut fates: BTreeMap<String, usize> = BTreeMap::new();
    let mut recruited = 0;
    for agent in population.iter() {
        let fate = match agent.state().cause() {
            Some(cause) => cause.to_string(),
            None        => "alive".to_owned(),
        };
        *fates.entry(fate).or_default() += 1;
        if agent.layer::<RecruitmentLayer>().is_some_and(RecruitmentLayer::is_recruited) {
            recruited += 1;
        }
    }

    println!("Simulation complete in {secs:.3} s");
    println!("  output     : {}", output_dir.display());
    println!("  released   : {}", population.len());
    println!("  recruited  : {recruited}");
    println!();
    println!("{:<16} {:>8}", "Fate", "Agents");
    println!("{}", "-".repeat(25));
    for (fate, n) in &fates {
        println!("{fate:<16} {n:>8}");
    }
}
