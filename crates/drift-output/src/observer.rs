//! `Tracker<W>` bridges `SimObserver` to an `OutputWriter`.

use std::path::Path;

use tracing::{info, warn};

use drift_agent::{Agent, MortalityCause};
use drift_core::Tick;
use drift_sim::{SimObserver, Snapshot};

use crate::row::{AgentStatus, MortalityRow, TrajectoryRow};
use crate::writer::OutputWriter;
use crate::{CsvWriter, OutputError, OutputResult};

/// A [`Tracker`] writing CSV files.
pub type CsvTracker = Tracker<CsvWriter>;

impl CsvTracker {
    /// Track into `trajectories.csv` and `mortality.csv` under `dir`.
    pub fn create(dir: &Path) -> OutputResult<Self> {
        let writer = CsvWriter::new(dir)?;
        info!(dir = %dir.display(), "tracking to CSV");
        Ok(Tracker::new(writer))
    }
}

/// A [`SimObserver`] that records every snapshot and every death through an
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct Tracker<W: OutputWriter> {
    writer:     W,
    rows:       Vec<TrajectoryRow>,
    deaths:     usize,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> Tracker<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, rows: Vec::new(), deaths: 0, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Number of deaths recorded so far.
    pub fn deaths(&self) -> usize {
        self.deaths
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for Tracker<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self.rows.clear();
        self.rows.extend(snapshot.population.iter().map(|agent| {
            let geo = agent.position.current_geo(snapshot.dataset);
            TrajectoryRow {
                tick:     snapshot.tick.0,
                time:     snapshot.time,
                agent_id: agent.id.0,
                lon:      geo.lon,
                lat:      geo.lat,
                depth:    geo.depth,
                age_secs: agent.age_secs,
                status:   AgentStatus::of(agent),
            }
        }));

        if !self.rows.is_empty() {
            let result = self.writer.write_trajectories(&self.rows);
            self.store_err(result);
        }
    }

    fn on_agent_killed(&mut self, tick: Tick, agent: &Agent, cause: MortalityCause) {
        self.deaths += 1;
        let row = MortalityRow { tick: tick.0, agent_id: agent.id.0, cause };
        let result = self.writer.write_mortality(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
