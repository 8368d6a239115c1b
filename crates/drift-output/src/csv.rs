//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `trajectories.csv`
//! - `mortality.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MortalityRow, OutputResult, TrajectoryRow};

pub const TRAJECTORY_FILE: &str = "trajectories.csv";
pub const MORTALITY_FILE: &str = "mortality.csv";

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    trajectories: Writer<File>,
    mortality:    Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open (or truncate) the two CSV files in it and
    /// write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut trajectories = Writer::from_path(dir.join(TRAJECTORY_FILE))?;
        trajectories.write_record(["tick", "time", "agent", "lon", "lat", "depth", "age", "status"])?;

        let mut mortality = Writer::from_path(dir.join(MORTALITY_FILE))?;
        mortality.write_record(["tick", "agent", "cause"])?;

        Ok(Self {
            trajectories,
            mortality,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_trajectories(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        for row in rows {
            self.trajectories.write_record(&[
                row.tick.to_string(),
                row.time.to_string(),
                row.agent_id.to_string(),
                format!("{:.6}", row.lon),
                format!("{:.6}", row.lat),
                format!("{:.2}", row.depth),
                row.age_secs.to_string(),
                row.status.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_mortality(&mut self, row: &MortalityRow) -> OutputResult<()> {
        self.mortality.write_record(&[
            row.tick.to_string(),
            row.agent_id.to_string(),
            row.cause.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trajectories.flush()?;
        self.mortality.flush()?;
        Ok(())
    }
}
