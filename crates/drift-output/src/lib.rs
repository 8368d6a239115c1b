//! `drift-output`: result tracking for the drift framework.
//!
//! The CSV backend creates two files in the output directory:
//!
//! | File               | One row per                                  |
//! |--------------------|----------------------------------------------|
//! | `trajectories.csv` | agent per snapshot (position, age, status)   |
//! | `mortality.csv`    | agent death (step, cause)                    |
//!
//! Backends implement [`OutputWriter`] and are driven by [`Tracker`], which
//! implements `drift_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use drift_output::CsvTracker;
//!
//! let mut tracker = CsvTracker::create(Path::new("./output"))?;
//! sim.run(&mut tracker)?;
//! if let Some(e) = tracker.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{CsvTracker, Tracker};
pub use row::{AgentStatus, MortalityRow, TrajectoryRow};
pub use writer::OutputWriter;
