//! The `OutputWriter` trait implemented by backend writers.

use crate::{MortalityRow, OutputResult, TrajectoryRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with [`Tracker::take_error`][crate::Tracker::take_error].
pub trait OutputWriter {
    /// Write a batch of trajectory rows (one snapshot).
    fn write_trajectories(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()>;

    /// Write one death.
    fn write_mortality(&mut self, row: &MortalityRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
