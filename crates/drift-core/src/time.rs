//! Simulation time model.
//!
//! # Design
//!
//! Steps are counted by a monotonically increasing `Tick`.  The mapping to
//! simulated time is held in `SimClock`:
//!
//!   time = initial_time_secs + tick * dt_secs
//!
//! `dt_secs` is **signed**: a negative timestep runs the simulation backward
//! in time (backtracking the origin of a population).  Everything that needs
//! the simulation direction derives it from the sign of `dt_secs` through
//! [`Direction`].

use std::fmt;

use crate::{DriftError, DriftResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Direction in which simulated time flows.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction implied by the sign of a timestep.
    #[inline]
    pub fn of(dt_secs: f64) -> Direction {
        if dt_secs >= 0.0 { Direction::Forward } else { Direction::Backward }
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between step counts and simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated time (seconds since the dataset origin) of tick 0.
    pub initial_time_secs: f64,
    /// Signed timestep in seconds.
    pub dt_secs: f64,
    /// The current tick, advanced by `SimClock::advance()` each step.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(initial_time_secs: f64, dt_secs: f64) -> Self {
        Self { initial_time_secs, dt_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Simulated time at the current tick.
    #[inline]
    pub fn time(&self) -> f64 {
        self.initial_time_secs + self.current_tick.0 as f64 * self.dt_secs
    }

    /// Absolute simulated seconds elapsed since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.dt_secs.abs()
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::of(self.dt_secs)
    }

    /// Break elapsed time into (day, hour, minute) components from the start.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0.0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level configuration.
///
/// Typically deserialized from a JSON file by the application crate and
/// passed to the simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated time of the release, seconds since the dataset origin.
    pub initial_time_secs: f64,

    /// Signed timestep in seconds.  Negative runs backward in time.
    pub dt_secs: f64,

    /// How long agents are transported, in seconds.  Also the maximum age
    /// enforced by the aging behavior unless `keep_drifting` is set.
    pub transport_duration_secs: f64,

    /// Keep agents drifting past the transport duration instead of killing
    /// them as too old.
    pub keep_drifting: bool,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Populations at least this large are split in half and stepped in
    /// parallel; smaller sub-ranges are stepped sequentially.
    pub split_threshold: usize,

    /// Snapshot every N steps.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_time_secs:       0.0,
            dt_secs:                 3_600.0,
            transport_duration_secs: 30.0 * 86_400.0,
            keep_drifting:           false,
            seed:                    0,
            num_threads:             None,
            split_threshold:         1_000,
            output_interval_ticks:   1,
        }
    }
}

impl SimConfig {
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::of(self.dt_secs)
    }

    /// Number of steps needed to cover the transport duration (rounded up).
    pub fn total_ticks(&self) -> u64 {
        if self.dt_secs == 0.0 {
            return 0;
        }
        (self.transport_duration_secs / self.dt_secs.abs()).ceil().max(0.0) as u64
    }

    /// The tick at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.initial_time_secs, self.dt_secs)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> DriftResult<()> {
        if !self.dt_secs.is_finite() || self.dt_secs == 0.0 {
            return Err(DriftError::Config(format!(
                "timestep must be finite and non-zero, got {}",
                self.dt_secs
            )));
        }
        if !self.transport_duration_secs.is_finite() || self.transport_duration_secs < 0.0 {
            return Err(DriftError::Config(format!(
                "transport duration must be a non-negative number of seconds, got {}",
                self.transport_duration_secs
            )));
        }
        if self.split_threshold == 0 {
            return Err(DriftError::Config("split threshold must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(DriftError::Config("thread count must be at least 1".into()));
        }
        Ok(())
    }
}
