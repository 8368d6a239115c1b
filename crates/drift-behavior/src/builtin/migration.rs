//! Diel vertical migration.

use std::fmt;
use std::str::FromStr;

use drift_agent::Agent;
use drift_core::{Delta, GridPos};

use crate::{Behavior, BehaviorResult, ParamError, ParameterBlock, SetupContext, StepContext};

const SECS_PER_DAY: f64 = 86_400.0;

// ── ClockTime ─────────────────────────────────────────────────────────────────

/// Time of day, parsed from `HH:MM`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    secs: u32,
}

impl ClockTime {
    pub fn hm(hours: u32, minutes: u32) -> Option<Self> {
        (hours < 24 && minutes < 60).then_some(Self { secs: hours * 3600 + minutes * 60 })
    }

    /// Seconds since midnight.
    pub fn secs(self) -> u32 {
        self.secs
    }

    /// Time of day of a simulated instant given in seconds.
    pub fn of_time(time_secs: f64) -> Self {
        Self { secs: time_secs.rem_euclid(SECS_PER_DAY) as u32 }
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.trim().split_once(':').ok_or_else(|| "expected HH:MM".to_owned())?;
        let h: u32 = h.trim().parse().map_err(|_| format!("bad hour `{h}`"))?;
        let m: u32 = m.trim().parse().map_err(|_| format!("bad minute `{m}`"))?;
        ClockTime::hm(h, m).ok_or_else(|| "time of day out of range".to_owned())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.secs / 3600, (self.secs % 3600) / 60)
    }
}

// ── MigrationBehavior ─────────────────────────────────────────────────────────

/// Moves agents to a daytime depth between sunrise and sunset and to a
/// night-time depth otherwise, once they are older than `min_age`.
///
/// Parameters: `day_depth` and `night_depth` (metres, negative below the
/// surface, required), `sunrise` and `sunset` (`HH:MM`, default 06:00 and
/// 18:00), `min_age` (seconds, default 0).  The target depth is limited to
/// the local bottom.  The vertical move is claimed exclusively, so no other
/// behavior can dilute it.  Requires a 3-D dataset.
#[derive(Copy, Clone, Debug)]
pub struct MigrationBehavior {
    pub day_depth:    f64,
    pub night_depth:  f64,
    pub sunrise:      ClockTime,
    pub sunset:       ClockTime,
    pub min_age_secs: f64,
}

impl Default for MigrationBehavior {
    fn default() -> Self {
        Self {
            day_depth:    0.0,
            night_depth:  0.0,
            sunrise:      ClockTime { secs: 6 * 3600 },
            sunset:       ClockTime { secs: 18 * 3600 },
            min_age_secs: 0.0,
        }
    }
}

impl MigrationBehavior {
    pub fn is_daytime(&self, time_secs: f64) -> bool {
        let now = ClockTime::of_time(time_secs);
        now >= self.sunrise && now < self.sunset
    }

    /// Depth targeted at `time_secs`.
    pub fn target_depth(&self, time_secs: f64) -> f64 {
        if self.is_daytime(time_secs) { self.day_depth } else { self.night_depth }
    }
}

impl Behavior for MigrationBehavior {
    fn load_parameters(&mut self, params: &ParameterBlock, setup: &SetupContext<'_>) -> BehaviorResult<()> {
        if !setup.dataset.is_3d() {
            return Err(ParamError::Unsupported(
                "vertical migration needs a 3-D dataset; disable the block or use vertical levels".into(),
            )
            .into());
        }
        let defaults = Self::default();
        self.day_depth = params.require("day_depth")?;
        self.night_depth = params.require("night_depth")?;
        self.sunrise = params.parse_or("sunrise", defaults.sunrise)?;
        self.sunset = params.parse_or("sunset", defaults.sunset)?;
        self.min_age_secs = params.parse::<f64>("min_age")?.unwrap_or(0.0);

        for (name, depth) in [("day_depth", self.day_depth), ("night_depth", self.night_depth)] {
            if !(depth.is_finite() && depth <= 0.0) {
                return Err(ParamError::Invalid {
                    name:   name.into(),
                    value:  depth.to_string(),
                    reason: "depths are metres below the surface, zero or negative".into(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        if agent.age_secs < self.min_age_secs {
            return Ok(());
        }
        let p = agent.grid();
        let bottom = ctx.dataset.depth_of_level(GridPos::new(p.x, p.y, 0.0));
        let depth = self.target_depth(ctx.time).max(bottom);
        let dz = ctx.dataset.level_of_depth(p.x, p.y, depth) - p.z;
        agent.position.increment(Delta::vertical(dz), false, true)?;
        Ok(())
    }
}
