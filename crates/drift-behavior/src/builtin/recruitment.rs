//! Recruitment in nursery zones.

use drift_agent::Agent;
use drift_core::ZoneId;
use drift_field::ZoneKind;

use crate::{Behavior, BehaviorResult, ParamError, ParameterBlock, SetupContext, StepContext};

// ── RecruitmentLayer ──────────────────────────────────────────────────────────

/// Per-agent recruitment bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecruitmentLayer {
    /// Recruitment zone the agent was last seen in while eligible.
    pub current_zone: Option<ZoneId>,

    /// Continuous time spent in `current_zone`, in seconds.
    pub secs_in_zone: f64,

    /// Zones the agent has been recruited in, in order.
    pub recruited: Vec<ZoneId>,

    /// Recruited during the latest step.
    pub newly_recruited: bool,
}

impl RecruitmentLayer {
    pub fn is_recruited(&self) -> bool {
        !self.recruited.is_empty()
    }

    pub fn is_recruited_in(&self, zone: ZoneId) -> bool {
        self.recruited.contains(&zone)
    }
}

// ── RecruitmentBehavior ───────────────────────────────────────────────────────

/// Marks an agent recruited once it has stayed `duration` seconds in a
/// recruitment zone while at least `min_age` seconds old.
///
/// Parameters: `zones` (comma-separated zone keys; default every recruitment
/// zone), `min_age` and `duration` (seconds, default 0), `stop_moving`
/// (default off).  With `stop_moving` a recruited agent is locked in place
/// for the rest of the run.
#[derive(Clone, Debug, Default)]
pub struct RecruitmentBehavior {
    pub zones:         Vec<ZoneId>,
    pub min_age_secs:  f64,
    pub duration_secs: f64,
    pub stop_moving:   bool,
}

impl Behavior for RecruitmentBehavior {
    fn load_parameters(&mut self, params: &ParameterBlock, setup: &SetupContext<'_>) -> BehaviorResult<()> {
        self.zones = match params.get("zones") {
            Some(keys) => keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(|key| match setup.zones.by_key(key) {
                    Some(z) if z.kind == ZoneKind::Recruitment => Ok(z.id),
                    Some(z) => Err(ParamError::Invalid {
                        name:   "zones".into(),
                        value:  key.to_owned(),
                        reason: format!("is a {} zone, not a recruitment zone", z.kind),
                    }),
                    None => Err(ParamError::Invalid {
                        name:   "zones".into(),
                        value:  key.to_owned(),
                        reason: "no such zone".into(),
                    }),
                })
                .collect::<Result<_, _>>()?,
            None => setup.zones.by_kind(ZoneKind::Recruitment).map(|z| z.id).collect(),
        };
        if self.zones.is_empty() {
            return Err(ParamError::Unsupported("recruitment needs at least one recruitment zone".into()).into());
        }

        self.min_age_secs = params.parse::<f64>("min_age")?.unwrap_or(0.0);
        self.duration_secs = params.parse::<f64>("duration")?.unwrap_or(0.0);
        self.stop_moving = params.flag("stop_moving", false)?;
        Ok(())
    }

    fn init(&self, agent: &mut Agent, _ctx: &StepContext<'_>) -> BehaviorResult<()> {
        agent.layers.insert(RecruitmentLayer::default());
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        if self.stop_moving && agent.layer::<RecruitmentLayer>().is_some_and(RecruitmentLayer::is_recruited) {
            agent.lock();
            return Ok(());
        }

        let p = agent.grid();
        let depth = ctx.dataset.depth_of_level(p);
        let current = ctx
            .zones
            .zones_at(p.x, p.y)
            .into_iter()
            .find(|z| self.zones.contains(&z.id) && z.contains_3d(ctx.dataset, p, depth))
            .map(|z| z.id);
        let eligible = agent.age_secs >= self.min_age_secs;

        let layer = agent.layer_mut::<RecruitmentLayer>();
        layer.newly_recruited = false;
        let Some(zone) = current else {
            return Ok(());
        };
        if layer.is_recruited_in(zone) || !eligible {
            return Ok(());
        }

        layer.secs_in_zone = if layer.current_zone == Some(zone) {
            layer.secs_in_zone + ctx.dt_abs()
        } else {
            0.0
        };
        layer.current_zone = Some(zone);
        if layer.secs_in_zone >= self.duration_secs {
            layer.recruited.push(zone);
            layer.newly_recruited = true;
        }
        Ok(())
    }
}
