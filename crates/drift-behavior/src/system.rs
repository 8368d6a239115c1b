//! The two stages every pipeline ends with.
//!
//! They are appended by [`BehaviorPipeline::build`](crate::BehaviorPipeline::build)
//! after all configured behaviors and cannot be removed or reordered:
//! movement first, then aging.

use drift_agent::{Agent, MortalityCause};
use drift_transport::CoastlinePolicy;

use crate::{Behavior, BehaviorResult, ParameterBlock, SetupContext, StepContext};

// ── Movement ──────────────────────────────────────────────────────────────────

/// Commits the displacement accumulated during the step.
///
/// A locked agent keeps its position and its pending displacement is
/// dropped.  A grid position left stale by a geographic update is refreshed
/// first, and one that cannot be converted kills with `OutOfDomain`.
/// Otherwise the displacement is reconciled with the land mask through the
/// coastline policy and applied; landing on land under `Beaching` kills
/// with `Beached`, landing on the domain edge kills with `OutOfDomain`.
#[derive(Copy, Clone, Debug, Default)]
pub struct MovementBehavior {
    pub coastline: CoastlinePolicy,
}

impl MovementBehavior {
    pub fn new(coastline: CoastlinePolicy) -> Self {
        Self { coastline }
    }
}

impl Behavior for MovementBehavior {
    fn load_parameters(&mut self, _params: &ParameterBlock, _setup: &SetupContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        if agent.is_locked() {
            agent.position.discard_move();
            return Ok(());
        }

        let Ok(from) = agent.position.to_grid(ctx.dataset) else {
            agent.position.discard_move();
            agent.kill(MortalityCause::OutOfDomain);
            return Ok(());
        };
        let resolved = self.coastline.resolve(ctx.dataset, from, agent.position.pending());
        agent.position.set_pending(resolved.delta);
        agent.position.apply_move(ctx.dataset)?;

        if resolved.beached {
            agent.kill(MortalityCause::Beached);
        }
        if agent.position.is_on_edge(ctx.dataset) {
            agent.kill(MortalityCause::OutOfDomain);
        }
        Ok(())
    }
}

// ── Aging ─────────────────────────────────────────────────────────────────────

/// Advances the agent's age by one step and enforces the maximum age.
///
/// A locked agent does not age.  Without `keep_drifting`, an agent whose
/// age exceeds `max_age_secs` dies with `TooOld`.
#[derive(Copy, Clone, Debug)]
pub struct AgingBehavior {
    pub max_age_secs:  f64,
    pub keep_drifting: bool,
}

impl AgingBehavior {
    pub fn new(max_age_secs: f64, keep_drifting: bool) -> Self {
        Self { max_age_secs, keep_drifting }
    }
}

impl Behavior for AgingBehavior {
    fn load_parameters(&mut self, _params: &ParameterBlock, _setup: &SetupContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        if agent.is_locked() {
            return Ok(());
        }
        agent.age_secs += ctx.dt_abs();
        if !self.keep_drifting && agent.age_secs > self.max_age_secs {
            agent.kill(MortalityCause::TooOld);
        }
        Ok(())
    }
}
