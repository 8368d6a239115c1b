//! Transport by the current.

use drift_agent::{Agent, MortalityCause};
use drift_transport::{AdvectionIntegrator, Scheme};

use crate::{Behavior, BehaviorResult, ParameterBlock, SetupContext, StepContext};

/// Adds the displacement computed by an [`AdvectionIntegrator`] to the
/// agent's pending move.
///
/// Parameters: `scheme` (`euler` or `rk4`, default `rk4`), `horizontal` and
/// `vertical` switches (default on).  An agent whose trajectory leaves the
/// sampleable domain is killed with `OutOfDomain`; locked agents are left
/// alone.
#[derive(Copy, Clone, Debug, Default)]
pub struct AdvectionBehavior {
    integrator: AdvectionIntegrator,
}

impl AdvectionBehavior {
    pub fn new(integrator: AdvectionIntegrator) -> Self {
        Self { integrator }
    }

    pub fn integrator(&self) -> AdvectionIntegrator {
        self.integrator
    }
}

impl Behavior for AdvectionBehavior {
    fn load_parameters(&mut self, params: &ParameterBlock, setup: &SetupContext<'_>) -> BehaviorResult<()> {
        let scheme: Scheme = params.parse_or("scheme", Scheme::default())?;
        let horizontal = params.flag("horizontal", true)?;
        let vertical = params.flag("vertical", true)? && setup.dataset.is_3d();
        self.integrator = AdvectionIntegrator::new(scheme).with_mask(horizontal, vertical);
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        if agent.is_locked() {
            return Ok(());
        }
        match self.integrator.displacement(ctx.dataset, agent.grid(), ctx.time, ctx.dt) {
            Ok(d) => agent.position.increment(d, false, false)?,
            Err(e) if e.is_out_of_domain() => {
                agent.kill(MortalityCause::OutOfDomain);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
