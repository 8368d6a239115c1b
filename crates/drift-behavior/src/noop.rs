//! A behavior that does nothing.

use drift_agent::Agent;

use crate::{Behavior, BehaviorResult, ParameterBlock, SetupContext, StepContext};

/// A [`Behavior`] that never touches the agent.
///
/// Registered as `"noop"`.  Useful as a placeholder in configurations and
/// tests: agents only go through movement and aging.
#[derive(Debug, Default)]
pub struct NoopBehavior;

impl Behavior for NoopBehavior {
    fn load_parameters(&mut self, _params: &ParameterBlock, _setup: &SetupContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&self, _agent: &mut Agent, _ctx: &StepContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }
}
