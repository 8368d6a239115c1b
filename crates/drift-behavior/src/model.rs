//! The `Behavior` trait, the main extension point for user code.

use drift_agent::Agent;

use crate::{BehaviorResult, ParameterBlock, SetupContext, StepContext};

/// Pluggable per-step agent logic.
///
/// # Lifecycle
///
/// 1. A factory in the [`BehaviorRegistry`](crate::BehaviorRegistry) builds
///    the behavior in its default state.
/// 2. [`load_parameters`](Self::load_parameters) reads the behavior's
///    [`ParameterBlock`] once, before any agent exists.  Every constant or
///    lookup table the behavior needs is built here and kept as instance
///    state.
/// 3. [`init`](Self::init) runs once per agent at release.
/// 4. [`execute`](Self::execute) runs once per living agent per step.
///
/// # Contract
///
/// `execute` may request displacements through
/// `agent.position.increment(...)`, kill the agent, lock it, or update its
/// layers.  It must not commit moves; that is the movement stage's job.
///
/// # Thread safety
///
/// After setup the behavior is shared immutably and `execute` is called for
/// many agents in parallel, so implementations must be `Send + Sync`.  State
/// that varies per agent belongs in the agent's layers.
pub trait Behavior: Send + Sync + 'static {
    fn load_parameters(&mut self, params: &ParameterBlock, setup: &SetupContext<'_>) -> BehaviorResult<()>;

    /// Called once per agent at release.  Default: nothing.
    fn init(&self, _agent: &mut Agent, _ctx: &StepContext<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()>;
}
