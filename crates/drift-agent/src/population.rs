//! The agent collection and its fork/join step.
//!
//! # Scheduling
//!
//! [`Population::step`] splits the agent slice in half, recursively, while a
//! sub-slice holds more than `threshold` agents.  Both halves of a split run
//! as independent tasks (`rayon::join` with the `parallel` feature, one after
//! the other without it) and are synchronised only when the step returns.
//! Slices of at most `threshold` agents are walked sequentially.
//!
//! Agents never read each other's state during a step, and each agent owns
//! its random stream, so the outcome is identical for any threshold or
//! thread count.
//!
//! # Errors
//!
//! A slice stops at its first failing agent; sibling slices run to
//! completion.  After the join the error of the lowest-indexed failing agent
//! is returned, which is again independent of the partitioning.

use drift_core::AgentId;

use crate::Agent;

/// An ordered collection of agents indexed by `AgentId`.
///
/// Dead agents stay in place (for output) but are skipped by `step`.
#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: Vec<Agent>,
}

impl Population {
    /// Wrap `agents`, which must be ordered by id with `agents[i].id == i`.
    pub fn new(agents: Vec<Agent>) -> Self {
        debug_assert!(agents.iter().enumerate().all(|(i, a)| a.id.index() == i));
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    pub fn living_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Run `f` once on every living agent.
    ///
    /// A sub-slice is split in two while its length exceeds `threshold`
    /// (values below 1 are treated as 1) and run sequentially otherwise.
    pub fn step<E, F>(&mut self, threshold: usize, f: F) -> Result<(), E>
    where
        F: Fn(&mut Agent) -> Result<(), E> + Sync,
        E: Send,
    {
        step_slice(&mut self.agents, threshold.max(1), &f)
    }
}

fn step_slice<E, F>(agents: &mut [Agent], threshold: usize, f: &F) -> Result<(), E>
where
    F: Fn(&mut Agent) -> Result<(), E> + Sync,
    E: Send,
{
    if agents.len() <= threshold {
        for agent in agents.iter_mut() {
            if agent.is_alive() {
                f(agent)?;
            }
        }
        return Ok(());
    }

    let mid = agents.len() / 2;
    let (left, right) = agents.split_at_mut(mid);

    #[cfg(feature = "parallel")]
    let (l, r) = rayon::join(
        || step_slice(left, threshold, f),
        || step_slice(right, threshold, f),
    );

    #[cfg(not(feature = "parallel"))]
    let (l, r) = (step_slice(left, threshold, f), step_slice(right, threshold, f));

    // Left holds the lower indices.
    l.and(r)
}

impl FromIterator<Agent> for Population {
    fn from_iter<I: IntoIterator<Item = Agent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
