//! Plain data row types written by output backends.

use std::fmt;

use drift_agent::{Agent, MortalityCause, MortalityState};

/// What an agent is doing at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Alive,
    /// Alive but held in place (e.g. recruited with `stop_moving`).
    Locked,
    Dead(MortalityCause),
}

impl AgentStatus {
    pub fn of(agent: &Agent) -> Self {
        match agent.state() {
            MortalityState::Dead(cause)                => AgentStatus::Dead(cause),
            MortalityState::Alive if agent.is_locked() => AgentStatus::Locked,
            MortalityState::Alive                      => AgentStatus::Alive,
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Alive       => f.write_str("alive"),
            AgentStatus::Locked      => f.write_str("locked"),
            AgentStatus::Dead(cause) => write!(f, "dead:{cause}"),
        }
    }
}

/// One agent's position at a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRow {
    pub tick:     u64,
    /// Simulated time in seconds.
    pub time:     f64,
    pub agent_id: u32,
    pub lon:      f64,
    pub lat:      f64,
    /// Metres, negative below the surface.  Always 0 in 2-D runs.
    pub depth:    f64,
    pub age_secs: f64,
    pub status:   AgentStatus,
}

/// One agent death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortalityRow {
    /// The step during which the agent died.
    pub tick:     u64,
    pub agent_id: u32,
    pub cause:    MortalityCause,
}
