//! The ordered, frozen list of behaviors run on every agent.
//!
//! # Build
//!
//! [`BehaviorPipeline::build`] takes the configured blocks and:
//!
//! 1. rejects duplicate keys (including the reserved system keys),
//! 2. drops disabled blocks,
//! 3. stable-sorts the rest by [`Priority`],
//! 4. instantiates each kind from the registry and loads its parameters,
//! 5. appends the movement and aging stages.
//!
//! Any failure aborts the build and names the offending behavior key.  The
//! resulting pipeline exposes no mutation API.
//!
//! # Exclusivity
//!
//! While running an agent the pipeline remembers which entry first claimed
//! each axis.  A second exclusive claim surfaces from `SpatialPoint` as
//! `AgentError::ExclusivityViolation` and is reported as
//! [`BehaviorError::ExclusivityConflict`] naming both entries.

use drift_agent::{Agent, AgentError, Axis};
use drift_core::SimConfig;
use drift_transport::CoastlinePolicy;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::{
    AgingBehavior, Behavior, BehaviorError, BehaviorRegistry, BehaviorResult, MovementBehavior,
    ParamError, ParameterBlock, Priority, SetupContext, StepContext,
};

pub const MOVEMENT_KEY: &str = "system.movement";
pub const AGING_KEY: &str = "system.aging";

// ── SystemSettings ────────────────────────────────────────────────────────────

/// Configuration of the two reserved stages.
#[derive(Copy, Clone, Debug)]
pub struct SystemSettings {
    pub coastline:     CoastlinePolicy,
    pub max_age_secs:  f64,
    pub keep_drifting: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self::from_config(&SimConfig::default(), CoastlinePolicy::default())
    }
}

impl SystemSettings {
    /// Maximum age and keep-drifting flag taken from the run configuration.
    pub fn from_config(config: &SimConfig, coastline: CoastlinePolicy) -> Self {
        Self {
            coastline,
            max_age_secs:  config.transport_duration_secs,
            keep_drifting: config.keep_drifting,
        }
    }

    /// Like [`from_config`](Self::from_config), reading the coastline policy
    /// from its configuration name.  An absent name selects `Beaching`.
    pub fn parse(config: &SimConfig, coastline: Option<&str>) -> Result<Self, ParamError> {
        let policy = match coastline {
            Some(raw) => raw.parse::<CoastlinePolicy>().map_err(|e| ParamError::Invalid {
                name:   "coastline".into(),
                value:  raw.to_owned(),
                reason: e.to_string(),
            })?,
            None => {
                let policy = CoastlinePolicy::default();
                warn!(default = %policy, "coastline behavior not set, using default");
                policy
            }
        };
        Ok(Self::from_config(config, policy))
    }
}

// ── BehaviorPipeline ──────────────────────────────────────────────────────────

struct Entry {
    key:      String,
    kind:     String,
    priority: Priority,
    behavior: Box<dyn Behavior>,
}

/// Behaviors in execution order, movement and aging last.
pub struct BehaviorPipeline {
    entries: Vec<Entry>,
}

impl BehaviorPipeline {
    pub fn build(
        blocks:   &[ParameterBlock],
        registry: &BehaviorRegistry,
        setup:    &SetupContext<'_>,
        system:   SystemSettings,
    ) -> BehaviorResult<Self> {
        let mut seen: FxHashSet<&str> = [MOVEMENT_KEY, AGING_KEY].into_iter().collect();
        for block in blocks {
            if !seen.insert(block.key.as_str()) {
                return Err(BehaviorError::DuplicateKey(block.key.clone()));
            }
        }

        let mut enabled: Vec<&ParameterBlock> = Vec::with_capacity(blocks.len());
        for block in blocks {
            if block.enabled {
                enabled.push(block);
            } else {
                debug!(key = %block.key, kind = %block.kind, "behavior disabled");
            }
        }
        enabled.sort_by_key(|b| b.priority);

        let mut entries = Vec::with_capacity(enabled.len() + 2);
        for block in enabled {
            let mut behavior = registry.create(&block.kind).ok_or_else(|| BehaviorError::UnknownKind {
                key:  block.key.clone(),
                kind: block.kind.clone(),
            })?;
            behavior.load_parameters(block, setup).map_err(|e| match e {
                BehaviorError::Param(source) => BehaviorError::Setup { key: block.key.clone(), source },
                other => BehaviorError::Failed { key: block.key.clone(), source: Box::new(other) },
            })?;
            info!(key = %block.key, kind = %block.kind, priority = %block.priority, "behavior loaded");
            entries.push(Entry {
                key:      block.key.clone(),
                kind:     block.kind.clone(),
                priority: block.priority,
                behavior,
            });
        }

        entries.push(Entry {
            key:      MOVEMENT_KEY.into(),
            kind:     "movement".into(),
            priority: Priority::Low,
            behavior: Box::new(MovementBehavior::new(system.coastline)),
        });
        entries.push(Entry {
            key:      AGING_KEY.into(),
            kind:     "aging".into(),
            priority: Priority::Low,
            behavior: Box::new(AgingBehavior::new(system.max_age_secs, system.keep_drifting)),
        });

        info!(
            behaviors     = entries.len(),
            coastline     = %system.coastline,
            max_age_secs  = system.max_age_secs,
            keep_drifting = system.keep_drifting,
            "behavior pipeline frozen"
        );
        Ok(Self { entries })
    }

    /// Number of entries, the two system stages included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the system stages are always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry keys in execution order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// `(key, kind, priority)` of each entry in execution order.
    pub fn describe(&self) -> impl Iterator<Item = (&str, &str, Priority)> + '_ {
        self.entries.iter().map(|e| (e.key.as_str(), e.kind.as_str(), e.priority))
    }

    /// Run every entry's `init` on a freshly released agent.
    pub fn init_agent(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        for entry in &self.entries {
            entry.behavior.init(agent, ctx).map_err(|e| BehaviorError::Failed {
                key:    entry.key.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    /// Run one step of `agent` through every entry, stopping early if the
    /// agent dies.
    pub fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        if !agent.is_alive() {
            return Ok(());
        }

        // Index of the entry holding each axis: [horizontal, vertical].
        let mut holders: [Option<usize>; 2] = [None, None];

        for (i, entry) in self.entries.iter().enumerate() {
            match entry.behavior.execute(agent, ctx) {
                Ok(()) => {}
                Err(BehaviorError::Agent(AgentError::ExclusivityViolation { axis })) => {
                    let holder = holders[slot(axis)].unwrap_or(i);
                    return Err(BehaviorError::ExclusivityConflict {
                        axis,
                        holder:    self.entries[holder].key.clone(),
                        requester: entry.key.clone(),
                    });
                }
                Err(e) => {
                    return Err(BehaviorError::Failed { key: entry.key.clone(), source: Box::new(e) });
                }
            }

            for axis in [Axis::Horizontal, Axis::Vertical] {
                if holders[slot(axis)].is_none() && agent.position.is_claimed(axis) {
                    holders[slot(axis)] = Some(i);
                }
            }

            if !agent.is_alive() {
                break;
            }
        }
        Ok(())
    }
}

#[inline]
fn slot(axis: Axis) -> usize {
    match axis {
        Axis::Horizontal => 0,
        Axis::Vertical   => 1,
    }
}

impl std::fmt::Debug for BehaviorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
