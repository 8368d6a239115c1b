//! The simulated individual.

use drift_core::{AgentId, AgentRng, GridBounds, GridPos};

use crate::{LayerMap, MortalityCause, MortalityState, SpatialPoint};

/// One drifting organism.
///
/// An agent exclusively owns its position, life status, age, lock flag,
/// random stream, and layers; during a step it is touched by exactly one
/// worker thread.
#[derive(Clone, Debug)]
pub struct Agent {
    /// Stable identity, equal to the agent's index in its population.
    pub id: AgentId,

    pub position: SpatialPoint,

    /// Simulated seconds since release.  Never decreases, whatever the
    /// direction of the run.
    pub age_secs: f64,

    /// Per-agent deterministic random stream.
    pub rng: AgentRng,

    /// Behavior-owned extension state.
    pub layers: LayerMap,

    state:  MortalityState,
    locked: bool,
}

impl Agent {
    pub fn new(id: AgentId, position: SpatialPoint, seed: u64) -> Self {
        Self {
            id,
            position,
            age_secs: 0.0,
            rng: AgentRng::new(seed, id),
            layers: LayerMap::new(),
            state: MortalityState::Alive,
            locked: false,
        }
    }

    /// Convenience constructor for an agent released at a grid position.
    pub fn at_grid(id: AgentId, p: GridPos, bounds: GridBounds, seed: u64) -> Self {
        Self::new(id, SpatialPoint::from_grid(p, bounds), seed)
    }

    // ── Life status ───────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> MortalityState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Kill the agent.  The first cause wins: killing a dead agent is a
    /// no-op.  Returns `true` if this call did the killing.
    pub fn kill(&mut self, cause: MortalityCause) -> bool {
        if self.state.is_alive() {
            self.state = MortalityState::Dead(cause);
            true
        } else {
            false
        }
    }

    // ── Lock ──────────────────────────────────────────────────────────────

    /// Pin the agent in place.  Behaviors still run, but pending moves are
    /// discarded and the agent stops ageing until [`unlock`](Self::unlock).
    #[inline]
    pub fn lock(&mut self) {
        self.locked = true;
    }

    #[inline]
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    // ── Layers ────────────────────────────────────────────────────────────

    /// The attached layer of type `T`, if any.
    #[inline]
    pub fn layer<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.layers.get::<T>()
    }

    /// The layer of type `T`, created with `Default` on first access.
    #[inline]
    pub fn layer_mut<T: Clone + Default + Send + Sync + 'static>(&mut self) -> &mut T {
        self.layers.get_or_default::<T>()
    }

    // ── Shortcuts ─────────────────────────────────────────────────────────

    /// Cached grid position.
    #[inline]
    pub fn grid(&self) -> GridPos {
        self.position.grid()
    }
}
