//! Dual-representation agent position.
//!
//! # Design
//!
//! A `SpatialPoint` caches an agent's position both in grid space and in
//! geographic space.  Converting between the two needs the dataset, so each
//! representation carries a dirty flag and is only recomputed on demand:
//!
//! - `grid_dirty`: the grid cache is stale; the geographic value is current.
//! - `geo_dirty`:  the geographic cache is stale; the grid value is current.
//!
//! At most one flag is set at a time.  Behaviors always work in grid space,
//! so during a run the geographic side is the one that goes stale after each
//! committed move and is refreshed lazily (typically by the output layer).
//!
//! # Pending displacement
//!
//! Behaviors never move an agent directly.  They call [`SpatialPoint::increment`]
//! and the deltas accumulate until the movement stage commits them with
//! [`SpatialPoint::apply_move`].  Each axis (horizontal, vertical) can be
//! claimed *exclusively* once per step: the exclusive delta replaces whatever
//! was accumulated and later additive deltas on that axis are ignored.  A
//! second exclusive claim on the same axis is a contract violation.

use drift_core::{Delta, GeoPoint, GridBounds, GridPos};
use drift_field::Dataset;

use crate::{AgentError, AgentResult, Axis};

#[derive(Clone, Debug)]
pub struct SpatialPoint {
    grid:       GridPos,
    geo:        GeoPoint,
    grid_dirty: bool,
    geo_dirty:  bool,

    pending:     Delta,
    exclusive_h: bool,
    exclusive_v: bool,

    bounds: GridBounds,
}

impl SpatialPoint {
    /// A point known in grid space.  The geographic side starts stale.
    pub fn from_grid(p: GridPos, bounds: GridBounds) -> Self {
        Self {
            grid:        normalize(p, bounds),
            geo:         GeoPoint::default(),
            grid_dirty:  false,
            geo_dirty:   true,
            pending:     Delta::ZERO,
            exclusive_h: false,
            exclusive_v: false,
            bounds,
        }
    }

    /// A point known in geographic space.  The grid side starts stale.
    pub fn from_geo(g: GeoPoint, bounds: GridBounds) -> Self {
        let g = if bounds.is_3d() { g } else { GeoPoint { depth: 0.0, ..g } };
        Self {
            grid:        GridPos::default(),
            geo:         g,
            grid_dirty:  true,
            geo_dirty:   false,
            pending:     Delta::ZERO,
            exclusive_h: false,
            exclusive_v: false,
            bounds,
        }
    }

    // ── Representations ───────────────────────────────────────────────────

    /// Cached grid position.  Only meaningful while `!is_grid_dirty()`.
    #[inline]
    pub fn grid(&self) -> GridPos {
        self.grid
    }

    /// Cached geographic position.  Only meaningful while `!is_geo_dirty()`.
    #[inline]
    pub fn geo(&self) -> GeoPoint {
        self.geo
    }

    #[inline]
    pub fn is_grid_dirty(&self) -> bool {
        self.grid_dirty
    }

    #[inline]
    pub fn is_geo_dirty(&self) -> bool {
        self.geo_dirty
    }

    #[inline]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Overwrite the grid position.  The geographic cache is invalidated
    /// only if the position actually changed.
    pub fn set_grid(&mut self, p: GridPos) {
        let p = normalize(p, self.bounds);
        if self.grid_dirty || p != self.grid {
            self.grid = p;
            self.geo_dirty = true;
        }
        self.grid_dirty = false;
    }

    /// Overwrite the geographic position.  The grid cache is invalidated
    /// only if the position actually changed.
    pub fn set_geo(&mut self, g: GeoPoint) {
        let g = if self.bounds.is_3d() { g } else { GeoPoint { depth: 0.0, ..g } };
        if self.geo_dirty || g != self.geo {
            self.geo = g;
            self.grid_dirty = true;
        }
        self.geo_dirty = false;
    }

    /// Current grid position, converting from geographic space if stale.
    pub fn to_grid(&mut self, dataset: &dyn Dataset) -> AgentResult<GridPos> {
        if self.grid_dirty {
            let p = dataset.geo_to_grid(self.geo)?;
            self.grid = normalize(p, self.bounds);
            self.grid_dirty = false;
        }
        Ok(self.grid)
    }

    /// Current geographic position, converting from grid space if stale.
    pub fn to_geo(&mut self, dataset: &dyn Dataset) -> GeoPoint {
        if self.geo_dirty {
            self.geo = dataset.grid_to_geo(self.grid);
            self.geo_dirty = false;
        }
        self.geo
    }

    /// Geographic position without touching the cache: the cached value when
    /// current, a fresh conversion otherwise.
    pub fn current_geo(&self, dataset: &dyn Dataset) -> GeoPoint {
        if self.geo_dirty { dataset.grid_to_geo(self.grid) } else { self.geo }
    }

    // ── Pending displacement ──────────────────────────────────────────────

    /// Accumulate a displacement request.
    ///
    /// With `exclusive_h`/`exclusive_v` the horizontal/vertical part of
    /// `delta` replaces the accumulated one and claims the axis for the rest
    /// of the step.  Without it, the part is added unless the axis is
    /// already claimed.  Requesting an exclusive claim on an axis that is
    /// already claimed fails with [`AgentError::ExclusivityViolation`] and
    /// leaves the accumulator untouched.
    pub fn increment(&mut self, delta: Delta, exclusive_h: bool, exclusive_v: bool) -> AgentResult<()> {
        if exclusive_h && self.exclusive_h {
            return Err(AgentError::ExclusivityViolation { axis: Axis::Horizontal });
        }
        if exclusive_v && self.exclusive_v {
            return Err(AgentError::ExclusivityViolation { axis: Axis::Vertical });
        }

        if exclusive_h {
            self.pending.dx = delta.dx;
            self.pending.dy = delta.dy;
            self.exclusive_h = true;
        } else if !self.exclusive_h {
            self.pending.dx += delta.dx;
            self.pending.dy += delta.dy;
        }

        if self.bounds.is_3d() {
            if exclusive_v {
                self.pending.dz = delta.dz;
                self.exclusive_v = true;
            } else if !self.exclusive_v {
                self.pending.dz += delta.dz;
            }
        }
        Ok(())
    }

    /// The displacement accumulated so far this step.
    #[inline]
    pub fn pending(&self) -> Delta {
        self.pending
    }

    /// `true` if the given axis has been claimed exclusively this step.
    #[inline]
    pub fn is_claimed(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.exclusive_h,
            Axis::Vertical   => self.exclusive_v,
        }
    }

    /// Commit the pending displacement into the grid position, then reset
    /// the accumulator and both claims.
    ///
    /// A stale grid position is first refreshed from the geographic one, so
    /// the move lands relative to where the agent actually is.  If that
    /// conversion fails nothing is committed and the pending displacement is
    /// kept.  A second call with nothing pending leaves the point unchanged.
    pub fn apply_move(&mut self, dataset: &dyn Dataset) -> AgentResult<()> {
        self.to_grid(dataset)?;
        if !self.pending.is_zero() {
            let target = normalize(self.grid + self.pending, self.bounds);
            if target != self.grid {
                self.grid = target;
                self.geo_dirty = true;
            }
        }
        self.reset_pending();
        Ok(())
    }

    /// Overwrite the pending displacement, keeping the current claims.
    ///
    /// Used by the movement stage to substitute the collision-resolved
    /// displacement before committing it.
    pub fn set_pending(&mut self, delta: Delta) {
        self.pending = if self.bounds.is_3d() { delta } else { Delta { dz: 0.0, ..delta } };
    }

    /// Drop the pending displacement without moving.
    pub fn discard_move(&mut self) {
        self.reset_pending();
    }

    fn reset_pending(&mut self) {
        self.pending = Delta::ZERO;
        self.exclusive_h = false;
        self.exclusive_v = false;
    }

    // ── Field queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn is_in_water(&self, dataset: &dyn Dataset) -> bool {
        dataset.is_in_water(self.grid)
    }

    #[inline]
    pub fn is_on_edge(&self, dataset: &dyn Dataset) -> bool {
        dataset.is_on_edge(self.grid)
    }
}

/// Wrap `x` on periodic grids and clamp `z` into the level range.
#[inline]
fn normalize(p: GridPos, bounds: GridBounds) -> GridPos {
    GridPos::new(bounds.wrap_x(p.x), p.y, bounds.clamp_z(p.z))
}
