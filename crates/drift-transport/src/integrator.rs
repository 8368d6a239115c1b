//! Numerical advection in grid space.
//!
//! # Schemes
//!
//! With `f(p, t) = velocity(p, t) * dt` (a displacement in cells):
//!
//! ```text
//! Euler:  Δp = f(p, t)
//!
//! RK4:    k1 = f(p,          t)
//!         k2 = f(p + k1 / 2, t + dt / 2)
//!         k3 = f(p + k2 / 2, t + dt / 2)
//!         k4 = f(p + k3,     t + dt)
//!         Δp = (k1 + 2 k2 + 2 k3 + k4) / 6
//! ```
//!
//! If an RK4 stage point lands on the edge of the domain the stages already
//! computed are used as they are: `k1 / 2`, `k2 / 2` or `k3` (horizontal
//! only).
//!
//! # Direction
//!
//! The sign of `dt` is the direction of the run.  Backward runs use a
//! two-pass scheme: a first pass from `p` predicts `p̃ = p + Δp`, and the
//! displacement returned is the one computed *at* `p̃`.  A predicted point on
//! the domain edge is reported as out of domain.
//!
//! # CFL advisory
//!
//! Any Euler component larger than one cell is logged with `warn!` and left
//! unchanged.

use std::str::FromStr;

use tracing::warn;

use drift_core::{Delta, GridPos};
use drift_field::{Dataset, FieldError, FieldResult};

use crate::TransportError;

/// Displacement (in cells) above which a step breaks the CFL condition.
pub const CFL_THRESHOLD: f64 = 1.0;

// ── FlowField ─────────────────────────────────────────────────────────────────

/// What the integrator needs from a velocity field.
///
/// Every [`Dataset`] is a `FlowField`; [`FnFlow`] wraps a bare closure for
/// analytic fields.
pub trait FlowField {
    /// Velocity in grid units per second.
    fn velocity(&self, p: GridPos, time: f64) -> FieldResult<Delta>;

    /// `true` if `p` lies on the outermost ring of the domain.
    fn is_on_edge(&self, _p: GridPos) -> bool {
        false
    }

    /// `true` if the vertical component is integrated.
    fn is_3d(&self) -> bool {
        false
    }
}

impl<D: Dataset + ?Sized> FlowField for D {
    fn velocity(&self, p: GridPos, time: f64) -> FieldResult<Delta> {
        Dataset::velocity(self, p, time)
    }

    fn is_on_edge(&self, p: GridPos) -> bool {
        Dataset::is_on_edge(self, p)
    }

    fn is_3d(&self) -> bool {
        Dataset::is_3d(self)
    }
}

/// An unbounded 2-D flow given by a closure.
pub struct FnFlow<F>(pub F);

impl<F> FlowField for FnFlow<F>
where
    F: Fn(GridPos, f64) -> Delta,
{
    fn velocity(&self, p: GridPos, time: f64) -> FieldResult<Delta> {
        Ok((self.0)(p, time))
    }
}

// ── Scheme ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Scheme {
    /// Explicit forward Euler.
    Euler,
    /// Classical fourth-order Runge-Kutta.
    #[default]
    Rk4,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Euler => "euler",
            Scheme::Rk4   => "rk4",
        }
    }
}

impl FromStr for Scheme {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" | "forward euler" => Ok(Scheme::Euler),
            "rk4" | "runge kutta 4" => Ok(Scheme::Rk4),
            _ => Err(TransportError::UnknownScheme(s.to_owned())),
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── AdvectionIntegrator ───────────────────────────────────────────────────────

/// Stateless advection routine: a scheme plus per-axis masks.
#[derive(Copy, Clone, Debug)]
pub struct AdvectionIntegrator {
    pub scheme: Scheme,
    /// Keep the horizontal components of the result.
    pub horizontal: bool,
    /// Keep the vertical component of the result.
    pub vertical: bool,
}

impl Default for AdvectionIntegrator {
    fn default() -> Self {
        Self::new(Scheme::default())
    }
}

impl AdvectionIntegrator {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme, horizontal: true, vertical: true }
    }

    /// Zero the horizontal and/or vertical part of every result.
    pub fn with_mask(mut self, horizontal: bool, vertical: bool) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    /// Displacement of a particle at `p` over one step of signed length `dt`
    /// starting at `time`.
    ///
    /// Fails with [`FieldError::OutOfDomain`] when the flow cannot be sampled
    /// along the way; callers treat that as the particle leaving the domain.
    pub fn displacement<F>(&self, flow: &F, p: GridPos, time: f64, dt: f64) -> FieldResult<Delta>
    where
        F: FlowField + ?Sized,
    {
        let d = if dt >= 0.0 {
            self.step(flow, p, time, dt)?
        } else {
            self.backward(flow, p, time, dt)?
        };
        Ok(d.masked(self.horizontal, self.vertical))
    }

    fn step<F>(&self, flow: &F, p: GridPos, time: f64, dt: f64) -> FieldResult<Delta>
    where
        F: FlowField + ?Sized,
    {
        match self.scheme {
            Scheme::Euler => euler(flow, p, time, dt),
            Scheme::Rk4 => rk4(flow, p, time, dt),
        }
    }

    fn backward<F>(&self, flow: &F, p: GridPos, time: f64, dt: f64) -> FieldResult<Delta>
    where
        F: FlowField + ?Sized,
    {
        let predicted = p + self.step(flow, p, time, dt)?;
        if flow.is_on_edge(predicted) {
            return Err(FieldError::OutOfDomain(predicted));
        }
        self.step(flow, predicted, time, dt)
    }
}

/// One explicit Euler step, with the CFL advisory.
pub fn euler<F>(flow: &F, p: GridPos, time: f64, dt: f64) -> FieldResult<Delta>
where
    F: FlowField + ?Sized,
{
    let mut d = flow.velocity(p, time)? * dt;
    if !flow.is_3d() {
        d.dz = 0.0;
    }
    for (component, value) in ["u", "v", "w"].into_iter().zip(d.to_array()) {
        if value.abs() > CFL_THRESHOLD {
            warn!(component, displacement = value, position = %p, "CFL condition broken");
        }
    }
    Ok(d)
}

/// One classical RK4 step.
pub fn rk4<F>(flow: &F, p: GridPos, time: f64, dt: f64) -> FieldResult<Delta>
where
    F: FlowField + ?Sized,
{
    let k1 = euler(flow, p, time, dt)?;
    let pk = p + k1 * 0.5;
    if flow.is_on_edge(pk) {
        return Ok(Delta::horizontal(0.5 * k1.dx, 0.5 * k1.dy));
    }

    let k2 = euler(flow, pk, time + 0.5 * dt, dt)?;
    let pk = p + k2 * 0.5;
    if flow.is_on_edge(pk) {
        return Ok(Delta::horizontal(0.5 * k2.dx, 0.5 * k2.dy));
    }

    let k3 = euler(flow, pk, time + 0.5 * dt, dt)?;
    let pk = p + k3;
    if flow.is_on_edge(pk) {
        return Ok(Delta::horizontal(k3.dx, k3.dy));
    }

    let k4 = euler(flow, pk, time + dt, dt)?;
    Ok((k1 + k2 * 2.0 + k3 * 2.0 + k4) * (1.0 / 6.0))
}
