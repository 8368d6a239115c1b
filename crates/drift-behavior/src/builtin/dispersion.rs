//! Horizontal turbulent dispersion.
//!
//! A uniform random walk scaled by the turbulent dissipation rate `ε` and
//! the local cell size `dL`:
//!
//! ```text
//! cff = sqrt(2·|dt|) · ε^(1/6) · dL^(2/3)
//! dx  = R · cff / cell_dx      R uniform in [-1, 1)
//! ```
//!
//! A draw that would put the agent on land is retried, at most
//! [`MAX_DRAWS`] times; if every draw lands on land the agent gets no
//! dispersion this step.

use drift_agent::Agent;
use drift_core::{Delta, GridPos};
use drift_field::Dataset;

use crate::{Behavior, BehaviorResult, ParamError, ParameterBlock, SetupContext, StepContext};

pub const MAX_DRAWS: usize = 5;
pub const DEFAULT_EPSILON: f64 = 1e-9;

#[derive(Copy, Clone, Debug)]
pub struct DispersionBehavior {
    /// `ε^(1/6)`, precomputed.
    epsilon16: f64,
}

impl Default for DispersionBehavior {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl DispersionBehavior {
    /// `epsilon` is the turbulent dissipation rate in m²/s³.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon16: epsilon.powf(1.0 / 6.0) }
    }

    fn random_move(&self, agent: &mut Agent, dataset: &dyn Dataset, i: usize, j: usize, dt: f64) -> Delta {
        let (cell_dx, cell_dy) = dataset.cell_size(i, j);
        let dl = 0.5 * (cell_dx + cell_dy);
        let cff = (2.0 * dt.abs()).sqrt() * self.epsilon16 * dl.powf(2.0 / 3.0);
        let rx = agent.rng.symmetric();
        let ry = agent.rng.symmetric();
        Delta::horizontal(rx * cff / cell_dx, ry * cff / cell_dy)
    }
}

impl Behavior for DispersionBehavior {
    fn load_parameters(&mut self, params: &ParameterBlock, _setup: &SetupContext<'_>) -> BehaviorResult<()> {
        let epsilon: f64 = params.parse_or("epsilon", DEFAULT_EPSILON)?;
        if !(epsilon.is_finite() && epsilon >= 0.0) {
            return Err(ParamError::Invalid {
                name:   "epsilon".into(),
                value:  epsilon.to_string(),
                reason: "must be a non-negative dissipation rate".into(),
            }
            .into());
        }
        *self = Self::new(epsilon);
        Ok(())
    }

    fn execute(&self, agent: &mut Agent, ctx: &StepContext<'_>) -> BehaviorResult<()> {
        let p = agent.grid();
        let (i, j) = nearest_cell(ctx.dataset, p);
        for _ in 0..MAX_DRAWS {
            let d = self.random_move(agent, ctx.dataset, i, j, ctx.dt);
            if ctx.dataset.is_in_water(p + d) {
                agent.position.increment(d, false, false)?;
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Nearest cell to `p`, clamped into the grid.
fn nearest_cell(dataset: &dyn Dataset, p: GridPos) -> (usize, usize) {
    let b = dataset.bounds();
    let (i, j) = p.nearest_cell();
    (
        i.clamp(0, b.nx as i64 - 1) as usize,
        j.clamp(0, b.ny as i64 - 1) as usize,
    )
}
