//! Fluent construction of a [`Population`] from release positions.
//!
//! # Usage
//!
//! ```rust
//! use drift_core::{GeoPoint, GridPos};
//! use drift_agent::PopulationBuilder;
//! use drift_field::RectilinearGridBuilder;
//!
//! let grid = RectilinearGridBuilder::new(10, 10).build().unwrap();
//!
//! let mut b = PopulationBuilder::new(/*seed=*/ 42);
//! b.add_grid(GridPos::xy(4.0, 5.0));
//! b.add_geo(GeoPoint::surface(0.03, 0.02));
//! let population = b.build(&grid);
//!
//! assert_eq!(population.len(), 2);
//! ```

use tracing::{info, warn};

use drift_core::{AgentId, GeoPoint, GridPos};
use drift_field::Dataset;

use crate::{Agent, Population, SpatialPoint};

#[derive(Clone, Copy, Debug)]
enum ReleasePoint {
    Grid(GridPos),
    Geo(GeoPoint),
}

/// Collects release positions, then resolves them against a dataset.
pub struct PopulationBuilder {
    seed:   u64,
    points: Vec<ReleasePoint>,
}

impl PopulationBuilder {
    /// Create a builder using `seed` as the global RNG seed.
    pub fn new(seed: u64) -> Self {
        Self { seed, points: Vec::new() }
    }

    /// Pre-allocate for the expected number of release points.
    pub fn with_capacity(seed: u64, capacity: usize) -> Self {
        Self { seed, points: Vec::with_capacity(capacity) }
    }

    pub fn add_grid(&mut self, p: GridPos) {
        self.points.push(ReleasePoint::Grid(p));
    }

    pub fn add_geo(&mut self, g: GeoPoint) {
        self.points.push(ReleasePoint::Geo(g));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Resolve every release point and build the population.
    ///
    /// Points that fall outside the grid or on land are skipped with a
    /// warning.  Ids are assigned monotonically over the kept points, so
    /// `population.agents()[i].id == AgentId(i)`.
    pub fn build(self, dataset: &dyn Dataset) -> Population {
        let bounds = dataset.bounds();
        let requested = self.points.len();
        let mut agents = Vec::with_capacity(requested);

        for (index, point) in self.points.into_iter().enumerate() {
            let mut position = match point {
                ReleasePoint::Grid(p) => SpatialPoint::from_grid(p, bounds),
                ReleasePoint::Geo(g) => SpatialPoint::from_geo(g, bounds),
            };
            if let Err(e) = position.to_grid(dataset) {
                warn!(index, error = %e, "release point skipped");
                continue;
            }
            if !position.is_in_water(dataset) {
                warn!(index, position = %position.grid(), "release point on land skipped");
                continue;
            }
            position.to_geo(dataset);

            let id = AgentId(agents.len() as u32);
            agents.push(Agent::new(id, position, self.seed));
        }

        info!(requested, released = agents.len(), "population built");
        Population::new(agents)
    }
}
