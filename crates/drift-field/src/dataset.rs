//! The field collaborator interface.
//!
//! # Conventions
//!
//! - Grid positions are fractional cell indices; cell `(i, j)` is centred on
//!   integer coordinates.
//! - Velocities are returned in **grid units per second** so that the
//!   integrator can work entirely in index space.
//! - Depths are metres, negative below the surface.  Bathymetry is metres,
//!   positive downwards.
//!
//! # Thread safety
//!
//! A dataset is shared read-only by every worker thread during a step, so
//! implementations must be `Send + Sync` and must not mutate on read.

use drift_core::{Delta, GeoPoint, GridBounds, GridPos};

use crate::FieldResult;

pub trait Dataset: Send + Sync {
    /// Extents and periodicity of the grid.
    fn bounds(&self) -> GridBounds;

    /// `true` if the grid has vertical levels.
    fn is_3d(&self) -> bool {
        self.bounds().is_3d()
    }

    /// Current velocity at `p` and `time`, in grid units per second.
    ///
    /// Returns [`FieldError::OutOfDomain`](crate::FieldError::OutOfDomain)
    /// when `p` lies outside the sampleable range.
    fn velocity(&self, p: GridPos, time: f64) -> FieldResult<Delta>;

    /// Sample a named scalar variable (temperature, salinity, ...).
    fn sample(&self, variable: &str, p: GridPos, time: f64) -> FieldResult<f64>;

    /// `true` if [`sample`](Self::sample) knows `variable`.
    fn has_variable(&self, variable: &str) -> bool;

    /// `true` if the cell nearest `p` is water.  Positions off the grid are
    /// never in water.
    fn is_in_water(&self, p: GridPos) -> bool;

    /// `true` if `p` lies in the outermost ring of cells.
    fn is_on_edge(&self, p: GridPos) -> bool;

    fn grid_to_geo(&self, p: GridPos) -> GeoPoint;

    fn geo_to_grid(&self, g: GeoPoint) -> FieldResult<GridPos>;

    /// Zonal and meridional size of cell `(i, j)` in metres.
    fn cell_size(&self, i: usize, j: usize) -> (f64, f64);

    /// Bottom depth of cell `(i, j)` in metres, if the dataset carries one.
    fn bathymetry(&self, i: usize, j: usize) -> Option<f64>;

    /// Depth in metres (negative) of the fractional level `p.z`.  Always
    /// `0.0` in 2-D.
    fn depth_of_level(&self, p: GridPos) -> f64;

    /// Fractional level index of `depth` at horizontal position `(x, y)`.
    /// Always `0.0` in 2-D.
    fn level_of_depth(&self, x: f64, y: f64, depth: f64) -> f64;
}
