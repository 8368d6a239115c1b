//! In-memory rectilinear dataset.
//!
//! # Layout
//!
//! A regular longitude/latitude lattice: cell `(i, j)` is centred on
//!
//! ```text
//! lon = lon0 + i * dlon
//! lat = lat0 + j * dlat
//! ```
//!
//! Vertical levels are listed from the deepest (`z = 0`) to the surface
//! (`z = nz - 1`), as depths in metres (negative below the surface).
//!
//! The land mask and bathymetry are stored row-major (`j * nx + i`).  Fields
//! are plain closures, so analytic flows (uniform drift, solid-body
//! rotation, gyres) need no files at all.

use rustc_hash::FxHashMap;
use tracing::debug;

use drift_core::{Delta, GeoPoint, GridBounds, GridPos};

use crate::dataset::Dataset;
use crate::{FieldError, FieldResult};

type VelocityFn = Box<dyn Fn(GridPos, f64) -> Delta + Send + Sync>;
type ScalarFn = Box<dyn Fn(GridPos, f64) -> f64 + Send + Sync>;

// ── RectilinearGrid ───────────────────────────────────────────────────────────

/// A closure-backed [`Dataset`] over a regular lon/lat grid.
///
/// Do not construct directly; use [`RectilinearGridBuilder`].
pub struct RectilinearGrid {
    bounds: GridBounds,
    lon0:   f64,
    lat0:   f64,
    dlon:   f64,
    dlat:   f64,
    levels: Vec<f64>,
    water:  Vec<bool>,
    bathy:  Option<Vec<f64>>,

    // Cell sizes depend on latitude only; one entry per row.
    row_dx_m: Vec<f64>,
    row_dy_m: Vec<f64>,

    velocity: VelocityFn,
    scalars:  FxHashMap<String, ScalarFn>,
}

impl RectilinearGrid {
    pub fn builder(nx: usize, ny: usize) -> RectilinearGridBuilder {
        RectilinearGridBuilder::new(nx, ny)
    }

    /// `true` if cell `(i, j)` is water.  Cells off the grid are land.
    #[inline]
    pub fn is_water_cell(&self, i: i64, j: i64) -> bool {
        let i = if self.bounds.periodic_x {
            i.rem_euclid(self.bounds.nx as i64)
        } else {
            i
        };
        self.bounds.contains_cell(i, j) && self.water[j as usize * self.bounds.nx + i as usize]
    }

    /// Names of the scalar variables this grid can sample.
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.scalars.keys().map(String::as_str)
    }

    /// Return `p` with `x` wrapped, or `OutOfDomain` if `p` cannot be
    /// sampled.
    fn sampleable(&self, p: GridPos) -> FieldResult<GridPos> {
        let b = &self.bounds;
        if !p.is_finite() {
            return Err(FieldError::OutOfDomain(p));
        }
        let x = b.wrap_x(p.x);
        let x_ok = b.periodic_x || (x >= 0.0 && x <= (b.nx - 1) as f64);
        let y_ok = p.y >= 0.0 && p.y <= (b.ny - 1) as f64;
        if !(x_ok && y_ok) {
            return Err(FieldError::OutOfDomain(p));
        }
        Ok(GridPos::new(x, p.y, b.clamp_z(p.z)))
    }
}

impl Dataset for RectilinearGrid {
    fn bounds(&self) -> GridBounds {
        self.bounds
    }

    fn velocity(&self, p: GridPos, time: f64) -> FieldResult<Delta> {
        let p = self.sampleable(p)?;
        Ok((self.velocity)(p, time))
    }

    fn has_variable(&self, variable: &str) -> bool {
        self.scalars.contains_key(variable)
    }

    fn sample(&self, variable: &str, p: GridPos, time: f64) -> FieldResult<f64> {
        let f = self
            .scalars
            .get(variable)
            .ok_or_else(|| FieldError::UnknownVariable(variable.to_owned()))?;
        let p = self.sampleable(p)?;
        Ok(f(p, time))
    }

    fn is_in_water(&self, p: GridPos) -> bool {
        if !p.is_finite() {
            return false;
        }
        let (i, j) = p.nearest_cell();
        self.is_water_cell(i, j)
    }

    fn is_on_edge(&self, p: GridPos) -> bool {
        let b = &self.bounds;
        let x_edge = !b.periodic_x && (p.x < 1.0 || p.x > (b.nx - 2) as f64);
        x_edge || p.y < 1.0 || p.y > (b.ny - 2) as f64
    }

    fn grid_to_geo(&self, p: GridPos) -> GeoPoint {
        let depth = if self.bounds.is_3d() { self.depth_of_level(p) } else { 0.0 };
        GeoPoint::new(self.lat0 + p.y * self.dlat, self.lon0 + p.x * self.dlon, depth)
    }

    fn geo_to_grid(&self, g: GeoPoint) -> FieldResult<GridPos> {
        let b = &self.bounds;
        let x = b.wrap_x((g.lon - self.lon0) / self.dlon);
        let y = (g.lat - self.lat0) / self.dlat;
        let x_ok = b.periodic_x || (x >= -0.5 && x < b.nx as f64 - 0.5);
        let y_ok = y >= -0.5 && y < b.ny as f64 - 0.5;
        if !(x_ok && y_ok) || !x.is_finite() || !y.is_finite() {
            return Err(FieldError::GeoOutOfDomain(g));
        }
        let z = if b.is_3d() { self.level_of_depth(x, y, g.depth) } else { 0.0 };
        Ok(GridPos::new(x, y, z))
    }

    fn cell_size(&self, _i: usize, j: usize) -> (f64, f64) {
        let j = j.min(self.bounds.ny - 1);
        (self.row_dx_m[j], self.row_dy_m[j])
    }

    fn bathymetry(&self, i: usize, j: usize) -> Option<f64> {
        if !self.bounds.contains_cell(i as i64, j as i64) {
            return None;
        }
        self.bathy.as_ref().map(|b| b[j * self.bounds.nx + i])
    }

    fn depth_of_level(&self, p: GridPos) -> f64 {
        let n = self.levels.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 {
            return self.levels[0];
        }
        let z = p.z.clamp(0.0, (n - 1) as f64);
        let k = (z.floor() as usize).min(n - 2);
        let frac = z - k as f64;
        self.levels[k] + frac * (self.levels[k + 1] - self.levels[k])
    }

    fn level_of_depth(&self, _x: f64, _y: f64, depth: f64) -> f64 {
        let n = self.levels.len();
        if n < 2 {
            return 0.0;
        }
        let depth = depth.clamp(self.levels[0], self.levels[n - 1]);
        for k in 0..n - 1 {
            let (lo, hi) = (self.levels[k], self.levels[k + 1]);
            if depth <= hi {
                return k as f64 + (depth - lo) / (hi - lo);
            }
        }
        (n - 1) as f64
    }
}

// ── RectilinearGridBuilder ────────────────────────────────────────────────────

enum VelocitySpec {
    /// Closure already returns grid units per second.
    Grid(VelocityFn),
    /// Closure returns metres per second horizontally; converted per row.
    Metric(VelocityFn),
}

/// Construct a [`RectilinearGrid`], then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use drift_core::{Delta, GridPos};
/// use drift_field::{Dataset, RectilinearGridBuilder};
///
/// let grid = RectilinearGridBuilder::new(20, 10)
///     .origin(-5.0, 43.0)
///     .resolution(0.05, 0.05)
///     .land_where(|i, _| i >= 15)
///     .velocity(|_, _| Delta::horizontal(1e-4, 0.0))
///     .build()
///     .unwrap();
/// assert!(grid.is_in_water(GridPos::xy(3.0, 4.0)));
/// assert!(!grid.is_in_water(GridPos::xy(16.0, 4.0)));
/// ```
pub struct RectilinearGridBuilder {
    nx:         usize,
    ny:         usize,
    lon0:       f64,
    lat0:       f64,
    dlon:       f64,
    dlat:       f64,
    levels:     Vec<f64>,
    periodic_x: bool,
    water:      Vec<bool>,
    bathy:      Option<Vec<f64>>,
    velocity:   Option<VelocitySpec>,
    scalars:    FxHashMap<String, ScalarFn>,
}

impl RectilinearGridBuilder {
    /// An all-water `nx × ny` surface grid at the origin with 0.01° cells.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            lon0:       0.0,
            lat0:       0.0,
            dlon:       0.01,
            dlat:       0.01,
            levels:     Vec::new(),
            periodic_x: false,
            water:      vec![true; nx * ny],
            bathy:      None,
            velocity:   None,
            scalars:    FxHashMap::default(),
        }
    }

    /// Longitude and latitude of the centre of cell `(0, 0)`.
    pub fn origin(mut self, lon0: f64, lat0: f64) -> Self {
        self.lon0 = lon0;
        self.lat0 = lat0;
        self
    }

    /// Cell spacing in degrees.
    pub fn resolution(mut self, dlon: f64, dlat: f64) -> Self {
        self.dlon = dlon;
        self.dlat = dlat;
        self
    }

    /// Vertical level depths from the deepest to the surface, in metres
    /// (negative below the surface).  Makes the grid 3-D.
    pub fn levels(mut self, depths: Vec<f64>) -> Self {
        self.levels = depths;
        self
    }

    pub fn periodic_x(mut self, periodic: bool) -> Self {
        self.periodic_x = periodic;
        self
    }

    /// Mark every cell for which `is_land(i, j)` holds as land.
    pub fn land_where(mut self, is_land: impl Fn(usize, usize) -> bool) -> Self {
        for j in 0..self.ny {
            for i in 0..self.nx {
                if is_land(i, j) {
                    self.water[j * self.nx + i] = false;
                }
            }
        }
        self
    }

    pub fn land_cell(mut self, i: usize, j: usize) -> Self {
        if i < self.nx && j < self.ny {
            self.water[j * self.nx + i] = false;
        }
        self
    }

    /// Bottom depth in metres (positive) of each cell.
    pub fn bathymetry(mut self, depth_at: impl Fn(usize, usize) -> f64) -> Self {
        let mut bathy = Vec::with_capacity(self.nx * self.ny);
        for j in 0..self.ny {
            for i in 0..self.nx {
                bathy.push(depth_at(i, j));
            }
        }
        self.bathy = Some(bathy);
        self
    }

    /// Velocity field in grid units per second.
    pub fn velocity(
        mut self,
        f: impl Fn(GridPos, f64) -> Delta + Send + Sync + 'static,
    ) -> Self {
        self.velocity = Some(VelocitySpec::Grid(Box::new(f)));
        self
    }

    /// Velocity field with horizontal components in metres per second.
    /// `dz` is passed through unchanged (levels per second).
    pub fn velocity_metric(
        mut self,
        f: impl Fn(GridPos, f64) -> Delta + Send + Sync + 'static,
    ) -> Self {
        self.velocity = Some(VelocitySpec::Metric(Box::new(f)));
        self
    }

    /// Register a named scalar variable.
    pub fn scalar(
        mut self,
        name: impl Into<String>,
        f: impl Fn(GridPos, f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.scalars.insert(name.into(), Box::new(f));
        self
    }

    /// Validate the configuration and produce a [`RectilinearGrid`].
    pub fn build(self) -> FieldResult<RectilinearGrid> {
        if self.nx < 3 || self.ny < 3 {
            return Err(FieldError::InvalidGrid(format!(
                "grid must be at least 3x3 cells, got {}x{}",
                self.nx, self.ny
            )));
        }
        if !(self.dlon > 0.0 && self.dlat > 0.0) {
            return Err(FieldError::InvalidGrid(format!(
                "cell spacing must be positive, got {} x {}",
                self.dlon, self.dlat
            )));
        }
        if self.levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FieldError::InvalidGrid(
                "levels must be listed from the deepest to the surface".into(),
            ));
        }

        let (row_dx_m, row_dy_m): (Vec<f64>, Vec<f64>) = (0..self.ny)
            .map(|j| {
                let lat = self.lat0 + j as f64 * self.dlat;
                let west = GeoPoint::surface(lat, self.lon0 - 0.5 * self.dlon);
                let east = GeoPoint::surface(lat, self.lon0 + 0.5 * self.dlon);
                let south = GeoPoint::surface(lat - 0.5 * self.dlat, self.lon0);
                let north = GeoPoint::surface(lat + 0.5 * self.dlat, self.lon0);
                (west.distance_m(east), south.distance_m(north))
            })
            .unzip();

        let ny = self.ny;
        let velocity: VelocityFn = match self.velocity {
            None => Box::new(|_, _| Delta::ZERO),
            Some(VelocitySpec::Grid(f)) => f,
            Some(VelocitySpec::Metric(f)) => {
                let dx = row_dx_m.clone();
                let dy = row_dy_m.clone();
                Box::new(move |p, t| {
                    let j = (p.y.round().max(0.0) as usize).min(ny - 1);
                    let d = f(p, t);
                    Delta::new(d.dx / dx[j], d.dy / dy[j], d.dz)
                })
            }
        };

        let nz = if self.levels.is_empty() { None } else { Some(self.levels.len()) };
        let bounds = GridBounds { nx: self.nx, ny: self.ny, nz, periodic_x: self.periodic_x };

        debug!(
            nx = self.nx,
            ny = self.ny,
            nz = nz.unwrap_or(0),
            land_cells = self.water.iter().filter(|w| !**w).count(),
            "rectilinear grid built"
        );

        Ok(RectilinearGrid {
            bounds,
            lon0: self.lon0,
            lat0: self.lat0,
            dlon: self.dlon,
            dlat: self.dlat,
            levels: self.levels,
            water: self.water,
            bathy: self.bathy,
            row_dx_m,
            row_dy_m,
            velocity,
            scalars: self.scalars,
        })
    }
}
