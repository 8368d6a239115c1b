//! Grid-space and geographic coordinate values.
//!
//! Agents are tracked in two coordinate systems at once:
//!
//! - **grid space** (`GridPos`): fractional cell indices `(x, y, z)` into the
//!   hydrodynamic grid.  Cell centres sit on integer indices, so cell `(i, j)`
//!   covers `[i - 0.5, i + 0.5) × [j - 0.5, j + 0.5)`.
//! - **geographic space** (`GeoPoint`): WGS-84 latitude/longitude in degrees
//!   and depth in metres (negative below the surface).
//!
//! Both use `f64`: advection accumulates thousands of sub-cell increments per
//! run and single precision drifts visibly after a few simulated weeks.
//!
//! In 2-D runs `z` and `depth` are held at `0.0` and ignored; the
//! dimensionality is carried by [`GridBounds::is_3d`].

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// ── GridPos ───────────────────────────────────────────────────────────────────

/// A position in grid index space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GridPos {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal-only position (`z = 0`).
    #[inline]
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Index of the cell whose centre is nearest to this position.
    #[inline]
    pub fn nearest_cell(self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add<Delta> for GridPos {
    type Output = GridPos;
    #[inline]
    fn add(self, d: Delta) -> GridPos {
        GridPos { x: self.x + d.dx, y: self.y + d.dy, z: self.z + d.dz }
    }
}

impl Sub for GridPos {
    type Output = Delta;
    #[inline]
    fn sub(self, rhs: GridPos) -> Delta {
        Delta { dx: self.x - rhs.x, dy: self.y - rhs.y, dz: self.z - rhs.z }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.4}, {:.4}, {:.4}]", self.x, self.y, self.z)
    }
}

// ── Delta ─────────────────────────────────────────────────────────────────────

/// A displacement in grid index space (cells).  Also used for velocities
/// expressed in cells per second.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Delta {
    pub const ZERO: Delta = Delta { dx: 0.0, dy: 0.0, dz: 0.0 };

    #[inline]
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Horizontal-only displacement (`dz = 0`).
    #[inline]
    pub fn horizontal(dx: f64, dy: f64) -> Self {
        Self { dx, dy, dz: 0.0 }
    }

    /// Vertical-only displacement.
    #[inline]
    pub fn vertical(dz: f64) -> Self {
        Self { dx: 0.0, dy: 0.0, dz }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.dz == 0.0
    }

    /// Zero the horizontal and/or vertical components after the fact.
    #[inline]
    pub fn masked(self, horizontal: bool, vertical: bool) -> Delta {
        Delta {
            dx: if horizontal { self.dx } else { 0.0 },
            dy: if horizontal { self.dy } else { 0.0 },
            dz: if vertical { self.dz } else { 0.0 },
        }
    }

    /// Components as an array, `[dx, dy, dz]`.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.dx, self.dy, self.dz]
    }
}

impl Add for Delta {
    type Output = Delta;
    #[inline]
    fn add(self, rhs: Delta) -> Delta {
        Delta { dx: self.dx + rhs.dx, dy: self.dy + rhs.dy, dz: self.dz + rhs.dz }
    }
}

impl AddAssign for Delta {
    #[inline]
    fn add_assign(&mut self, rhs: Delta) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
        self.dz += rhs.dz;
    }
}

impl Mul<f64> for Delta {
    type Output = Delta;
    #[inline]
    fn mul(self, k: f64) -> Delta {
        Delta { dx: self.dx * k, dy: self.dy * k, dz: self.dz * k }
    }
}

impl Neg for Delta {
    type Output = Delta;
    #[inline]
    fn neg(self) -> Delta {
        Delta { dx: -self.dx, dy: -self.dy, dz: -self.dz }
    }
}

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A WGS-84 geographic coordinate with depth in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat:   f64,
    pub lon:   f64,
    pub depth: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64, depth: f64) -> Self {
        Self { lat, lon, depth }
    }

    /// Surface point (`depth = 0`).
    #[inline]
    pub fn surface(lat: f64, lon: f64) -> Self {
        Self { lat, lon, depth: 0.0 }
    }

    /// Haversine great-circle distance in metres, ignoring depth.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.2} m)", self.lat, self.lon, self.depth)
    }
}

// ── GridBounds ────────────────────────────────────────────────────────────────

/// Extents of the hydrodynamic grid, copied into every `SpatialPoint` so
/// that wrapping and clamping need no access to the dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridBounds {
    pub nx: usize,
    pub ny: usize,
    /// Number of vertical levels; `None` for 2-D simulations.
    pub nz: Option<usize>,
    /// `true` if the domain wraps around in x (global zonal periodicity).
    pub periodic_x: bool,
}

impl GridBounds {
    #[inline]
    pub fn is_3d(&self) -> bool {
        self.nz.is_some()
    }

    /// Wrap `x` into `[0, nx)` on periodic domains; identity otherwise.
    #[inline]
    pub fn wrap_x(&self, x: f64) -> f64 {
        if self.periodic_x && self.nx > 0 {
            x.rem_euclid(self.nx as f64)
        } else {
            x
        }
    }

    /// Clamp `z` into `[0, nz - 1]`; always `0` in 2-D.
    #[inline]
    pub fn clamp_z(&self, z: f64) -> f64 {
        match self.nz {
            Some(nz) if nz > 0 => z.clamp(0.0, (nz - 1) as f64),
            _ => 0.0,
        }
    }

    /// `true` if the nearest cell `(i, j)` is inside the index range.
    #[inline]
    pub fn contains_cell(&self, i: i64, j: i64) -> bool {
        i >= 0 && j >= 0 && (i as usize) < self.nx && (j as usize) < self.ny
    }
}
