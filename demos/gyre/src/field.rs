//! Synthetic coastal basin with a wind-driven gyre.
//!
//! 80 × 60 cells at 0.05° from (3°E, 41°N), six vertical levels down to
//! 200 m.  A straight western coast with a headland in the north-west; the
//! gyre is a Rankine vortex centred offshore whose speed decays with depth
//! and is modulated by a semi-diurnal tide.

use std::f64::consts::TAU;

use drift_core::{Delta, GridPos, ZoneId};
use drift_field::{FieldResult, RectilinearGrid, RectilinearGridBuilder, Zone, ZoneBuilder, ZoneKind};

pub const NX: usize = 80;
pub const NY: usize = 60;

const CENTRE: (f64, f64) = (45.0, 30.0);
const CORE_RADIUS: f64 = 15.0;
const PEAK_SPEED: f64 = 0.25; // m/s at the core radius, surface
const M2_PERIOD: f64 = 12.42 * 3600.0;

pub fn basin() -> FieldResult<RectilinearGrid> {
    let surface = 5.0;
    RectilinearGridBuilder::new(NX, NY)
        .origin(3.0, 41.0)
        .resolution(0.05, 0.05)
        .levels(vec![-200.0, -100.0, -50.0, -20.0, -10.0, 0.0])
        .land_where(|i, j| i < 4 || (i < 10 && j > 45))
        .velocity_metric(move |p, t| {
            let (dx, dy) = (p.x - CENTRE.0, p.y - CENTRE.1);
            let r = dx.hypot(dy);
            if r < 1e-9 {
                return Delta::ZERO;
            }
            let speed = if r < CORE_RADIUS {
                PEAK_SPEED * r / CORE_RADIUS
            } else {
                PEAK_SPEED * CORE_RADIUS / r
            };
            let shear = 0.4 + 0.6 * p.z / surface;
            let tide = 1.0 + 0.2 * (TAU * t / M2_PERIOD).sin();
            let s = speed * shear * tide;
            Delta::horizontal(-s * dy / r, s * dx / r)
        })
        .scalar("temp", |p: GridPos, _| 8.0 + 0.12 * p.y + 1.2 * p.z)
        .build()
}

/// The offshore spawning ground and the coastal nursery.
pub fn zones() -> Vec<ZoneBuilder> {
    vec![
        Zone::builder("spawning", ZoneKind::Release, ZoneId(0))
            .grid_vertex(50.0, 26.0)
            .grid_vertex(56.0, 26.0)
            .grid_vertex(56.0, 32.0)
            .grid_vertex(50.0, 32.0)
            .depth_band(0.0, 20.0),
        Zone::builder("nursery", ZoneKind::Recruitment, ZoneId(1))
            .grid_vertex(4.0, 10.0)
            .grid_vertex(12.0, 10.0)
            .grid_vertex(12.0, 40.0)
            .grid_vertex(4.0, 40.0),
    ]
}
