//! CSV release-point loader.
//!
//! # CSV format
//!
//! One row per agent.  The header decides how positions are read:
//!
//! ```csv
//! x,y,z
//! 12.5,40.0,3
//! 13.0,41.5,3
//! ```
//!
//! ```csv
//! lon,lat,depth
//! -4.25,47.80,-10
//! -4.30,47.85,-10
//! ```
//!
//! The vertical column (`z` or `depth`) is optional and is ignored on 2-D
//! grids.  Depths are metres, negative below the surface.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use drift_agent::PopulationBuilder;
use drift_core::{GeoPoint, GridPos};

use crate::{ReleaseError, ReleaseResult};

/// One release position, as given by the user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReleasePoint {
    Grid(GridPos),
    Geo(GeoPoint),
}

impl ReleasePoint {
    pub fn add_to(self, builder: &mut PopulationBuilder) {
        match self {
            ReleasePoint::Grid(p) => builder.add_grid(p),
            ReleasePoint::Geo(g) => builder.add_geo(g),
        }
    }
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GridRecord {
    x: f64,
    y: f64,
    #[serde(default)]
    z: Option<f64>,
}

#[derive(Deserialize)]
struct GeoRecord {
    lon:   f64,
    lat:   f64,
    #[serde(default)]
    depth: Option<f64>,
}

#[derive(Copy, Clone)]
enum Layout {
    Grid,
    Geo,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load release points from a CSV file.
pub fn load_release_csv(path: &Path) -> ReleaseResult<Vec<ReleasePoint>> {
    let file = std::fs::File::open(path)?;
    load_release_reader(file)
}

/// Like [`load_release_csv`] but accepts any `Read` source.
pub fn load_release_reader<R: Read>(reader: R) -> ReleaseResult<Vec<ReleasePoint>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ReleaseError::Parse(e.to_string()))?
        .clone();
    let has = |name: &str| headers.iter().any(|h| h == name);
    let layout = if has("x") && has("y") {
        Layout::Grid
    } else if has("lon") && has("lat") {
        Layout::Geo
    } else {
        return Err(ReleaseError::UnknownLayout(headers.iter().collect::<Vec<_>>().join(",")));
    };

    let mut points = Vec::new();
    match layout {
        Layout::Grid => {
            for result in csv_reader.deserialize::<GridRecord>() {
                let r = result.map_err(|e| ReleaseError::Parse(e.to_string()))?;
                points.push(ReleasePoint::Grid(GridPos::new(r.x, r.y, r.z.unwrap_or(0.0))));
            }
        }
        Layout::Geo => {
            for result in csv_reader.deserialize::<GeoRecord>() {
                let r = result.map_err(|e| ReleaseError::Parse(e.to_string()))?;
                points.push(ReleasePoint::Geo(GeoPoint::new(r.lat, r.lon, r.depth.unwrap_or(0.0))));
            }
        }
    }
    Ok(points)
}
