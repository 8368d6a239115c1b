//! Polygonal zones and the zone index.
//!
//! A zone is a closed polygon in grid space with an optional depth band and
//! an optional bathymetric band.  Zones are declared with geographic or grid
//! vertices through [`ZoneBuilder`] and resolved against a dataset once, at
//! setup; afterwards they are immutable and freely shared across threads.
//!
//! # Spatial index
//!
//! [`ZoneSet`] keeps an R-tree (via `rstar`) of zone bounding boxes so that
//! "which zones contain this point" only runs the polygon test on the few
//! zones whose box overlaps the query.

use std::fmt;

use rstar::{RTree, RTreeObject, AABB};

use drift_core::{GeoPoint, GridPos, ZoneId};

use crate::dataset::Dataset;
use crate::{FieldError, ZoneError};

// ── ZoneKind ──────────────────────────────────────────────────────────────────

/// What a zone is used for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ZoneKind {
    Release,
    Recruitment,
    Target,
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ZoneKind::Release     => "release",
            ZoneKind::Recruitment => "recruitment",
            ZoneKind::Target      => "target",
        };
        f.write_str(s)
    }
}

// ── Zone ──────────────────────────────────────────────────────────────────────

/// An initialised zone.  Build with [`Zone::builder`].
#[derive(Clone, Debug)]
pub struct Zone {
    pub key:  String,
    pub kind: ZoneKind,
    pub id:   ZoneId,

    /// Closed ring: the first vertex is repeated as the last.
    polygon: Vec<GridPos>,

    /// `(upper, lower)` absolute depths in metres, `upper <= lower`.
    depth_band: Option<(f64, f64)>,

    /// `(inshore, offshore)` bottom depths in metres, `inshore <= offshore`.
    bathy_band: Option<(f64, f64)>,

    /// `[xmin, ymin, xmax, ymax]` in grid units.
    bbox: [f64; 4],
}

impl Zone {
    pub fn builder(key: impl Into<String>, kind: ZoneKind, id: ZoneId) -> ZoneBuilder {
        ZoneBuilder {
            key: key.into(),
            kind,
            id,
            vertices: Vec::new(),
            depth_band: None,
            bathy_band: None,
        }
    }

    /// The closed vertex ring in grid coordinates.
    pub fn polygon(&self) -> &[GridPos] {
        &self.polygon
    }

    pub fn depth_band(&self) -> Option<(f64, f64)> {
        self.depth_band
    }

    pub fn bathy_band(&self) -> Option<(f64, f64)> {
        self.bathy_band
    }

    /// `[xmin, ymin, xmax, ymax]` in grid units.
    pub fn bounding_box(&self) -> [f64; 4] {
        self.bbox
    }

    /// Crossing-number test of `(x, y)` against the polygon.
    ///
    /// Edges are walked in order and contribute signed crossings; vertical
    /// edges are skipped.  A query on an edge's endpoint counts as a half
    /// crossing only when it lies at or above that endpoint, so a ray through
    /// a shared vertex is never counted twice.  A query exactly on a vertex
    /// is inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut crossings: i32 = 0;
        for edge in self.polygon.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if a.x == b.x {
                continue;
            }
            let dx1 = x - a.x;
            let dx2 = b.x - x;
            let dxy = dx2 * (y - a.y) - dx1 * (b.y - y);

            let mut inc = 0;
            if a.x == x && a.y == y {
                crossings = 1;
            } else if (dx1 == 0.0 && y >= a.y) || (dx2 == 0.0 && y >= b.y) {
                inc = 1;
            } else if dx1 * dx2 > 0.0 && (b.x - a.x) * dxy >= 0.0 {
                inc = 2;
            }

            if b.x > a.x {
                crossings += inc;
            } else {
                crossings -= inc;
            }
        }
        crossings != 0
    }

    /// Full membership test for an agent at `p` with depth `depth` (metres,
    /// negative below the surface).
    ///
    /// The point must be in water, inside the depth band (3-D grids only,
    /// bounds inclusive), strictly between the bathymetric lines at its
    /// nearest cell, and inside the polygon.
    pub fn contains_3d(&self, dataset: &dyn Dataset, p: GridPos, depth: f64) -> bool {
        if !dataset.is_in_water(p) {
            return false;
        }
        if dataset.is_3d() {
            if let Some((upper, lower)) = self.depth_band {
                let d = depth.abs();
                if d < upper || d > lower {
                    return false;
                }
            }
        }
        if !self.within_bathy_band(dataset, p.x, p.y) {
            return false;
        }
        self.contains(p.x, p.y)
    }

    /// Surface area in km² of the water cells whose centre is in the zone.
    pub fn area_km2(&self, dataset: &dyn Dataset) -> f64 {
        let b = dataset.bounds();
        let mut area = 0.0;
        for j in 0..b.ny {
            for i in 0..b.nx {
                let (x, y) = (i as f64, j as f64);
                if !dataset.is_in_water(GridPos::xy(x, y)) {
                    continue;
                }
                if self.within_bathy_band(dataset, x, y) && self.contains(x, y) {
                    let (dx, dy) = dataset.cell_size(i, j);
                    area += dx * dy * 1e-6;
                }
            }
        }
        area
    }

    fn within_bathy_band(&self, dataset: &dyn Dataset, x: f64, y: f64) -> bool {
        let Some((inshore, offshore)) = self.bathy_band else {
            return true;
        };
        let (i, j) = (x.round(), y.round());
        if i < 0.0 || j < 0.0 {
            return false;
        }
        match dataset.bathymetry(i as usize, j as usize) {
            Some(h) => h > inshore && h < offshore,
            None => false,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} zone `{}` ({} vertices", self.kind, self.key, self.polygon.len() - 1)?;
        if let Some((u, l)) = self.depth_band {
            write!(f, ", depth {u}-{l} m")?;
        }
        if let Some((i, o)) = self.bathy_band {
            write!(f, ", bathy {i}-{o} m")?;
        }
        f.write_str(")")
    }
}

// ── ZoneBuilder ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum Vertex {
    Geo(GeoPoint),
    Grid(GridPos),
}

/// Collects vertices and bands, then resolves them with [`init`](Self::init).
#[derive(Clone, Debug)]
pub struct ZoneBuilder {
    key:        String,
    kind:       ZoneKind,
    id:         ZoneId,
    vertices:   Vec<Vertex>,
    depth_band: Option<(f64, f64)>,
    bathy_band: Option<(f64, f64)>,
}

impl ZoneBuilder {
    pub fn geo_vertex(mut self, lat: f64, lon: f64) -> Self {
        self.vertices.push(Vertex::Geo(GeoPoint::surface(lat, lon)));
        self
    }

    pub fn grid_vertex(mut self, x: f64, y: f64) -> Self {
        self.vertices.push(Vertex::Grid(GridPos::xy(x, y)));
        self
    }

    /// Restrict the zone to absolute depths in `[upper, lower]` metres.
    pub fn depth_band(mut self, upper: f64, lower: f64) -> Self {
        self.depth_band = Some((upper, lower));
        self
    }

    /// Restrict the zone to cells whose bottom depth lies strictly between
    /// `inshore` and `offshore` metres.
    pub fn bathy_band(mut self, inshore: f64, offshore: f64) -> Self {
        self.bathy_band = Some((inshore, offshore));
        self
    }

    /// Convert every vertex to grid space, close the ring, and check the
    /// band invariants.
    pub fn init(self, dataset: &dyn Dataset) -> Result<Zone, ZoneError> {
        let key = self.key;
        if self.vertices.len() < 3 {
            return Err(ZoneError::TooFewVertices { key, count: self.vertices.len() });
        }
        if let Some((upper, lower)) = self.depth_band {
            if lower < upper {
                return Err(ZoneError::InvertedDepthBand { key, upper, lower });
            }
        }
        if let Some((inshore, offshore)) = self.bathy_band {
            if offshore < inshore {
                return Err(ZoneError::InvertedBathyBand { key, inshore, offshore });
            }
        }

        let bounds = dataset.bounds();
        let mut polygon = Vec::with_capacity(self.vertices.len() + 1);
        for (index, v) in self.vertices.iter().enumerate() {
            let resolved = match *v {
                Vertex::Geo(g) => dataset.geo_to_grid(g),
                Vertex::Grid(p) => {
                    let (i, j) = p.nearest_cell();
                    if p.is_finite() && bounds.contains_cell(i, j) {
                        Ok(p)
                    } else {
                        Err(FieldError::OutOfDomain(p))
                    }
                }
            };
            match resolved {
                Ok(p) => polygon.push(GridPos::xy(p.x, p.y)),
                Err(source) => {
                    return Err(ZoneError::VertexOutOfDomain { key, index, source });
                }
            }
        }
        if polygon.first() != polygon.last() {
            polygon.push(polygon[0]);
        }

        let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for p in &polygon {
            bbox[0] = bbox[0].min(p.x);
            bbox[1] = bbox[1].min(p.y);
            bbox[2] = bbox[2].max(p.x);
            bbox[3] = bbox[3].max(p.y);
        }

        Ok(Zone {
            key,
            kind: self.kind,
            id: self.id,
            polygon,
            depth_band: self.depth_band,
            bathy_band: self.bathy_band,
            bbox,
        })
    }
}

// ── ZoneSet ───────────────────────────────────────────────────────────────────

/// R-tree entry: a zone's bounding box and its position in `ZoneSet::zones`.
struct ZoneEntry {
    envelope: AABB<[f64; 2]>,
    slot:     usize,
}

impl RTreeObject for ZoneEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// The zones of a run, indexed for point queries.
pub struct ZoneSet {
    zones: Vec<Zone>,
    index: RTree<ZoneEntry>,
}

impl ZoneSet {
    pub fn empty() -> Self {
        Self { zones: Vec::new(), index: RTree::new() }
    }

    pub fn new(zones: Vec<Zone>) -> Self {
        let entries: Vec<ZoneEntry> = zones
            .iter()
            .enumerate()
            .map(|(slot, z)| {
                let [x0, y0, x1, y1] = z.bbox;
                ZoneEntry { envelope: AABB::from_corners([x0, y0], [x1, y1]), slot }
            })
            .collect();
        Self { zones, index: RTree::bulk_load(entries) }
    }

    /// Initialise every builder against `dataset` and index the result.
    pub fn init(builders: Vec<ZoneBuilder>, dataset: &dyn Dataset) -> Result<Self, ZoneError> {
        let zones = builders
            .into_iter()
            .map(|b| b.init(dataset))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(zones))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter()
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn by_key(&self, key: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.key == key)
    }

    pub fn by_kind(&self, kind: ZoneKind) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter().filter(move |z| z.kind == kind)
    }

    /// Zones whose polygon contains `(x, y)`, in declaration order.
    pub fn zones_at(&self, x: f64, y: f64) -> Vec<&Zone> {
        let mut slots: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .map(|e| e.slot)
            .collect();
        slots.sort_unstable();
        slots
            .into_iter()
            .map(|s| &self.zones[s])
            .filter(|z| z.contains(x, y))
            .collect()
    }

    /// First zone of `kind` passing the full membership test.
    pub fn find_containing(
        &self,
        kind: ZoneKind,
        dataset: &dyn Dataset,
        p: GridPos,
        depth: f64,
    ) -> Option<&Zone> {
        self.zones_at(p.x, p.y)
            .into_iter()
            .find(|z| z.kind == kind && z.contains_3d(dataset, p, depth))
    }
}

impl Default for ZoneSet {
    fn default() -> Self {
        Self::empty()
    }
}
