//! Coastline collision resolution.
//!
//! Given an agent's grid position and its pending horizontal displacement,
//! a [`CoastlinePolicy`] decides what actually gets committed when the
//! target is on land:
//!
//! | Policy       | Target on land                                         |
//! |--------------|--------------------------------------------------------|
//! | `None`       | move anyway                                            |
//! | `Beaching`   | move, then the agent is stranded (`Resolved::beached`) |
//! | `Standstill` | cancel the horizontal displacement                     |
//! | `Bouncing`   | reflect the displacement off the coastline             |
//!
//! # Bouncing
//!
//! The crossing into land is located by bisection along the segment
//! `p + s·d, s ∈ [0, 1]`: each probe moves forward while in water and back
//! once on land, halving the step, until the probe sits within `1e-8` of a
//! cell boundary with water just before it and land just after it along the
//! segment (at most 1000 probes).  Boundaries between two water cells are
//! passed over, so moves longer than one cell find the coast.  A boundary
//! crossed in x is a
//! meridional coast and mirrors `dx`; one crossed in y is a zonal coast and
//! mirrors `dy`; both at once is a corner and mirrors both.  Mirroring keeps
//! the in-water part `d1` of the component and folds the overshoot back:
//! `d' = 2·d1 − d`.  If the reflected target is still on land the search is
//! repeated on the reflected displacement, at most 10 times in all; the last
//! candidate is kept either way.

use std::str::FromStr;

use drift_core::{Delta, GridPos};
use drift_field::Dataset;

use crate::TransportError;

const MAX_BISECTIONS: usize = 1000;
const MAX_BOUNCES: usize = 10;
const BOUNDARY_EPS: f64 = 1e-8;
/// Distance in cells, either side of a candidate boundary, at which the
/// water/land transition is checked.
const SIDE_PROBE: f64 = 1e-6;

// ── CoastlinePolicy ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoastlinePolicy {
    None,
    #[default]
    Beaching,
    Standstill,
    Bouncing,
}

impl CoastlinePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CoastlinePolicy::None       => "none",
            CoastlinePolicy::Beaching   => "beaching",
            CoastlinePolicy::Standstill => "standstill",
            CoastlinePolicy::Bouncing   => "bouncing",
        }
    }

    /// Decide the horizontal displacement to commit for an agent at `from`
    /// with pending displacement `delta`.  The vertical part of `delta` is
    /// passed through.
    pub fn resolve(self, dataset: &dyn Dataset, from: GridPos, delta: Delta) -> Resolved {
        match self {
            CoastlinePolicy::None => Resolved { delta, beached: false },
            CoastlinePolicy::Beaching => Resolved {
                delta,
                beached: !dataset.is_in_water(from + delta.masked(true, false)),
            },
            CoastlinePolicy::Standstill => {
                if dataset.is_in_water(from + delta.masked(true, false)) {
                    Resolved { delta, beached: false }
                } else {
                    Resolved { delta: Delta::vertical(delta.dz), beached: false }
                }
            }
            CoastlinePolicy::Bouncing => {
                let (dx, dy) = bounce(dataset, from, delta.dx, delta.dy);
                Resolved { delta: Delta::new(dx, dy, delta.dz), beached: false }
            }
        }
    }
}

impl FromStr for CoastlinePolicy {
    type Err = TransportError;

    /// Case-insensitive policy name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none"       => Ok(CoastlinePolicy::None),
            "beaching"   => Ok(CoastlinePolicy::Beaching),
            "standstill" => Ok(CoastlinePolicy::Standstill),
            "bouncing"   => Ok(CoastlinePolicy::Bouncing),
            _ => Err(TransportError::UnknownPolicy(s.to_owned())),
        }
    }
}

impl std::fmt::Display for CoastlinePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of collision resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolved {
    /// Displacement to commit.
    pub delta: Delta,
    /// The committed move ends on land and the agent is stranded.
    pub beached: bool,
}

// ── Bouncing ──────────────────────────────────────────────────────────────────

fn bounce(dataset: &dyn Dataset, from: GridPos, dx: f64, dy: f64) -> (f64, f64) {
    let (mut dx, mut dy) = (dx, dy);
    for _ in 0..MAX_BOUNCES {
        if dataset.is_in_water(GridPos::new(from.x + dx, from.y + dy, from.z)) {
            break;
        }
        let Some(crossing) = locate_crossing(dataset, from, dx, dy) else {
            break;
        };
        let (ndx, ndy) = reflect(from, dx, dy, crossing);
        if (ndx, ndy) == (dx, dy) {
            break;
        }
        dx = ndx;
        dy = ndy;
    }
    (dx, dy)
}

/// Where the segment from `from` along `(dx, dy)` meets a cell boundary on
/// its way into land.
#[derive(Copy, Clone, Debug)]
struct Crossing {
    x:          f64,
    y:          f64,
    meridional: bool,
    zonal:      bool,
}

fn locate_crossing(dataset: &dyn Dataset, from: GridPos, dx: f64, dy: f64) -> Option<Crossing> {
    let length = dx.hypot(dy);
    if length == 0.0 {
        return None;
    }
    let side = SIDE_PROBE / length;
    let at = |s: f64| GridPos::new(from.x + s * dx, from.y + s * dy, from.z);

    let mut s = 0.0;
    let mut ds = 1.0;
    let mut forward = true;
    for _ in 0..MAX_BISECTIONS {
        ds *= 0.5;
        s += if forward { ds } else { -ds };
        let probe = at(s);
        forward = dataset.is_in_water(probe);

        let meridional = dx != 0.0 && on_boundary(probe.x);
        let zonal = dy != 0.0 && on_boundary(probe.y);
        let coast = dataset.is_in_water(at(s - side)) && !dataset.is_in_water(at(s + side));
        if (meridional || zonal) && coast {
            return Some(Crossing { x: probe.x, y: probe.y, meridional, zonal });
        }
    }
    None
}

#[inline]
fn on_boundary(v: f64) -> bool {
    ((v + 0.5).round() - (v + 0.5)).abs() < BOUNDARY_EPS
}

/// Mirror the overshoot across the located boundary.
fn reflect(from: GridPos, dx: f64, dy: f64, c: Crossing) -> (f64, f64) {
    let boundary = |v: f64| (v + 0.5).round() - 0.5;
    let ndx = if c.meridional { 2.0 * (boundary(c.x) - from.x) - dx } else { dx };
    let ndy = if c.zonal { 2.0 * (boundary(c.y) - from.y) - dy } else { dy };
    (ndx, ndy)
}
